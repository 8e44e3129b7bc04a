#![forbid(unsafe_code)]
//! branchbook-core library.
//!
//! The narrative graph engine: a [`Book`] of chapters joined by optionally
//! priced choices, the pure authoring reducer in [`edit`], the reader
//! session in [`navigate`], and the publish gate in [`publish`].
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums in the engine, `anyhow::Result` at
//!   application edges (config loading).
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod collab;
pub mod config;
pub mod edit;
pub mod error;
pub mod model;
pub mod navigate;
pub mod publish;

pub use edit::{Editor, Operation, apply};
pub use error::ErrorCode;
pub use model::{Book, Chapter, Choice, chapter_exists, is_dangling, parents_of};
pub use navigate::{NavState, NavigateError, Navigator};
pub use publish::{PublishError, PublishedBook, publish, validate_for_publish};
