#![forbid(unsafe_code)]
//! branchbook-route library.
//!
//! Read-only analyses over a [`Book`](branchbook_core::model::Book): the
//! cheapest payable route to an ending and structural diagnostics.
//!
//! # Conventions
//!
//! - **Errors**: analyses are total; absence is reported with `Option`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod graph;

pub use graph::{CheapestPath, Diagnostics, cheapest_from_start, cheapest_path, diagnose};
