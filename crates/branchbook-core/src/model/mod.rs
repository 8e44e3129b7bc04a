//! Story graph entities.
//!
//! - [`chapter`]: [`Chapter`] nodes and their outgoing [`Choice`] edges.
//! - [`book`]: the [`Book`] aggregate plus invariant predicates and the
//!   derived reverse-adjacency lookup.

pub mod book;
pub mod chapter;

pub use book::{Book, ChapterRef, chapter_exists, is_dangling, parents_of};
pub use chapter::{Chapter, Choice};
