//! Story graph module for route and diagnostics computation.
//!
//! # Overview
//!
//! This module builds a petgraph-based directed graph from a [`Book`] and
//! runs read-only analyses over it.
//!
//! ## Pipeline
//!
//! ```text
//! Book (chapters + choices)
//!        ↓  build::StoryGraph::from_book()
//! StoryGraph (DiGraph, may contain loops; dangling choices set aside)
//!   ├─ cheapest::cheapest_path_from()   Dijkstra to any ending
//!   ├─ cycles::find_story_loops()       tarjan_scc
//!   └─ stats::GraphStats::compute()     counts
//!        ↓  diagnostics::diagnose()
//! Diagnostics
//! ```
//!
//! ## Typical Usage
//!
//! ```rust,ignore
//! use branchbook_route::graph::{cheapest_from_start, diagnose};
//!
//! if let Some(route) = cheapest_from_start(&book) {
//!     println!("{} sats via {}", route.cost, route.path.join(" → "));
//! }
//! let report = diagnose(&book);
//! ```
//!
//! [`Book`]: branchbook_core::model::Book

pub mod build;
pub mod cheapest;
pub mod cycles;
pub mod diagnostics;
pub mod stats;

// Re-export primary types at module level for convenience.
pub use build::{DanglingChoice, StoryEdge, StoryGraph, StoryNode};
pub use cheapest::{CheapestPath, cheapest_from_start, cheapest_path};
pub use cycles::find_story_loops;
pub use diagnostics::{Diagnostics, diagnose};
pub use stats::GraphStats;
