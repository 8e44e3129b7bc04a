//! Graph construction from a [`Book`].
//!
//! # Overview
//!
//! [`StoryGraph`] is a [`petgraph`] directed graph over chapter ids. Each
//! resolvable choice becomes one edge `chapter → target` weighted by the
//! choice price (absent price = 0). Parallel choices between the same pair
//! of chapters stay as parallel edges so route results can name the exact
//! choice taken.
//!
//! ## Dangling choices
//!
//! Choices with no target, or a target that is not in the book, are not
//! added as edges. They are recorded in [`StoryGraph::dangling`] for
//! diagnostics instead.
//!
//! ## Ordering
//!
//! Nodes are added in chapter-id order and edges in choice-list order, so
//! edge indices follow authoring order. [`StoryGraph::outgoing`] yields
//! edges in that order.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use branchbook_core::model::Book;
use petgraph::graph::{DiGraph, EdgeIndex, EdgeReference, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::debug;

/// Node weight: the chapter id plus the flags route computations need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryNode {
    pub chapter_id: String,
    pub is_end: bool,
}

/// Edge weight: the choice behind the edge and its price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryEdge {
    pub choice_id: String,
    pub price: u64,
}

/// A choice that could not become an edge.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DanglingChoice {
    pub chapter_id: String,
    pub choice_id: String,
    /// `None` when the choice was never given a target.
    pub target: Option<String>,
}

/// A directed story graph built from a book.
#[derive(Debug)]
pub struct StoryGraph {
    pub graph: DiGraph<StoryNode, StoryEdge>,
    /// Mapping from chapter id to petgraph `NodeIndex`.
    pub node_map: HashMap<String, NodeIndex>,
    /// Choices skipped during construction.
    pub dangling: Vec<DanglingChoice>,
}

impl StoryGraph {
    /// Build a [`StoryGraph`] from every chapter and choice in `book`.
    #[must_use]
    pub fn from_book(book: &Book) -> Self {
        let mut graph = DiGraph::<StoryNode, StoryEdge>::with_capacity(
            book.chapters.len(),
            book.choice_count(),
        );
        let mut node_map: HashMap<String, NodeIndex> = HashMap::with_capacity(book.chapters.len());

        for chapter in book.chapters.values() {
            let idx = graph.add_node(StoryNode {
                chapter_id: chapter.id.clone(),
                is_end: chapter.is_end_chapter,
            });
            node_map.insert(chapter.id.clone(), idx);
        }

        let mut dangling = Vec::new();
        for chapter in book.chapters.values() {
            let from = node_map[&chapter.id];
            for choice in &chapter.choices {
                match choice.target().and_then(|t| node_map.get(t)) {
                    Some(&to) => {
                        graph.add_edge(
                            from,
                            to,
                            StoryEdge {
                                choice_id: choice.id.clone(),
                                price: choice.cost(),
                            },
                        );
                    }
                    None => {
                        debug!(chapter = %chapter.id, choice = %choice.id, "skipping dangling choice");
                        dangling.push(DanglingChoice {
                            chapter_id: chapter.id.clone(),
                            choice_id: choice.id.clone(),
                            target: choice.target_chapter_id.clone(),
                        });
                    }
                }
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            dangling = dangling.len(),
            "built story graph"
        );

        Self {
            graph,
            node_map,
            dangling,
        }
    }

    /// Return the number of nodes (chapters) in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of edges (resolvable choices) in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up the `NodeIndex` for a chapter id.
    #[must_use]
    pub fn node_index(&self, chapter_id: &str) -> Option<NodeIndex> {
        self.node_map.get(chapter_id).copied()
    }

    /// Return the chapter id label for a node.
    #[must_use]
    pub fn chapter_id(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(|n| n.chapter_id.as_str())
    }

    #[must_use]
    pub fn is_end(&self, idx: NodeIndex) -> bool {
        self.graph.node_weight(idx).is_some_and(|n| n.is_end)
    }

    /// Outgoing edges of `idx` in authoring order.
    ///
    /// petgraph walks adjacency lists newest-first; sorting by edge index
    /// restores insertion order.
    #[must_use]
    pub fn outgoing(&self, idx: NodeIndex) -> Vec<EdgeReference<'_, StoryEdge>> {
        let mut edges: Vec<_> = self.graph.edges(idx).collect();
        edges.sort_by_key(|edge| edge.id());
        edges
    }

    /// Choice id behind an edge.
    #[must_use]
    pub fn choice_id(&self, edge: EdgeIndex) -> Option<&str> {
        self.graph.edge_weight(edge).map(|e| e.choice_id.as_str())
    }
}
