//! Counts over a book and its story graph.
//!
//! - **chapter_count**: every chapter, reachable or not.
//! - **choice_count**: every choice, including dangling ones.
//! - **edge_count**: choices that resolve to an existing chapter.
//! - **ending_count**: chapters flagged as endings.
//! - **paid_choice_count**: choices with a positive price.
//! - **max_out_degree**: most resolvable choices leaving one chapter.

use serde::Serialize;

use branchbook_core::model::Book;

use super::build::StoryGraph;

/// Summary counts for a book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub chapter_count: usize,
    pub choice_count: usize,
    pub edge_count: usize,
    pub ending_count: usize,
    pub paid_choice_count: usize,
    pub max_out_degree: usize,
}

impl GraphStats {
    /// Compute counts from `book` and the graph built from it.
    #[must_use]
    pub fn compute(book: &Book, sg: &StoryGraph) -> Self {
        let paid_choice_count = book
            .chapters
            .values()
            .flat_map(|c| &c.choices)
            .filter(|choice| choice.is_paid())
            .count();

        let max_out_degree = sg
            .graph
            .node_indices()
            .map(|idx| sg.graph.edges(idx).count())
            .max()
            .unwrap_or(0);

        Self {
            chapter_count: book.chapters.len(),
            choice_count: book.choice_count(),
            edge_count: sg.edge_count(),
            ending_count: book.end_chapters().count(),
            paid_choice_count,
            max_out_degree,
        }
    }
}
