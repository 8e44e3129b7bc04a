//! Structural health report for a book.
//!
//! Exposes [`diagnose`], used by the CLI `diagnose` command. Every finding
//! is informational; none of them blocks publishing.

use std::collections::HashSet;

use petgraph::visit::Bfs;
use serde::Serialize;
use tracing::instrument;

use branchbook_core::model::Book;

use super::build::{DanglingChoice, StoryGraph};
use super::cycles::find_story_loops;
use super::stats::GraphStats;

/// Everything [`diagnose`] found, with ids sorted for stable output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub stats: GraphStats,
    /// Chapters no sequence of choices can reach from the start chapter.
    /// Every chapter when the book has no start.
    pub unreachable: Vec<String>,
    /// Non-ending chapters without any choices.
    pub dead_ends: Vec<String>,
    pub dangling_choices: Vec<DanglingChoice>,
    /// Endings that still carry choices (possible in hand-edited files).
    pub endings_with_choices: Vec<String>,
    /// Strongly connected components, see [`find_story_loops`].
    pub cycles: Vec<Vec<String>>,
    pub reachable_endings: Vec<String>,
}

impl Diagnostics {
    /// True when nothing beyond the counts was reported.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unreachable.is_empty()
            && self.dead_ends.is_empty()
            && self.dangling_choices.is_empty()
            && self.endings_with_choices.is_empty()
            && self.cycles.is_empty()
    }
}

/// Build the story graph for `book` and report its structural findings.
#[must_use]
#[instrument(skip(book), fields(title = %book.title))]
pub fn diagnose(book: &Book) -> Diagnostics {
    let sg = StoryGraph::from_book(book);
    let reachable = reachable_from_start(book, &sg);

    let unreachable = book
        .chapters
        .keys()
        .filter(|id| !reachable.contains(id.as_str()))
        .cloned()
        .collect();

    let dead_ends = book
        .chapters
        .values()
        .filter(|c| !c.is_end_chapter && c.choices.is_empty())
        .map(|c| c.id.clone())
        .collect();

    let endings_with_choices = book
        .end_chapters()
        .filter(|c| !c.choices.is_empty())
        .map(|c| c.id.clone())
        .collect();

    let reachable_endings = book
        .end_chapters()
        .filter(|c| reachable.contains(c.id.as_str()))
        .map(|c| c.id.clone())
        .collect();

    Diagnostics {
        stats: GraphStats::compute(book, &sg),
        unreachable,
        dead_ends,
        dangling_choices: sg.dangling.clone(),
        endings_with_choices,
        cycles: find_story_loops(&sg),
        reachable_endings,
    }
}

fn reachable_from_start<'a>(book: &Book, sg: &'a StoryGraph) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    let Some(start) = book
        .start_chapter_id
        .as_deref()
        .and_then(|id| sg.node_index(id))
    else {
        return seen;
    };

    let mut bfs = Bfs::new(&sg.graph, start);
    while let Some(idx) = bfs.next(&sg.graph) {
        if let Some(id) = sg.chapter_id(idx) {
            seen.insert(id);
        }
    }
    seen
}
