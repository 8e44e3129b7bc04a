//! Loop detection over story graphs.
//!
//! Loops are legal in a branching story (a reader can revisit a chapter),
//! but authors usually want to know where they are.

#![allow(clippy::module_name_repetitions)]

use petgraph::algo::tarjan_scc;
use petgraph::graph::NodeIndex;

use super::build::StoryGraph;

/// Find every loop currently present in `sg`.
///
/// Each entry is a sorted list of chapter ids in one strongly connected
/// component. A chapter with a choice back to itself is reported as a
/// one-element loop. Entries are sorted for deterministic output.
#[must_use]
pub fn find_story_loops(sg: &StoryGraph) -> Vec<Vec<String>> {
    let mut loops: Vec<Vec<String>> = tarjan_scc(&sg.graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1 || component.first().is_some_and(|node| has_self_loop(sg, *node))
        })
        .map(|component| {
            let mut ids: Vec<String> = component
                .into_iter()
                .filter_map(|idx| sg.chapter_id(idx).map(str::to_string))
                .collect();
            ids.sort_unstable();
            ids
        })
        .collect();

    loops.sort_unstable();
    loops
}

fn has_self_loop(sg: &StoryGraph, node: NodeIndex) -> bool {
    sg.graph.find_edge(node, node).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchbook_core::model::{Book, Chapter, Choice};

    fn graph(edges: &[(&str, &str)], isolated: &[&str]) -> StoryGraph {
        let mut book = Book::new("Loops");
        for id in edges.iter().flat_map(|(a, b)| [*a, *b]).chain(isolated.iter().copied()) {
            book.chapters
                .entry(id.to_string())
                .or_insert_with(|| Chapter::new(id, id));
        }
        for (n, (from, to)) in edges.iter().enumerate() {
            if let Some(chapter) = book.chapters.get_mut(*from) {
                chapter.choices.push(Choice::new(format!("c{n}"), "go").to(*to));
            }
        }
        StoryGraph::from_book(&book)
    }

    #[test]
    fn acyclic_story_has_no_loops() {
        let sg = graph(&[("a", "b"), ("b", "c"), ("a", "c")], &["d"]);
        assert!(find_story_loops(&sg).is_empty());
    }

    #[test]
    fn two_chapter_loop() {
        let sg = graph(&[("a", "b"), ("b", "a"), ("b", "c")], &[]);
        assert_eq!(find_story_loops(&sg), vec![vec!["a", "b"]]);
    }

    #[test]
    fn self_loop_is_reported_alone() {
        let sg = graph(&[("a", "a"), ("a", "b")], &[]);
        assert_eq!(find_story_loops(&sg), vec![vec!["a"]]);
    }

    #[test]
    fn separate_loops_are_sorted() {
        let sg = graph(
            &[("x", "y"), ("y", "z"), ("z", "x"), ("b", "a"), ("a", "b")],
            &[],
        );
        assert_eq!(
            find_story_loops(&sg),
            vec![vec!["a", "b"], vec!["x", "y", "z"]]
        );
    }
}
