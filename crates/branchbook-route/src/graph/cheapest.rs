//! Cheapest route from a chapter to any ending.
//!
//! # Algorithm
//!
//! Dijkstra's single-source shortest path over [`StoryGraph`], where edge
//! weights are choice prices in satoshis. The goal is not one destination
//! but *any* chapter flagged as an ending:
//!
//! 1. Seed a min-heap with `(0, start)`.
//! 2. Pop the lowest accumulated cost. Skip nodes already settled.
//! 3. If the popped chapter is an ending, stop. All weights are
//!    non-negative, so no later pop can be cheaper.
//! 4. Otherwise relax each outgoing edge, pushing improved costs.
//!
//! Heap entries carry a monotonically increasing discovery sequence, so
//! equal costs pop in the order they were discovered. Complexity is
//! O((V + E) log V).

#![allow(clippy::module_name_repetitions)]

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use branchbook_core::model::Book;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use tracing::instrument;

use super::build::StoryGraph;

/// The cheapest payable route from a start chapter to an ending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheapestPath {
    /// Total satoshis across every choice on the route.
    pub cost: u64,
    /// Chapter ids from the start chapter to the ending, inclusive.
    pub path: Vec<String>,
    /// Choice ids taken between consecutive chapters of `path`.
    pub choices: Vec<String>,
}

/// Find the cheapest route from `start_id` to any ending in `book`.
///
/// Returns `None` when `start_id` is `None`, names a missing chapter, or no
/// ending is reachable. Choices whose targets are missing are ignored.
#[must_use]
#[instrument(skip(book), fields(title = %book.title))]
pub fn cheapest_path(book: &Book, start_id: Option<&str>) -> Option<CheapestPath> {
    let start_id = start_id?;
    StoryGraph::from_book(book).cheapest_path_from(start_id)
}

/// [`cheapest_path`] from the book's own start chapter.
#[must_use]
pub fn cheapest_from_start(book: &Book) -> Option<CheapestPath> {
    cheapest_path(book, book.start_chapter_id.as_deref())
}

impl StoryGraph {
    /// Run the solver from `start_id` over this graph.
    #[must_use]
    pub fn cheapest_path_from(&self, start_id: &str) -> Option<CheapestPath> {
        let start = self.node_index(start_id)?;

        let mut best: HashMap<NodeIndex, u64> = HashMap::from([(start, 0)]);
        let mut came_from: HashMap<NodeIndex, (NodeIndex, EdgeIndex)> = HashMap::new();
        let mut settled: HashSet<NodeIndex> = HashSet::new();
        let mut heap: BinaryHeap<Reverse<(u64, u64, NodeIndex)>> = BinaryHeap::new();
        let mut sequence = 0_u64;
        heap.push(Reverse((0, sequence, start)));

        while let Some(Reverse((cost, _, node))) = heap.pop() {
            if !settled.insert(node) {
                continue;
            }

            if self.is_end(node) {
                return Some(self.reconstruct(cost, node, &came_from));
            }

            for edge in self.outgoing(node) {
                let next = edge.target();
                if settled.contains(&next) {
                    continue;
                }
                let next_cost = cost.saturating_add(edge.weight().price);
                if best.get(&next).is_none_or(|&known| next_cost < known) {
                    best.insert(next, next_cost);
                    came_from.insert(next, (node, edge.id()));
                    sequence += 1;
                    heap.push(Reverse((next_cost, sequence, next)));
                }
            }
        }

        None
    }

    fn reconstruct(
        &self,
        cost: u64,
        end: NodeIndex,
        came_from: &HashMap<NodeIndex, (NodeIndex, EdgeIndex)>,
    ) -> CheapestPath {
        let mut path = vec![self.chapter_id(end).unwrap_or_default().to_string()];
        let mut choices = Vec::new();
        let mut cursor = end;

        while let Some(&(prev, edge)) = came_from.get(&cursor) {
            choices.push(self.choice_id(edge).unwrap_or_default().to_string());
            path.push(self.chapter_id(prev).unwrap_or_default().to_string());
            cursor = prev;
        }

        path.reverse();
        choices.reverse();
        CheapestPath {
            cost,
            path,
            choices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchbook_core::model::{Chapter, Choice};

    fn book(chapters: Vec<Chapter>, start: Option<&str>) -> Book {
        let mut book = Book::new("Routes");
        for chapter in chapters {
            book.chapters.insert(chapter.id.clone(), chapter);
        }
        book.start_chapter_id = start.map(str::to_string);
        book
    }

    fn chapter(id: &str, choices: &[(&str, &str, Option<u64>)]) -> Chapter {
        let mut chapter = Chapter::new(id, id.to_uppercase());
        for (choice_id, target, price) in choices {
            let mut choice = Choice::new(*choice_id, *choice_id).to(*target);
            choice.price = *price;
            chapter.choices.push(choice);
        }
        chapter
    }

    fn ending(id: &str) -> Chapter {
        let mut chapter = Chapter::new(id, id.to_uppercase());
        chapter.is_end_chapter = true;
        chapter
    }

    /// A(start) → B (10) → D(end), A → C (3) → D(end).
    fn diamond() -> Book {
        book(
            vec![
                chapter("A", &[("ab", "B", Some(10)), ("ac", "C", Some(3))]),
                chapter("B", &[("bd", "D", None)]),
                chapter("C", &[("cd", "D", None)]),
                ending("D"),
            ],
            Some("A"),
        )
    }

    #[test]
    fn picks_cheaper_branch() {
        let result = cheapest_path(&diamond(), Some("A")).expect("D is reachable");
        assert_eq!(result.cost, 3);
        assert_eq!(result.path, vec!["A", "C", "D"]);
        assert_eq!(result.choices, vec!["ac", "cd"]);
    }

    #[test]
    fn cheap_long_route_beats_expensive_short_one() {
        let book = book(
            vec![
                chapter("s", &[("direct", "e", Some(50)), ("hop", "m1", Some(1))]),
                chapter("m1", &[("hop2", "m2", Some(1))]),
                chapter("m2", &[("hop3", "e", Some(1))]),
                ending("e"),
            ],
            Some("s"),
        );
        let result = cheapest_from_start(&book).expect("e is reachable");
        assert_eq!(result.cost, 3);
        assert_eq!(result.path, vec!["s", "m1", "m2", "e"]);
    }

    #[test]
    fn nearest_of_several_endings_wins() {
        let book = book(
            vec![
                chapter("s", &[("pricey", "e1", Some(9)), ("cheap", "e2", Some(2))]),
                ending("e1"),
                ending("e2"),
            ],
            Some("s"),
        );
        let result = cheapest_from_start(&book).expect("an ending is reachable");
        assert_eq!(result.path, vec!["s", "e2"]);
        assert_eq!(result.cost, 2);
    }

    #[test]
    fn start_that_is_an_ending_costs_nothing() {
        let book = book(vec![ending("only")], Some("only"));
        let result = cheapest_from_start(&book).expect("start is an ending");
        assert_eq!(result.cost, 0);
        assert_eq!(result.path, vec!["only"]);
        assert!(result.choices.is_empty());
    }

    #[test]
    fn no_ending_means_no_route() {
        let book = book(
            vec![
                chapter("a", &[("ab", "b", None)]),
                chapter("b", &[("ba", "a", Some(1))]),
            ],
            Some("a"),
        );
        assert_eq!(cheapest_from_start(&book), None);
    }

    #[test]
    fn missing_or_unset_start_means_no_route() {
        assert_eq!(cheapest_path(&diamond(), None), None);
        assert_eq!(cheapest_path(&diamond(), Some("nope")), None);
    }

    #[test]
    fn dangling_choices_are_skipped() {
        let book = book(
            vec![
                chapter("a", &[("void", "ghost", Some(0)), ("real", "z", Some(4))]),
                ending("z"),
            ],
            Some("a"),
        );
        let result = cheapest_from_start(&book).expect("z is reachable");
        assert_eq!(result.cost, 4);
        assert_eq!(result.choices, vec!["real"]);
    }

    #[test]
    fn cycles_do_not_trap_the_solver() {
        let book = book(
            vec![
                chapter("a", &[("loop", "a", Some(0)), ("ab", "b", Some(1))]),
                chapter("b", &[("ba", "a", Some(0)), ("bz", "z", Some(5))]),
                ending("z"),
            ],
            Some("a"),
        );
        let result = cheapest_from_start(&book).expect("z is reachable");
        assert_eq!(result.cost, 6);
        assert_eq!(result.path, vec!["a", "b", "z"]);
    }

    #[test]
    fn parallel_choices_use_the_cheaper_one() {
        let book = book(
            vec![
                chapter("a", &[("gold", "z", Some(100)), ("tin", "z", Some(1))]),
                ending("z"),
            ],
            Some("a"),
        );
        let result = cheapest_from_start(&book).expect("z is reachable");
        assert_eq!(result.cost, 1);
        assert_eq!(result.choices, vec!["tin"]);
    }
}
