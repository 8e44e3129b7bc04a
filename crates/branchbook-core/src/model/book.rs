//! The story aggregate and the invariant predicates shared by the editor,
//! the validator, and the route solver.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::chapter::{Chapter, Choice};

/// A branching story: an id-indexed arena of chapters.
///
/// Chapters are keyed by id in a `BTreeMap`, so iteration and
/// serialization order are deterministic even though insertion order
/// carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Lightning-style `name@domain.tld` address receiving chapter payments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_address: Option<String>,
    #[serde(default)]
    pub chapters: BTreeMap<String, Chapter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_chapter_id: Option<String>,
}

/// One incoming edge: `chapter_id` holds a choice `choice_id` that targets
/// the chapter being looked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterRef {
    pub chapter_id: String,
    pub choice_id: String,
}

impl Book {
    /// Create an empty book with the given title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn chapter(&self, id: &str) -> Option<&Chapter> {
        self.chapters.get(id)
    }

    /// The chapter `start_chapter_id` points at, if it exists.
    #[must_use]
    pub fn start_chapter(&self) -> Option<&Chapter> {
        self.start_chapter_id
            .as_deref()
            .and_then(|id| self.chapters.get(id))
    }

    /// All chapters flagged as endings, in id order.
    pub fn end_chapters(&self) -> impl Iterator<Item = &Chapter> {
        self.chapters.values().filter(|c| c.is_end_chapter)
    }

    /// `true` if any chapter or choice carries a positive price.
    #[must_use]
    pub fn has_paid_content(&self) -> bool {
        self.chapters.values().any(Chapter::is_paid)
    }

    /// Total number of choices across all chapters.
    #[must_use]
    pub fn choice_count(&self) -> usize {
        self.chapters.values().map(|c| c.choices.len()).sum()
    }
}

/// Return `true` if `id` names a chapter in `book`.
#[must_use]
pub fn chapter_exists(book: &Book, id: &str) -> bool {
    book.chapters.contains_key(id)
}

/// Return `true` if `choice` has no target or targets a missing chapter.
#[must_use]
pub fn is_dangling(choice: &Choice, book: &Book) -> bool {
    choice
        .target()
        .is_none_or(|target| !chapter_exists(book, target))
}

/// Compute every incoming edge of `id` from the current choice lists.
///
/// This is the true reverse adjacency and is derived on each call. It is
/// independent of [`Chapter::previous_chapter_id`], which only remembers the
/// most recently edited predecessor.
#[must_use]
pub fn parents_of(book: &Book, id: &str) -> Vec<ChapterRef> {
    book.chapters
        .values()
        .flat_map(|chapter| {
            chapter
                .choices
                .iter()
                .filter(|choice| choice.target() == Some(id))
                .map(|choice| ChapterRef {
                    chapter_id: chapter.id.clone(),
                    choice_id: choice.id.clone(),
                })
        })
        .collect()
}
