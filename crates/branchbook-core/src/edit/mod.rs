//! The authoring reducer.
//!
//! Every operation is a pure transformation `(&Book, &Operation) -> Book`:
//! the caller's book is cloned and the clone is changed, so callers can keep
//! the previous value for undo/redo. The reducer is total. Operations that
//! reference absent chapters or choices, and [`Operation::Unknown`], return
//! an unchanged copy instead of failing. Patches are merged field by field
//! with no shape validation.
//!
//! # Bookkeeping
//!
//! | Operation | Extra effect |
//! |---|---|
//! | `AddChapter` on an empty book | new chapter becomes the start chapter |
//! | `DeleteChapter` | prunes every choice targeting the deleted id; clears `start_chapter_id` if it pointed there |
//! | `UpdateChapter { is_start_chapter: true }` | clears the start flag elsewhere, sets `start_chapter_id` |
//! | `UpdateChapter { is_end_chapter: true }` | drops the chapter's choices |
//! | `UpdateChoice` with a target | sets `previous_chapter_id` on the new target (last writer wins) |
//! | `AddChoice` on an end chapter | no-op |

pub mod ids;
pub mod operation;

use tracing::debug;

use crate::config::AuthoringConfig;
use crate::model::{Book, Chapter, Choice};

pub use ids::{IdKind, IdSource, RandomIds, SequentialIds};
pub use operation::{ChapterPatch, ChoicePatch, MetaPatch, Operation};

/// Label given to freshly added choices.
pub const NEW_CHOICE_LABEL: &str = "New choice";

/// Candidates requested from the id source before falling back to suffixes.
const MAX_ID_ATTEMPTS: usize = 16;

/// Apply one operation with default settings (random ids, `Chapter N` names).
#[must_use]
pub fn apply(book: &Book, op: &Operation) -> Book {
    Editor::default().apply(book, op)
}

/// Reducer bound to an id source and authoring settings.
#[derive(Debug, Clone)]
pub struct Editor<I = RandomIds> {
    ids: I,
    chapter_name_prefix: String,
}

impl Default for Editor<RandomIds> {
    fn default() -> Self {
        Self::with_ids(RandomIds)
    }
}

impl<I: IdSource> Editor<I> {
    pub fn with_ids(ids: I) -> Self {
        Self {
            ids,
            chapter_name_prefix: AuthoringConfig::default().chapter_name_prefix,
        }
    }

    pub fn from_config(ids: I, config: &AuthoringConfig) -> Self {
        Self {
            ids,
            chapter_name_prefix: config.chapter_name_prefix.clone(),
        }
    }

    /// Apply `op` to a copy of `book` and return the copy.
    pub fn apply(&mut self, book: &Book, op: &Operation) -> Book {
        let mut next = book.clone();
        let changed = self.reduce(&mut next, op);
        debug!(op = op.kind(), changed, "applied authoring operation");
        next
    }

    /// Fold a sequence of operations over `book`.
    pub fn apply_all<'a>(
        &mut self,
        book: &Book,
        ops: impl IntoIterator<Item = &'a Operation>,
    ) -> Book {
        ops.into_iter()
            .fold(book.clone(), |acc, op| self.apply(&acc, op))
    }

    /// Mutate `book` in place; returns `false` when the operation was a no-op.
    fn reduce(&mut self, book: &mut Book, op: &Operation) -> bool {
        match op {
            Operation::SetMeta { patch } => {
                patch.merge_into(book);
                true
            }
            Operation::AddChapter => {
                self.add_chapter(book);
                true
            }
            Operation::DeleteChapter { id } => delete_chapter(book, id),
            Operation::UpdateChapter { id, patch } => update_chapter(book, id, patch),
            Operation::AddChoice { chapter_id } => self.add_choice(book, chapter_id),
            Operation::DeleteChoice {
                chapter_id,
                choice_id,
            } => delete_choice(book, chapter_id, choice_id),
            Operation::UpdateChoice {
                chapter_id,
                choice_id,
                patch,
            } => update_choice(book, chapter_id, choice_id, patch),
            Operation::Unknown => false,
        }
    }

    fn add_chapter(&mut self, book: &mut Book) {
        let id = self.fresh_id(book, IdKind::Chapter);
        let name = format!("{} {}", self.chapter_name_prefix, book.chapters.len() + 1);
        let mut chapter = Chapter::new(id.clone(), name);

        if book.chapters.is_empty() {
            chapter.is_start_chapter = true;
            book.start_chapter_id = Some(id.clone());
        }

        book.chapters.insert(id, chapter);
    }

    fn add_choice(&mut self, book: &mut Book, chapter_id: &str) -> bool {
        match book.chapters.get(chapter_id) {
            Some(chapter) if !chapter.is_end_chapter => {}
            _ => return false,
        }

        let id = self.fresh_id(book, IdKind::Choice);
        if let Some(chapter) = book.chapters.get_mut(chapter_id) {
            chapter.choices.push(Choice::new(id, NEW_CHOICE_LABEL));
        }
        true
    }

    fn fresh_id(&mut self, book: &Book, kind: IdKind) -> String {
        let taken = |candidate: &str| match kind {
            IdKind::Chapter => book.chapters.contains_key(candidate),
            IdKind::Choice => book
                .chapters
                .values()
                .any(|c| c.choices.iter().any(|choice| choice.id == candidate)),
        };

        let mut candidate = self.ids.next_id(kind);
        for _ in 1..MAX_ID_ATTEMPTS {
            if !taken(&candidate) {
                return candidate;
            }
            candidate = self.ids.next_id(kind);
        }

        let base = candidate;
        let mut suffix = 2_u64;
        loop {
            let suffixed = format!("{base}-{suffix}");
            if !taken(&suffixed) {
                return suffixed;
            }
            suffix += 1;
        }
    }
}

fn delete_chapter(book: &mut Book, id: &str) -> bool {
    if book.chapters.remove(id).is_none() {
        return false;
    }

    for chapter in book.chapters.values_mut() {
        chapter.choices.retain(|choice| choice.target() != Some(id));
    }

    if book.start_chapter_id.as_deref() == Some(id) {
        book.start_chapter_id = None;
    }
    true
}

fn update_chapter(book: &mut Book, id: &str, patch: &ChapterPatch) -> bool {
    let Some(chapter) = book.chapters.get_mut(id) else {
        return false;
    };
    patch.merge_into(chapter);

    match patch.is_start_chapter {
        Some(true) => {
            for chapter in book.chapters.values_mut() {
                chapter.is_start_chapter = chapter.id == id;
            }
            book.start_chapter_id = Some(id.to_string());
        }
        Some(false) => {
            chapter.is_start_chapter = false;
            if book.start_chapter_id.as_deref() == Some(id) {
                book.start_chapter_id = None;
            }
        }
        None => {}
    }
    true
}

fn delete_choice(book: &mut Book, chapter_id: &str, choice_id: &str) -> bool {
    let Some(chapter) = book.chapters.get_mut(chapter_id) else {
        return false;
    };
    let before = chapter.choices.len();
    chapter.choices.retain(|choice| choice.id != choice_id);
    chapter.choices.len() != before
}

fn update_choice(book: &mut Book, chapter_id: &str, choice_id: &str, patch: &ChoicePatch) -> bool {
    let Some(choice) = book
        .chapters
        .get_mut(chapter_id)
        .and_then(|chapter| chapter.choices.iter_mut().find(|c| c.id == choice_id))
    else {
        return false;
    };
    patch.merge_into(choice);

    if let Some(target) = &patch.target_chapter_id
        && let Some(target_chapter) = book.chapters.get_mut(target)
    {
        target_chapter.previous_chapter_id = Some(chapter_id.to_string());
    }
    true
}
