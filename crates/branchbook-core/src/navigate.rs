//! Read-time traversal over a finished book.
//!
//! A [`Navigator`] owns one reading session: a cursor, an append-only visit
//! history, and a private chapter map built once from the book. It never
//! writes back to the book.
//!
//! ```text
//! Uninitialized ──enter──▶ Active ──follow_choice / go_back──▶ Active
//!                            │
//!                            └── current chapter is an ending ──▶ AtEnd
//! ```
//!
//! `AtEnd` is still a live cursor. It only means no choices are offered.

use std::collections::HashMap;

use tracing::debug;

use crate::error::ErrorCode;
use crate::model::{Book, Chapter, Choice};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigateError {
    #[error("chapter not found: {0}")]
    ChapterNotFound(String),
    #[error("choice not found: {0}")]
    ChoiceNotFound(String),
}

impl NavigateError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::ChapterNotFound(_) => ErrorCode::ChapterNotFound,
            Self::ChoiceNotFound(_) => ErrorCode::ChoiceNotFound,
        }
    }
}

/// Coarse session state derived from the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Uninitialized,
    Active,
    AtEnd,
}

#[derive(Debug, Clone)]
pub struct Navigator {
    title: String,
    start_chapter_id: Option<String>,
    chapters: HashMap<String, Chapter>,
    current: Option<String>,
    history: Vec<String>,
}

impl Navigator {
    #[must_use]
    pub fn new(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            start_chapter_id: book.start_chapter_id.clone(),
            chapters: book
                .chapters
                .iter()
                .map(|(id, chapter)| (id.clone(), chapter.clone()))
                .collect(),
            current: None,
            history: Vec::new(),
        }
    }

    #[must_use]
    pub fn book_title(&self) -> &str {
        &self.title
    }

    /// Enter the book's start chapter.
    ///
    /// # Errors
    ///
    /// [`NavigateError::ChapterNotFound`] when no start chapter is set or it
    /// does not exist.
    pub fn start(&mut self) -> Result<&Chapter, NavigateError> {
        let start = self.start_chapter_id.clone().unwrap_or_default();
        self.enter(&start)
    }

    /// Move the cursor to `chapter_id`.
    ///
    /// The id is appended to the history unless it is already the most
    /// recent entry.
    ///
    /// # Errors
    ///
    /// [`NavigateError::ChapterNotFound`] when the chapter does not exist.
    pub fn enter(&mut self, chapter_id: &str) -> Result<&Chapter, NavigateError> {
        let Some(chapter) = self.chapters.get(chapter_id) else {
            return Err(NavigateError::ChapterNotFound(chapter_id.to_string()));
        };

        if self.history.last().map(String::as_str) != Some(chapter_id) {
            self.history.push(chapter_id.to_string());
        }
        self.current = Some(chapter_id.to_string());
        debug!(chapter = chapter_id, depth = self.history.len(), "entered chapter");
        Ok(chapter)
    }

    /// Follow an offered choice, matched by id first and then by label.
    ///
    /// # Errors
    ///
    /// [`NavigateError::ChoiceNotFound`] when nothing matches `key` or the
    /// matched choice points at a chapter that does not exist.
    pub fn follow_choice(&mut self, key: &str) -> Result<&Chapter, NavigateError> {
        let choices = self.available_choices();
        let matched = choices
            .iter()
            .find(|choice| choice.id == key)
            .or_else(|| choices.iter().find(|choice| choice.label == key));

        let target = matched
            .and_then(|choice| choice.target())
            .filter(|target| self.chapters.contains_key(*target))
            .map(str::to_string)
            .ok_or_else(|| NavigateError::ChoiceNotFound(key.to_string()))?;

        self.enter(&target)
    }

    /// Step to the current chapter's recorded predecessor.
    ///
    /// Silently does nothing (returns `false`) when there is no current
    /// chapter, no predecessor, or the predecessor no longer exists. Use
    /// [`Navigator::can_go_back`] to decide whether to offer the control.
    pub fn go_back(&mut self) -> bool {
        let Some(previous) = self.back_target().map(str::to_string) else {
            return false;
        };
        self.enter(&previous).is_ok()
    }

    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.back_target().is_some()
    }

    #[must_use]
    pub fn current_chapter(&self) -> Option<&Chapter> {
        self.current.as_deref().and_then(|id| self.chapters.get(id))
    }

    /// Choices offered at the cursor. Endings offer none.
    #[must_use]
    pub fn available_choices(&self) -> &[Choice] {
        match self.current_chapter() {
            Some(chapter) if !chapter.is_end_chapter => &chapter.choices,
            _ => &[],
        }
    }

    /// Every chapter entered this session, oldest first.
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    #[must_use]
    pub fn state(&self) -> NavState {
        match self.current_chapter() {
            None => NavState::Uninitialized,
            Some(chapter) if chapter.is_end_chapter => NavState::AtEnd,
            Some(_) => NavState::Active,
        }
    }

    fn back_target(&self) -> Option<&str> {
        self.current_chapter()
            .and_then(|chapter| chapter.previous_chapter_id.as_deref())
            .filter(|id| self.chapters.contains_key(*id))
    }
}
