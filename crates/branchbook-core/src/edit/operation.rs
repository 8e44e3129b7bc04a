//! Authoring operations and their partial-update payloads.
//!
//! Operations travel as internally tagged JSON (`{"type": "addChapter"}`).
//! An unrecognized `type` deserializes to [`Operation::Unknown`], which the
//! reducer treats as a no-op.

use serde::{Deserialize, Serialize};

use crate::model::{Book, Chapter, Choice};

/// The closed set of authoring operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Operation {
    /// Merge book-level metadata.
    SetMeta { patch: MetaPatch },
    /// Append a new chapter with a generated id.
    AddChapter,
    /// Remove a chapter and every choice targeting it.
    DeleteChapter { id: String },
    /// Merge fields into one chapter.
    UpdateChapter { id: String, patch: ChapterPatch },
    /// Append a fresh choice to a chapter.
    AddChoice { chapter_id: String },
    /// Remove one choice from a chapter.
    DeleteChoice {
        chapter_id: String,
        choice_id: String,
    },
    /// Merge fields into one choice.
    UpdateChoice {
        chapter_id: String,
        choice_id: String,
        patch: ChoicePatch,
    },
    /// Any operation kind this build does not know about.
    #[serde(other)]
    Unknown,
}

impl Operation {
    /// Stable kind name, used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SetMeta { .. } => "setMeta",
            Self::AddChapter => "addChapter",
            Self::DeleteChapter { .. } => "deleteChapter",
            Self::UpdateChapter { .. } => "updateChapter",
            Self::AddChoice { .. } => "addChoice",
            Self::DeleteChoice { .. } => "deleteChoice",
            Self::UpdateChoice { .. } => "updateChoice",
            Self::Unknown => "unknown",
        }
    }
}

/// Book metadata fields; absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetaPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_address: Option<String>,
}

impl MetaPatch {
    pub(crate) fn merge_into(&self, book: &mut Book) {
        if let Some(title) = &self.title {
            book.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            book.description = Some(description.clone());
        }
        if let Some(address) = &self.payment_address {
            book.payment_address = Some(address.clone());
        }
    }
}

/// Chapter fields; absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChapterPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_start_chapter: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_end_chapter: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_chapter_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,
}

impl ChapterPatch {
    /// Merge the chapter-local fields. The start flag is book-level state
    /// and is handled by the reducer.
    pub(crate) fn merge_into(&self, chapter: &mut Chapter) {
        if let Some(name) = &self.name {
            chapter.name.clone_from(name);
        }
        if let Some(content) = &self.content {
            chapter.content.clone_from(content);
        }
        if let Some(is_end) = self.is_end_chapter {
            chapter.is_end_chapter = is_end;
            if is_end {
                chapter.choices.clear();
            }
        }
        if let Some(previous) = &self.previous_chapter_id {
            chapter.previous_chapter_id = Some(previous.clone());
        }
        if let Some(price) = self.price {
            chapter.price = Some(price);
        }
    }
}

/// Choice fields; absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChoicePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(alias = "targetStateId", skip_serializing_if = "Option::is_none")]
    pub target_chapter_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,
}

impl ChoicePatch {
    pub(crate) fn merge_into(&self, choice: &mut Choice) {
        if let Some(label) = &self.label {
            choice.label.clone_from(label);
        }
        if let Some(target) = &self.target_chapter_id {
            choice.target_chapter_id = Some(target.clone());
        }
        if let Some(price) = self.price {
            choice.price = Some(price);
        }
    }
}
