use serde::{Deserialize, Serialize};

/// A directed, optionally priced edge from one chapter to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub id: String,
    pub label: String,
    /// Unset until the author picks a destination.
    #[serde(
        default,
        alias = "targetStateId",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_chapter_id: Option<String>,
    /// Satoshis required to traverse this edge. `None` and `Some(0)` are free.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,
}

impl Choice {
    /// Create an untargeted, free choice.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            target_chapter_id: None,
            price: None,
        }
    }

    /// Builder-style target assignment.
    #[must_use]
    pub fn to(mut self, target: impl Into<String>) -> Self {
        self.target_chapter_id = Some(target.into());
        self
    }

    /// Builder-style price assignment.
    #[must_use]
    pub const fn priced(mut self, sats: u64) -> Self {
        self.price = Some(sats);
        self
    }

    /// Edge weight used by route computations (absent price = 0).
    #[must_use]
    pub fn cost(&self) -> u64 {
        self.price.unwrap_or(0)
    }

    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.cost() > 0
    }

    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.target_chapter_id.as_deref()
    }
}

/// A node in the narrative graph.
///
/// Chapters never hold references to other chapters, only ids. The body
/// text is opaque: it may be plain prose or ciphertext produced by a
/// content-encryption collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_start_chapter: bool,
    #[serde(default)]
    pub is_end_chapter: bool,
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Most recent author-declared predecessor. Advisory only: it is
    /// overwritten on every retarget and never repaired on deletion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_chapter_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,
}

impl Chapter {
    /// Create an empty, unflagged chapter.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content: String::new(),
            is_start_chapter: false,
            is_end_chapter: false,
            choices: Vec::new(),
            previous_chapter_id: None,
            price: None,
        }
    }

    /// Look up an outgoing choice by id.
    #[must_use]
    pub fn choice(&self, choice_id: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == choice_id)
    }

    /// `true` when entering this chapter, or any of its outgoing choices,
    /// costs something.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.price.unwrap_or(0) > 0 || self.choices.iter().any(Choice::is_paid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_price_is_free() {
        let choice = Choice::new("c1", "Go").priced(0);
        assert_eq!(choice.cost(), 0);
        assert!(!choice.is_paid());
        assert!(!Chapter::new("a", "A").is_paid());
    }

    #[test]
    fn chapter_is_paid_through_its_choices() {
        let mut chapter = Chapter::new("a", "A");
        chapter.choices.push(Choice::new("c1", "Go").to("b").priced(21));
        assert!(chapter.is_paid());
    }

    #[test]
    fn target_state_id_alias_is_accepted() {
        let choice: Choice =
            serde_json::from_str(r#"{"id":"c1","label":"Left","targetStateId":"b"}"#)
                .expect("valid choice json");
        assert_eq!(choice.target(), Some("b"));
        assert_eq!(choice.price, None);
    }

    #[test]
    fn serializes_camel_case_fields() {
        let mut chapter = Chapter::new("a", "A");
        chapter.is_start_chapter = true;
        let json = serde_json::to_value(&chapter).expect("serialize chapter");
        assert_eq!(json["isStartChapter"], true);
        assert_eq!(json["isEndChapter"], false);
        assert!(json.get("previousChapterId").is_none());
    }
}
