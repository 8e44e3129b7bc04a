//! Id generation for new chapters and choices.
//!
//! The reducer never calls a random source directly; it asks an injected
//! [`IdSource`]. Production code uses [`RandomIds`]; tests and replays use
//! [`SequentialIds`] so results are reproducible.

use uuid::Uuid;

/// What the id is for. Sources prefix ids by kind (`ch-`, `co-`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Chapter,
    Choice,
}

impl IdKind {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Chapter => "ch",
            Self::Choice => "co",
        }
    }
}

/// A supplier of candidate ids. The editor rejects candidates that collide
/// with ids already in the book and asks again.
pub trait IdSource {
    fn next_id(&mut self, kind: IdKind) -> String;
}

/// Random ids: kind prefix plus the first 12 hex digits of a v4 UUID.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self, kind: IdKind) -> String {
        let simple = Uuid::new_v4().simple().to_string();
        format!("{}-{}", kind.prefix(), &simple[..12])
    }
}

/// Deterministic ids: `ch-1`, `ch-2`, ... and `co-1`, `co-2`, ...
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    chapters: u64,
    choices: u64,
}

impl SequentialIds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self, kind: IdKind) -> String {
        let counter = match kind {
            IdKind::Chapter => &mut self.chapters,
            IdKind::Choice => &mut self.choices,
        };
        *counter += 1;
        format!("{}-{counter}", kind.prefix())
    }
}
