//! Publish gate: completeness checks and the immutable reader snapshot.
//!
//! [`validate_for_publish`] evaluates every rule (no short-circuit) in a
//! fixed order so the returned messages are deterministic:
//!
//! 1. non-empty title (after trimming)
//! 2. a well-formed payment address whenever anything is priced
//! 3. an existing start chapter
//! 4. at least one ending
//!
//! An empty list means the book may be published. [`publish`] runs the same
//! checks and, on success, freezes the book into a [`PublishedBook`] carrying
//! a BLAKE3 fingerprint of its canonical JSON form.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ErrorCode;
use crate::model::{Book, chapter_exists};

pub const TITLE_REQUIRED: &str = "Book title is required.";
pub const PAYMENT_ADDRESS_REQUIRED: &str =
    "A valid payment address is required for paid chapters.";
pub const START_CHAPTER_REQUIRED: &str = "A start chapter is required.";
pub const ENDING_REQUIRED: &str = "At least one ending chapter is required.";

/// Collect every reason `book` cannot be published yet.
#[must_use]
pub fn validate_for_publish(book: &Book) -> Vec<String> {
    let mut violations = Vec::new();

    if book.title.trim().is_empty() {
        violations.push(TITLE_REQUIRED.to_string());
    }

    if book.has_paid_content()
        && !book
            .payment_address
            .as_deref()
            .is_some_and(is_valid_payment_address)
    {
        violations.push(PAYMENT_ADDRESS_REQUIRED.to_string());
    }

    if !book
        .start_chapter_id
        .as_deref()
        .is_some_and(|id| chapter_exists(book, id))
    {
        violations.push(START_CHAPTER_REQUIRED.to_string());
    }

    if book.end_chapters().next().is_none() {
        violations.push(ENDING_REQUIRED.to_string());
    }

    violations
}

/// Check the `local-part@domain.tld` shape of a Lightning address.
///
/// Requires exactly one `@`, a non-empty local part, and a domain with an
/// interior dot. Whitespace anywhere is rejected.
#[must_use]
pub fn is_valid_payment_address(address: &str) -> bool {
    if address.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .split_once('.')
        .is_some_and(|(head, tail)| !head.is_empty() && !tail.is_empty() && !tail.ends_with('.'))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublishError {
    #[error("book is not publishable: {}", .0.join(" "))]
    Blocked(Vec<String>),
    #[error("failed to fingerprint book: {0}")]
    Fingerprint(String),
    #[error("snapshot fingerprint {stored} does not match its content ({actual})")]
    Tampered { stored: String, actual: String },
}

impl PublishError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Blocked(_) => ErrorCode::PublishBlocked,
            Self::Fingerprint(_) => ErrorCode::InternalUnexpected,
            Self::Tampered { .. } => ErrorCode::SnapshotTampered,
        }
    }
}

/// A validated, read-only snapshot handed to readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedBook {
    fingerprint: String,
    book: Book,
}

impl PublishedBook {
    #[must_use]
    pub fn book(&self) -> &Book {
        &self.book
    }

    /// `blake3:<hex>` over the canonical JSON encoding of the book.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Check a snapshot read back from storage: the stored fingerprint must
    /// match the book's content, and the book must still pass every publish
    /// rule.
    ///
    /// # Errors
    ///
    /// [`PublishError::Tampered`] on a fingerprint mismatch, otherwise
    /// [`PublishError::Blocked`] when the content fails validation.
    pub fn verify(&self) -> Result<(), PublishError> {
        let actual = fingerprint(&self.book)?;
        if actual != self.fingerprint {
            return Err(PublishError::Tampered {
                stored: self.fingerprint.clone(),
                actual,
            });
        }
        let violations = validate_for_publish(&self.book);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(PublishError::Blocked(violations))
        }
    }
}

/// Validate `book` and freeze it for readers.
///
/// # Errors
///
/// [`PublishError::Blocked`] with every violation when the book is
/// incomplete.
pub fn publish(book: &Book) -> Result<PublishedBook, PublishError> {
    let violations = validate_for_publish(book);
    if !violations.is_empty() {
        return Err(PublishError::Blocked(violations));
    }

    let fingerprint = fingerprint(book)?;
    info!(
        title = %book.title,
        chapters = book.chapters.len(),
        %fingerprint,
        "book published"
    );
    Ok(PublishedBook {
        fingerprint,
        book: book.clone(),
    })
}

/// Content fingerprint of a book. Chapters live in a `BTreeMap`, so equal
/// books always encode to the same bytes.
///
/// # Errors
///
/// [`PublishError::Fingerprint`] if the book cannot be encoded.
pub fn fingerprint(book: &Book) -> Result<String, PublishError> {
    let bytes =
        serde_json::to_vec(book).map_err(|err| PublishError::Fingerprint(err.to_string()))?;
    Ok(format!("blake3:{}", blake3::hash(&bytes).to_hex()))
}
