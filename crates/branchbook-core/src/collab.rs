//! Seams to collaborators the engine consumes but does not implement.
//!
//! Chapter bodies are opaque strings to the engine. When a transport layer
//! encrypts them, it keeps one content key per chapter in a
//! [`ContentKeyStore`], addressed by `(book_id, chapter_id)`.

use std::collections::HashMap;

/// Per-chapter content-key storage.
///
/// A transport that encrypts chapter bodies stores each key when it seals a
/// chapter and looks it up again when a reader unlocks it:
///
/// ```
/// use branchbook_core::collab::{ContentKeyStore, MemoryKeyStore};
/// use branchbook_core::{Book, Operation, apply};
///
/// let book = apply(&Book::new("Sealed"), &Operation::AddChapter);
/// let chapter_id = book.start_chapter_id.clone().unwrap_or_default();
///
/// let mut keys = MemoryKeyStore::new();
/// keys.put("book-1", &chapter_id, vec![7; 32]);
/// assert_eq!(keys.get("book-1", &chapter_id).map(<[u8]>::len), Some(32));
/// assert!(keys.get("book-2", &chapter_id).is_none());
/// ```
pub trait ContentKeyStore {
    /// Store (or replace) the key for one chapter.
    fn put(&mut self, book_id: &str, chapter_id: &str, key: Vec<u8>);

    fn get(&self, book_id: &str, chapter_id: &str) -> Option<&[u8]>;
}

/// Process-local key store, used by tests and single-session tools.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyStore {
    keys: HashMap<(String, String), Vec<u8>>,
}

impl MemoryKeyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContentKeyStore for MemoryKeyStore {
    fn put(&mut self, book_id: &str, chapter_id: &str, key: Vec<u8>) {
        self.keys
            .insert((book_id.to_string(), chapter_id.to_string()), key);
    }

    fn get(&self, book_id: &str, chapter_id: &str) -> Option<&[u8]> {
        self.keys
            .get(&(book_id.to_string(), chapter_id.to_string()))
            .map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_scoped_by_book_and_chapter() {
        let mut store = MemoryKeyStore::new();
        store.put("book-1", "ch-1", vec![1, 2, 3]);
        store.put("book-2", "ch-1", vec![9]);

        assert_eq!(store.get("book-1", "ch-1"), Some(&[1, 2, 3][..]));
        assert_eq!(store.get("book-2", "ch-1"), Some(&[9][..]));
        assert_eq!(store.get("book-1", "ch-2"), None);
    }

    #[test]
    fn put_replaces_existing_key() {
        let mut store = MemoryKeyStore::new();
        store.put("b", "c", vec![1]);
        store.put("b", "c", vec![2]);
        assert_eq!(store.get("b", "c"), Some(&[2][..]));
    }
}
