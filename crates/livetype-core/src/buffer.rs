//! Per-author buffer reconstruction.
//!
//! Every participant in a room owns exactly one buffer: the text they are
//! currently typing. Receivers rebuild it by applying that author's edits in
//! arrival order. [`BufferStore`] holds one [`Buffer`] per author for the
//! current room.
//!
//! # Invariants
//!
//! - A buffer is only ever changed by edits declared by its owner. The store
//!   is keyed by author, so this holds as long as callers pass the edit's
//!   declared author.
//! - Buffers are created lazily with empty text. Only a `full-replace` is
//!   independent of prior state, so the first edit any author sends after
//!   joining must be one.
//! - Applying an edit never panics: out-of-range offsets are clamped to the
//!   buffer, the same way slicing past the end yields an empty tail.

use livetype_proto::{EditOp, UserId};

/// One author's reconstructed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    owner: UserId,
    username: String,
    text: String,
    revision: u64,
}

impl Buffer {
    fn new(owner: UserId, username: String) -> Self {
        Self { owner, username, text: String::new(), revision: 0 }
    }

    /// Author who owns this buffer.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Author's display name, as last reported.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of edits applied since the buffer was created.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn apply(&mut self, op: &EditOp) {
        self.text = apply_edit(&self.text, op);
        self.revision += 1;
    }
}

/// Buffers for every author seen in the current room.
///
/// Iteration order is first-seen order, which is the order panes are shown.
#[derive(Debug, Clone, Default)]
pub struct BufferStore {
    buffers: Vec<Buffer>,
}

impl BufferStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `op` to `author`'s buffer, creating it if absent.
    ///
    /// A non-empty `username` replaces the stored display name.
    pub fn apply(&mut self, author: &str, username: &str, op: &EditOp) -> &Buffer {
        let index = self.position_or_insert(author, username);
        let buffer = &mut self.buffers[index];
        buffer.apply(op);
        buffer
    }

    /// Make sure `author` has a buffer, without changing its text.
    ///
    /// Returns true if the buffer was created.
    pub fn ensure(&mut self, author: &str, username: &str) -> bool {
        let existed = self.contains(author);
        self.position_or_insert(author, username);
        !existed
    }

    /// Buffer for `author`. `None` if never seen or removed.
    pub fn get(&self, author: &str) -> Option<&Buffer> {
        self.buffers.iter().find(|b| b.owner == author)
    }

    /// Check whether `author` has a buffer.
    pub fn contains(&self, author: &str) -> bool {
        self.get(author).is_some()
    }

    /// Drop `author`'s buffer, returning it if present.
    pub fn remove(&mut self, author: &str) -> Option<Buffer> {
        let index = self.buffers.iter().position(|b| b.owner == author)?;
        Some(self.buffers.remove(index))
    }

    /// Drop every buffer.
    pub fn clear(&mut self) {
        self.buffers.clear();
    }

    /// Buffers in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &Buffer> {
        self.buffers.iter()
    }

    /// Number of buffers.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Check if there are no buffers.
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    fn position_or_insert(&mut self, author: &str, username: &str) -> usize {
        let index = match self.buffers.iter().position(|b| b.owner == author) {
            Some(index) => index,
            None => {
                tracing::debug!(author, username, "creating buffer");
                self.buffers.push(Buffer::new(author.to_string(), username.to_string()));
                self.buffers.len() - 1
            },
        };

        let buffer = &mut self.buffers[index];
        if !username.is_empty() && buffer.username != username {
            buffer.username = username.to_string();
        }
        index
    }
}

/// Apply one edit to `text`, returning the new text.
///
/// Offsets are code points and are clamped into the text.
pub fn apply_edit(text: &str, op: &EditOp) -> String {
    match op {
        EditOp::Add { index, text: inserted } => {
            let at = byte_offset(text, *index);
            let mut out = String::with_capacity(text.len() + inserted.len());
            out.push_str(&text[..at]);
            out.push_str(inserted);
            out.push_str(&text[at..]);
            out
        },
        EditOp::Delete { index, count } => {
            let start = byte_offset(text, *index);
            let end = start + byte_offset(&text[start..], *count);
            let mut out = String::with_capacity(text.len() - (end - start));
            out.push_str(&text[..start]);
            out.push_str(&text[end..]);
            out
        },
        EditOp::Replace { index, text: tail } => {
            let at = byte_offset(text, *index);
            let mut out = String::with_capacity(at + tail.len());
            out.push_str(&text[..at]);
            out.push_str(tail);
            out
        },
        EditOp::FullReplace { text: replacement } => replacement.clone(),
    }
}

/// Byte offset of code point `index`, clamped to `text.len()`.
fn byte_offset(text: &str, index: usize) -> usize {
    text.char_indices().nth(index).map_or(text.len(), |(offset, _)| offset)
}

#[cfg(test)]
mod tests {
    use livetype_proto::edit::END_OF_BUFFER;

    use super::*;

    fn add(index: usize, text: &str) -> EditOp {
        EditOp::Add { index, text: text.into() }
    }

    #[test]
    fn add_inserts_at_code_point() {
        assert_eq!(apply_edit("hello", &add(5, " world")), "hello world");
        assert_eq!(apply_edit("hllo", &add(1, "e")), "hello");
        assert_eq!(apply_edit("né", &add(2, "e")), "née");
    }

    #[test]
    fn add_past_end_appends() {
        assert_eq!(apply_edit("abc", &add(99, "d")), "abcd");
        assert_eq!(apply_edit("abc", &add(END_OF_BUFFER, "d")), "abcd");
    }

    #[test]
    fn delete_removes_code_points() {
        assert_eq!(apply_edit("hello world", &EditOp::Delete { index: 5, count: 6 }), "hello");
        assert_eq!(apply_edit("a🙂b", &EditOp::Delete { index: 1, count: 1 }), "ab");
    }

    #[test]
    fn delete_out_of_range_is_clamped() {
        assert_eq!(apply_edit("abc", &EditOp::Delete { index: 1, count: 99 }), "a");
        assert_eq!(apply_edit("abc", &EditOp::Delete { index: 7, count: 2 }), "abc");
        assert_eq!(apply_edit("abc", &EditOp::Delete { index: usize::MAX, count: usize::MAX }), "abc");
    }

    #[test]
    fn replace_truncates_the_tail() {
        let op = EditOp::Replace { index: 2, text: "X".into() };
        assert_eq!(apply_edit("abcdef", &op), "abX");
    }

    #[test]
    fn full_replace_ignores_prior_state() {
        let op = EditOp::FullReplace { text: "fresh".into() };
        assert_eq!(apply_edit("anything at all", &op), "fresh");
    }

    #[test]
    fn store_creates_lazily_and_tracks_revision() {
        let mut store = BufferStore::new();
        assert!(store.get("u1").is_none());

        store.apply("u1", "ann", &EditOp::FullReplace { text: "hi".into() });
        store.apply("u1", "ann", &add(2, "!"));

        let buffer = store.get("u1").expect("buffer exists");
        assert_eq!(buffer.text(), "hi!");
        assert_eq!(buffer.username(), "ann");
        assert_eq!(buffer.revision(), 2);
    }

    #[test]
    fn store_keeps_first_seen_order() {
        let mut store = BufferStore::new();
        store.apply("b", "bob", &add(0, "1"));
        store.apply("a", "ann", &add(0, "2"));
        store.apply("b", "bob", &add(1, "3"));

        let owners: Vec<_> = store.iter().map(Buffer::owner).collect();
        assert_eq!(owners, ["b", "a"]);
    }

    #[test]
    fn remove_and_clear() {
        let mut store = BufferStore::new();
        store.apply("a", "ann", &add(0, "x"));
        store.apply("b", "bob", &add(0, "y"));

        assert_eq!(store.remove("a").map(|b| b.text().to_string()), Some("x".to_string()));
        assert!(store.get("a").is_none());
        assert!(store.remove("a").is_none());

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn ensure_does_not_touch_text() {
        let mut store = BufferStore::new();
        assert!(store.ensure("a", "ann"));
        store.apply("a", "", &add(0, "x"));
        assert!(!store.ensure("a", "ann"));

        let buffer = store.get("a").expect("buffer exists");
        assert_eq!(buffer.text(), "x");
        assert_eq!(buffer.username(), "ann");
    }
}
