//! Buffer edit operations.
//!
//! An [`EditOp`] describes how one author's buffer changed since the previous
//! state every receiver holds for that author. Exactly one op travels with
//! each `chat update` event.
//!
//! All offsets are Unicode code-point offsets, never byte offsets.
//!
//! # Wire format
//!
//! ```json
//! {"type": "add", "index": 5, "text": " world"}
//! {"type": "delete", "index": 5, "count": 6}
//! {"type": "replace", "index": 0, "text": "hi"}
//! {"type": "full-replace", "text": "hello"}
//! ```
//!
//! Missing fields fall back to the values peers have always assumed: an `add`
//! without an index appends, every other missing index or count is zero and
//! every missing text is empty.

use serde::{Deserialize, Serialize};

/// Index used by an `add` that omits its offset: append at the end.
pub const END_OF_BUFFER: usize = usize::MAX;

fn end_of_buffer() -> usize {
    END_OF_BUFFER
}

/// One edit to an author's buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EditOp {
    /// Insert `text` at code-point offset `index`.
    Add {
        /// Code-point offset of the insertion.
        #[serde(default = "end_of_buffer")]
        index: usize,
        /// Inserted text.
        #[serde(default)]
        text: String,
    },

    /// Remove `count` code points starting at `index`.
    Delete {
        /// Code-point offset of the first removed character.
        #[serde(default)]
        index: usize,
        /// Number of code points removed.
        #[serde(default)]
        count: usize,
    },

    /// Keep the first `index` code points and append `text`.
    ///
    /// Everything after `index` in the old buffer is dropped, even when
    /// `text` is shorter than what it replaces.
    Replace {
        /// Code-point offset where the old buffer is cut.
        #[serde(default)]
        index: usize,
        /// Text appended after the cut.
        #[serde(default)]
        text: String,
    },

    /// Replace the whole buffer with `text`.
    FullReplace {
        /// New buffer content.
        #[serde(default)]
        text: String,
    },
}

impl EditOp {
    /// Wire name of the op (`type` field).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Delete { .. } => "delete",
            Self::Replace { .. } => "replace",
            Self::FullReplace { .. } => "full-replace",
        }
    }

    /// Returns true if applying this op does not depend on prior buffer state.
    pub fn is_full_replace(&self) -> bool {
        matches!(self, Self::FullReplace { .. })
    }
}
