//! Single-hunk diff between two versions of one buffer.
//!
//! Interactive typing changes a buffer in one contiguous place per keystroke
//! or paste, so one [`EditOp`] per change is enough. The engine finds the
//! common prefix and suffix of the two versions and describes what lies
//! between them.
//!
//! # Invariants
//!
//! - `compute_diff(a, a)` is `None`. Nothing is sent when nothing changed.
//! - For every `a` and `b`, applying `compute_diff(a, b)` to `a` yields `b`.
//! - Offsets and counts are code points.

use std::cmp::Ordering;

use livetype_proto::EditOp;

/// Compute the edit that turns `old` into `new`.
///
/// - pure insertion: `add` of the inserted run at the first mismatch;
/// - pure removal: `delete` of the removed run at the first mismatch;
/// - anything else (same length with a mismatch, or a change that both
///   removes and inserts): `replace` from the first mismatch with the rest of
///   `new`. Receivers cut the old buffer at `index` before appending, so the
///   result is exact.
///
/// Returns `None` when the strings are equal.
pub fn compute_diff(old: &str, new: &str) -> Option<EditOp> {
    if old == new {
        return None;
    }

    let old: Vec<char> = old.chars().collect();
    let new: Vec<char> = new.chars().collect();

    let prefix = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
    // Suffix is searched only after the prefix so the two never overlap.
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let op = match new.len().cmp(&old.len()) {
        Ordering::Greater if prefix + suffix == old.len() => EditOp::Add {
            index: prefix,
            text: new[prefix..new.len() - suffix].iter().collect(),
        },
        Ordering::Less if prefix + suffix == new.len() => {
            EditOp::Delete { index: prefix, count: old.len() - new.len() }
        },
        _ => EditOp::Replace { index: prefix, text: new[prefix..].iter().collect() },
    };

    Some(op)
}

/// Edit that sets a buffer to `text` regardless of what receivers hold.
///
/// Used for the first send after joining a room or reconnecting, when no
/// receiver can be assumed to share a prior state.
pub fn full_resync(text: &str) -> EditOp {
    EditOp::FullReplace { text: text.to_string() }
}
