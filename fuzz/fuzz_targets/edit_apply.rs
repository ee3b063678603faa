//! Fuzz target for the buffer apply path
//!
//! Applies arbitrary edits, including out-of-range offsets, to arbitrary
//! buffers, then checks the diff engine against the result.
//!
//! # Invariants
//!
//! - `apply_edit` never panics and always yields valid UTF-8
//! - `apply_edit(old, compute_diff(old, new)) == new`
//! - `compute_diff(x, x)` is `None`
//! - A full replace yields exactly its text
//! - `BufferStore` agrees with `apply_edit`

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use livetype_core::{BufferStore, apply_edit, compute_diff};
use livetype_proto::EditOp;

#[derive(Debug, Arbitrary)]
enum FuzzOp {
    Add { index: usize, text: String },
    Delete { index: usize, count: usize },
    Replace { index: usize, text: String },
    FullReplace { text: String },
}

impl From<FuzzOp> for EditOp {
    fn from(op: FuzzOp) -> Self {
        match op {
            FuzzOp::Add { index, text } => EditOp::Add { index, text },
            FuzzOp::Delete { index, count } => EditOp::Delete { index, count },
            FuzzOp::Replace { index, text } => EditOp::Replace { index, text },
            FuzzOp::FullReplace { text } => EditOp::FullReplace { text },
        }
    }
}

#[derive(Debug, Arbitrary)]
struct Input {
    initial: String,
    ops: Vec<FuzzOp>,
}

fuzz_target!(|input: Input| {
    let mut store = BufferStore::new();
    store.apply("author", "fuzz", &EditOp::FullReplace { text: input.initial.clone() });

    let mut text = input.initial;
    for op in input.ops.into_iter().take(64) {
        let op = EditOp::from(op);
        let next = apply_edit(&text, &op);

        if let EditOp::FullReplace { text: replacement } = &op {
            assert_eq!(&next, replacement);
        }

        match compute_diff(&text, &next) {
            Some(diff) => assert_eq!(apply_edit(&text, &diff), next),
            None => assert_eq!(text, next),
        }
        assert!(compute_diff(&next, &next).is_none());

        let buffer = store.apply("author", "fuzz", &op);
        assert_eq!(buffer.text(), next);

        text = next;
    }
});
