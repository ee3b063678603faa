//! Property-based tests for the diff engine and buffer reconstruction.
//!
//! A receiver applying a sender's edits in order must end with exactly the
//! sender's text, whatever the sender typed.

use livetype_core::{BufferStore, apply_edit, compute_diff, full_resync};
use livetype_proto::EditOp;
use proptest::prelude::*;

/// Short strings over a small alphabet, so prefixes and suffixes collide often.
fn text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof![Just('a'), Just('b'), Just(' '), Just('é'), Just('🙂')], 0..12)
        .prop_map(|chars| chars.into_iter().collect())
}

/// Arbitrary (possibly out of range) edits.
fn edit_strategy() -> impl Strategy<Value = EditOp> {
    prop_oneof![
        (0usize..20, text_strategy()).prop_map(|(index, text)| EditOp::Add { index, text }),
        (0usize..20, 0usize..20).prop_map(|(index, count)| EditOp::Delete { index, count }),
        (0usize..20, text_strategy()).prop_map(|(index, text)| EditOp::Replace { index, text }),
        text_strategy().prop_map(|text| EditOp::FullReplace { text }),
    ]
}

/// One step of interactive typing applied to the sender's line.
#[derive(Debug, Clone)]
enum Keystroke {
    Type(char),
    Backspace,
    Paste(String),
    Clear,
}

fn keystroke_strategy() -> impl Strategy<Value = Keystroke> {
    prop_oneof![
        6 => prop::char::range('a', 'e').prop_map(Keystroke::Type),
        2 => Just(Keystroke::Backspace),
        1 => text_strategy().prop_map(Keystroke::Paste),
        1 => Just(Keystroke::Clear),
    ]
}

proptest! {
    /// Applying the computed diff reproduces the new text exactly.
    #[test]
    fn diff_round_trips(old in text_strategy(), new in text_strategy()) {
        match compute_diff(&old, &new) {
            None => prop_assert_eq!(&old, &new),
            Some(op) => prop_assert_eq!(apply_edit(&old, &op), new),
        }
    }

    /// A full replace yields its text from any starting state, and applying it
    /// twice changes nothing more.
    #[test]
    fn full_replace_is_idempotent(start in text_strategy(), text in text_strategy()) {
        let op = full_resync(&text);
        let once = apply_edit(&start, &op);
        prop_assert_eq!(&once, &text);
        prop_assert_eq!(apply_edit(&once, &op), text);
    }

    /// Applying any edit never panics, even with offsets past the end.
    #[test]
    fn apply_never_panics(start in text_strategy(), op in edit_strategy()) {
        let _ = apply_edit(&start, &op);
    }

    /// A receiver that starts with the sender's full resync and then applies
    /// each keystroke's diff in order tracks the sender exactly.
    #[test]
    fn receiver_tracks_sender(
        initial in text_strategy(),
        keys in prop::collection::vec(keystroke_strategy(), 0..40),
    ) {
        let mut store = BufferStore::new();
        let mut line = initial;
        store.apply("sender", "ann", &full_resync(&line));

        for key in keys {
            let before = line.clone();
            match key {
                Keystroke::Type(c) => line.push(c),
                Keystroke::Backspace => {
                    line.pop();
                },
                Keystroke::Paste(text) => line.push_str(&text),
                Keystroke::Clear => line.clear(),
            }

            if let Some(op) = compute_diff(&before, &line) {
                store.apply("sender", "ann", &op);
            }

            let text = store.get("sender").map(|b| b.text().to_string());
            prop_assert_eq!(text.as_deref(), Some(line.as_str()));
        }
    }

    /// Edits from one author never touch another author's buffer.
    #[test]
    fn authors_are_isolated(
        edits in prop::collection::vec((prop::bool::ANY, edit_strategy()), 1..30),
    ) {
        let mut store = BufferStore::new();
        let mut expected_a = String::new();
        let mut expected_b = String::new();

        for (is_a, op) in edits {
            if is_a {
                expected_a = apply_edit(&expected_a, &op);
                store.apply("a", "ann", &op);
            } else {
                expected_b = apply_edit(&expected_b, &op);
                store.apply("b", "bob", &op);
            }
        }

        if let Some(buffer) = store.get("a") {
            prop_assert_eq!(buffer.text(), expected_a.as_str());
        }
        if let Some(buffer) = store.get("b") {
            prop_assert_eq!(buffer.text(), expected_b.as_str());
        }
    }
}
