//! Lenient identifier decoding.
//!
//! The server hands out room and connection ids as strings, but older rooms
//! were created with numeric ids. Both are accepted and normalized to
//! strings so ids compare equal regardless of how they were encoded.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

/// Deserialize a string-or-number id.
pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

/// Deserialize an optional string-or-number id.
pub(crate) fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawId>::deserialize(deserializer).map(|raw| raw.map(String::from))
}

/// Decode a bare id value (event payloads like `room created` and `user left`).
pub(crate) fn from_value(value: Value) -> Result<String, serde_json::Error> {
    RawId::deserialize(value).map(String::from)
}
