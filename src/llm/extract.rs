//! Reply extraction from heterogeneous provider payloads.
//!
//! Providers do not agree on a response schema, so the reply text is located
//! by running an ordered list of pure strategies over the decoded JSON. The
//! first strategy yielding non-empty trimmed text wins. If none does, the
//! whole payload is serialized and returned as a degraded reply.
//!
//! Every strategy tolerates missing, mistyped and empty fields by returning
//! `None`; malformed shapes never panic.

use serde_json::Value;

/// One candidate rule for locating the reply text.
pub type Strategy = fn(&Value) -> Option<String>;

/// Strategies in priority order.
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("output_text", output_text),
    ("text", top_level_text),
    ("output[0].content|text", first_output_plain),
    ("output[0].content[]", first_output_fragments),
];

/// Outcome of extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    /// A strategy found text.
    Text(String),
    /// No strategy matched; the serialized payload.
    Raw(String),
}

impl Extracted {
    pub fn into_text(self) -> String {
        match self {
            Extracted::Text(s) | Extracted::Raw(s) => s,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Extracted::Raw(_))
    }
}

/// Run the strategy list over `payload`.
pub fn extract(payload: &Value) -> Extracted {
    for (name, strategy) in STRATEGIES {
        if let Some(text) = strategy(payload) {
            tracing::trace!(strategy = *name, "reply text extracted");
            return Extracted::Text(text);
        }
    }
    Extracted::Raw(serialize_raw(payload))
}

fn serialize_raw(payload: &Value) -> String {
    // `Value`'s Display is compact JSON and cannot fail.
    payload.to_string()
}

/// Trimmed, non-empty string or `None`.
fn non_empty(value: Option<&Value>) -> Option<String> {
    let trimmed = value?.as_str()?.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn first_output(payload: &Value) -> Option<&Value> {
    payload.get("output")?.as_array()?.first()
}

fn output_text(payload: &Value) -> Option<String> {
    non_empty(payload.get("output_text"))
}

fn top_level_text(payload: &Value) -> Option<String> {
    non_empty(payload.get("text"))
}

fn first_output_plain(payload: &Value) -> Option<String> {
    let first = first_output(payload)?;
    non_empty(first.get("content")).or_else(|| non_empty(first.get("text")))
}

fn first_output_fragments(payload: &Value) -> Option<String> {
    let fragments = first_output(payload)?.get("content")?.as_array()?;
    let joined: String = fragments.iter().filter_map(fragment_text).collect();
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Text of a single content fragment: `{ "text": "..." }` or a bare string.
fn fragment_text(fragment: &Value) -> Option<&str> {
    match fragment {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map.get("text").and_then(Value::as_str),
        _ => None,
    }
}
