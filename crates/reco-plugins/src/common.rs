use reco_types::{EntityCandidate, EntityKind, EntityStatus, Span};
use regex::Match;
use serde_json::Value;

/// Converts a byte offset from a `regex` match (which operates on UTF-8
/// byte indices) into the char offset every `Span` in this workspace uses.
/// `regex` only ever returns offsets that land on char boundaries, so this
/// never panics on the inputs plugins see.
pub fn byte_to_char_offset(text: &str, byte_offset: usize) -> usize {
    text[..byte_offset].chars().count()
}

/// Builds the [`Span`] covering a regex match in char offsets.
pub fn span_of(text: &str, m: &Match) -> Span {
    Span::new(byte_to_char_offset(text, m.start()), byte_to_char_offset(text, m.end()))
}

/// Common candidate shape every built-in plugin produces: `kind:text:span`
/// keys so repeated runs over the same text at the same position reconcile
/// onto the same stored entity (spec.md §3).
pub fn candidate(
    kind: EntityKind,
    span: Span,
    text: &str,
    value: Value,
    confidence: f64,
    status: EntityStatus,
) -> EntityCandidate {
    let key = format!("{:?}:{}:{}:{}", kind, text, span.start, span.end);
    EntityCandidate { key, kind, span, text: text.to_string(), value, confidence, status }
}
