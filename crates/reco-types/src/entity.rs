use crate::{EntityId, Span};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable, plugin-controlled deduplication string. Two candidates sharing a
/// key represent the same logical entity instance across passes (spec.md
/// §3: `quantity:10:km:8:13`-shaped strings are typical but the engine
/// treats the key as an opaque string).
pub type Key = String;

/// Closed enumeration of entity kinds, extensible only via [`EntityKind::Custom`]
/// (spec.md §3). `Custom` carries the plugin-chosen tag so a third-party
/// plugin can introduce new kinds without a core recompile, while the five
/// built-in kinds stay cheap to match on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Quantity,
    Datetime,
    Email,
    Phone,
    Url,
    Person,
    Place,
    Custom(String),
}

/// Whether an entity came from the fast realtime pass (and may still be
/// replaced or removed) or from a commit pass (stable until removed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    Provisional,
    Confirmed,
}

/// The mode a pass runs in, mirrored on `PluginContext` and used by the
/// Runner to select realtime-only vs realtime+commit plugin sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Realtime,
    Commit,
}

/// A plugin-produced entity record before the store assigns it an id
/// (spec.md §3 `EntityCandidate`).
#[derive(Debug, Clone, PartialEq)]
pub struct EntityCandidate {
    pub key: Key,
    pub kind: EntityKind,
    pub span: Span,
    pub text: String,
    pub value: Value,
    pub confidence: f64,
    pub status: EntityStatus,
}

impl EntityCandidate {
    /// Asserts the confidence invariant (`confidence in [0,1]`) the spec
    /// states as a data-model constraint. Plugins are expected to call this
    /// (or construct candidates already satisfying it); the Runner does not
    /// re-validate on every candidate in the hot path, only in debug builds
    /// via `debug_assert`.
    pub fn confidence_in_range(&self) -> bool {
        (0.0..=1.0).contains(&self.confidence)
    }
}

/// A stored candidate augmented with an engine-minted [`EntityId`]
/// (spec.md §3 `Entity`). Never mutated in place outside reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub key: Key,
    pub kind: EntityKind,
    pub span: Span,
    pub text: String,
    pub value: Value,
    pub confidence: f64,
    pub status: EntityStatus,
}

impl Entity {
    /// Constructs a freshly-stored entity from a candidate and a minted id.
    pub fn from_candidate(id: EntityId, candidate: EntityCandidate) -> Self {
        Self {
            id,
            key: candidate.key,
            kind: candidate.kind,
            span: candidate.span,
            text: candidate.text,
            value: candidate.value,
            confidence: candidate.confidence,
            status: candidate.status,
        }
    }

    /// Builds the next-version entity for an existing id, preserving
    /// identity while adopting every other field from `candidate`. Used by
    /// `Store::upsert` so the "no spurious updates when all observable
    /// fields are equal" contract (spec.md §9) is simply `old.observably_eq(&updated)`.
    pub fn updated_from(&self, candidate: EntityCandidate) -> Self {
        Self {
            id: self.id,
            key: candidate.key,
            kind: candidate.kind,
            span: candidate.span,
            text: candidate.text,
            value: candidate.value,
            confidence: candidate.confidence,
            status: candidate.status,
        }
    }

    /// Whether any field the spec names as update-triggering
    /// (`span.start`, `span.end`, `confidence`, `status`, deep-equal
    /// `value`) differs between `self` and `other`. Both entities are
    /// assumed to share the same `key`/`id`.
    pub fn observably_differs(&self, other: &Entity) -> bool {
        self.span != other.span
            || self.confidence != other.confidence
            || self.status != other.status
            || self.value != other.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntityId;

    fn candidate(span: Span, confidence: f64) -> EntityCandidate {
        EntityCandidate {
            key: "k".into(),
            kind: EntityKind::Quantity,
            span,
            text: "10 km".into(),
            value: Value::Null,
            confidence,
            status: EntityStatus::Provisional,
        }
    }

    #[test]
    fn updated_from_preserves_id() {
        let id = EntityId::fresh();
        let original = Entity::from_candidate(id, candidate(Span::new(0, 5), 0.8));
        let updated = original.updated_from(candidate(Span::new(0, 6), 0.95));
        assert_eq!(updated.id, id);
        assert_eq!(updated.span, Span::new(0, 6));
    }

    #[test]
    fn observably_differs_ignores_text_and_kind_churn() {
        let id = EntityId::fresh();
        let a = Entity::from_candidate(id, candidate(Span::new(0, 5), 0.8));
        let mut b = a.clone();
        b.text = "different raw text".into();
        assert!(!a.observably_differs(&b));
        b.confidence = 0.9;
        assert!(a.observably_differs(&b));
    }
}
