use crate::{Entity, EntityId, Key, Span};
use serde::{Deserialize, Serialize};

/// Severity of a [`DiagnosticEvent`] (spec.md §7 severity policy): `Info` for
/// lifecycle notices, `Warning` for recoverable anomalies, `Error` for pass
/// or handler faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// `entity` channel payload: an entity was added or updated in the store.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityEvent {
    pub entity: Entity,
    pub is_update: bool,
}

/// `remove` channel payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveEvent {
    pub id: EntityId,
    pub key: Key,
}

/// `diagnostic` channel payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticEvent {
    pub severity: Severity,
    pub message: String,
    pub span: Option<Span>,
    pub source: Option<String>,
}

impl DiagnosticEvent {
    pub fn info(message: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
            span: None,
            source: Some(source.into()),
        }
    }

    pub fn warning(message: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            span: None,
            source: Some(source.into()),
        }
    }

    pub fn error(message: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            span: None,
            source: Some(source.into()),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

/// The three subscription channels exposed by `reco-emitter`. A `HashMap<Channel, _>`
/// keyed registry reads more plainly than string-keyed `on("entity", ...)`
/// while remaining exactly the "per-channel subscription" shape spec.md §9
/// recommends over one polymorphic stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Entity,
    Remove,
    Diagnostic,
}
