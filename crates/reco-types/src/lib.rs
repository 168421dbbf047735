//! Shared data model for the streaming semantic recognizer.
//!
//! This crate carries no behavior, only the types every other `reco-*`
//! crate builds against: spans, the entity/candidate record shapes, and the
//! three event payload structs. Keeping it dependency-light (`serde` only)
//! means `reco-plugins` authors pull in exactly this and nothing else.

mod entity;
mod event;
mod id;
mod span;
mod window;

pub use entity::{EntityCandidate, EntityKind, EntityStatus, Key, Mode};
pub use event::{Channel, DiagnosticEvent, EntityEvent, RemoveEvent, Severity};
pub use id::EntityId;
pub use span::Span;
pub use window::Window;

pub use entity::Entity;
