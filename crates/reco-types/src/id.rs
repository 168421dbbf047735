use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-local monotonic counter backing [`EntityId`] minting.
///
/// A single global counter (rather than one per `Store`) is deliberate: it
/// keeps ids globally non-colliding even if an embedder ever runs more than
/// one `Store` in the same process, and it means ids are never reused after
/// removal for the lifetime of the process — a stronger guarantee than the
/// spec requires but a cheap one to keep.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque, engine-generated unique identifier for a stored [`Entity`](crate::Entity).
///
/// Consumers must not parse or derive meaning from the wrapped integer; it is
/// exposed only for `Display`/equality/hashing. Stability rules live on
/// `Store::upsert`: the id assigned to a `key` never changes while that key
/// remains present, and is never reused after the key is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Mints a fresh id. Only `Store::upsert` should call this.
    pub fn fresh() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity-{}", self.0)
    }
}
