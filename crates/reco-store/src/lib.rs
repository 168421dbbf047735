//! Key-indexed entity table (spec.md §4.2).
//!
//! Mirrors the two-map shape the spec names explicitly (`keyToId` /
//! `idToEntity`) rather than a single `HashMap<Key, Entity>`, because the
//! spec's identity invariants are phrased in terms of that pair staying
//! mutually consistent — keeping them as separate fields makes the
//! consistency check a one-line debug assertion instead of an inferred
//! property.

use reco_types::{Entity, EntityCandidate, EntityId, Key};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Internally-recoverable, named failure modes for [`Store`] operations
/// (SPEC_FULL.md §7). Never returned as a hard `Result::Err` from `upsert`/
/// `reconcile` — a single bad candidate shouldn't fail an entire batch — but
/// collected on the diff so the caller can surface one `diagnostic` event
/// per rejection instead of the invariant silently eroding in a release
/// build.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("candidate for key '{key}' has confidence {confidence} outside [0,1]; dropped")]
    InvalidConfidence { key: Key, confidence: f64 },
}

/// Diff produced by [`Store::upsert`] and, transitively, [`Store::reconcile`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UpsertDiff {
    pub added: Vec<EntityId>,
    pub updated: Vec<EntityId>,
    pub rejected: Vec<StoreError>,
}

/// Diff produced by [`Store::reconcile`]: the union of an upsert diff with
/// the keys removed because they were absent from the new candidate set.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReconcileDiff {
    pub added: Vec<EntityId>,
    pub updated: Vec<EntityId>,
    pub removed: Vec<(EntityId, Key)>,
    pub rejected: Vec<StoreError>,
}

/// Key-indexed entity table. All mutation happens on whatever single
/// logical thread of execution owns the `Store` (spec.md §3); this type
/// does no internal locking and is `!Sync`-in-spirit by convention, not by
/// the type system, matching the teacher's `EditorState` (also mutated only
/// from one place, the dispatcher).
#[derive(Debug, Default)]
pub struct Store {
    key_to_id: HashMap<Key, EntityId>,
    id_to_entity: HashMap<EntityId, Entity>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks the two-map mutual-consistency invariant (spec.md §3). Only
    /// exercised from tests and debug assertions — an O(n) walk on every
    /// call would be wasteful in the hot path.
    #[cfg(any(test, debug_assertions))]
    fn check_invariants(&self) {
        debug_assert_eq!(self.key_to_id.len(), self.id_to_entity.len());
        for (key, id) in &self.key_to_id {
            let entity = self
                .id_to_entity
                .get(id)
                .expect("every id in key_to_id must exist in id_to_entity");
            debug_assert_eq!(&entity.key, key);
        }
    }

    /// Upserts a batch of candidates (spec.md §4.2). For each candidate,
    /// mints a fresh id on first sight of its key, or preserves the
    /// existing id while replacing every other field. A candidate only
    /// lands in `updated` when [`Entity::observably_differs`] says so.
    pub fn upsert(&mut self, candidates: Vec<EntityCandidate>) -> UpsertDiff {
        let mut diff = UpsertDiff::default();
        for candidate in candidates {
            if !candidate.confidence_in_range() {
                let err = StoreError::InvalidConfidence {
                    key: candidate.key.clone(),
                    confidence: candidate.confidence,
                };
                tracing::warn!(target: "store", error = %err, "candidate_rejected");
                diff.rejected.push(err);
                continue;
            }
            match self.key_to_id.get(&candidate.key).copied() {
                None => {
                    let id = EntityId::fresh();
                    self.key_to_id.insert(candidate.key.clone(), id);
                    let entity = Entity::from_candidate(id, candidate);
                    self.id_to_entity.insert(id, entity);
                    diff.added.push(id);
                }
                Some(id) => {
                    let existing = self
                        .id_to_entity
                        .get(&id)
                        .expect("key_to_id/id_to_entity desynced");
                    let updated = existing.updated_from(candidate);
                    if existing.observably_differs(&updated) {
                        diff.updated.push(id);
                    }
                    self.id_to_entity.insert(id, updated);
                }
            }
        }
        #[cfg(any(test, debug_assertions))]
        self.check_invariants();
        tracing::trace!(
            target: "store",
            added = diff.added.len(),
            updated = diff.updated.len(),
            "store_upsert"
        );
        diff
    }

    /// Removes every entity whose key is in `keys`, silently ignoring
    /// absent ones (spec.md §4.2).
    pub fn remove_by_keys(&mut self, keys: &[Key]) -> Vec<(EntityId, Key)> {
        let mut removed = Vec::new();
        for key in keys {
            if let Some(id) = self.key_to_id.remove(key) {
                self.id_to_entity.remove(&id);
                removed.push((id, key.clone()));
            }
        }
        #[cfg(any(test, debug_assertions))]
        self.check_invariants();
        removed
    }

    /// Computes `K` = the set of keys present in `candidates`, removes every
    /// currently-stored key not in `K`, then upserts `candidates`
    /// (spec.md §4.2). This is the sole removal pathway the engine uses;
    /// `PluginResult.remove` is intentionally ignored (spec.md §9 Open
    /// Questions).
    pub fn reconcile(&mut self, candidates: Vec<EntityCandidate>) -> ReconcileDiff {
        let keep: HashSet<&Key> = candidates.iter().map(|c| &c.key).collect();
        let stale: Vec<Key> = self
            .key_to_id
            .keys()
            .filter(|k| !keep.contains(k))
            .cloned()
            .collect();
        let removed = self.remove_by_keys(&stale);
        let UpsertDiff { added, updated, rejected } = self.upsert(candidates);
        tracing::debug!(
            target: "store.reconcile",
            added = added.len(),
            updated = updated.len(),
            removed = removed.len(),
            rejected = rejected.len(),
            "store_reconcile"
        );
        ReconcileDiff {
            added,
            updated,
            removed,
            rejected,
        }
    }

    /// Promotes every `Provisional` entity to `Confirmed`, returning the
    /// list of promoted entities with their new status already applied
    /// (spec.md §4.2).
    pub fn confirm_all(&mut self) -> Vec<Entity> {
        use reco_types::EntityStatus;
        let mut promoted = Vec::new();
        for entity in self.id_to_entity.values_mut() {
            if entity.status == EntityStatus::Provisional {
                entity.status = EntityStatus::Confirmed;
                promoted.push(entity.clone());
            }
        }
        if !promoted.is_empty() {
            tracing::trace!(target: "store", promoted = promoted.len(), "store_confirm_all");
        }
        promoted
    }

    pub fn clear(&mut self) {
        self.key_to_id.clear();
        self.id_to_entity.clear();
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.id_to_entity.get(&id)
    }

    pub fn get_by_key(&self, key: &str) -> Option<&Entity> {
        self.key_to_id.get(key).and_then(|id| self.id_to_entity.get(id))
    }

    pub fn get_all(&self) -> Vec<Entity> {
        self.id_to_entity.values().cloned().collect()
    }

    pub fn size(&self) -> usize {
        self.id_to_entity.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reco_types::{EntityKind, EntityStatus, Span};
    use serde_json::Value;

    fn candidate(key: &str, start: usize, end: usize, confidence: f64) -> EntityCandidate {
        EntityCandidate {
            key: key.to_string(),
            kind: EntityKind::Quantity,
            span: Span::new(start, end),
            text: "10 km".to_string(),
            value: Value::Null,
            confidence,
            status: EntityStatus::Provisional,
        }
    }

    #[test]
    fn upsert_adds_new_keys_and_preserves_id_on_update() {
        let mut store = Store::new();
        let diff = store.upsert(vec![candidate("k1", 0, 5, 0.8)]);
        assert_eq!(diff.added.len(), 1);
        assert!(diff.updated.is_empty());
        let id = diff.added[0];

        let diff2 = store.upsert(vec![candidate("k1", 0, 5, 0.95)]);
        assert!(diff2.added.is_empty());
        assert_eq!(diff2.updated, vec![id]);
        assert_eq!(store.get(id).unwrap().confidence, 0.95);
    }

    #[test]
    fn upsert_is_silent_when_nothing_observable_changed() {
        let mut store = Store::new();
        store.upsert(vec![candidate("k1", 0, 5, 0.8)]);
        let diff = store.upsert(vec![candidate("k1", 0, 5, 0.8)]);
        assert!(diff.added.is_empty());
        assert!(diff.updated.is_empty());
    }

    #[test]
    fn reconcile_removes_keys_absent_from_new_candidate_set() {
        let mut store = Store::new();
        store.upsert(vec![candidate("k1", 0, 5, 0.8), candidate("k2", 6, 9, 0.8)]);
        let diff = store.reconcile(vec![candidate("k1", 0, 5, 0.8)]);
        assert!(diff.added.is_empty());
        assert!(diff.updated.is_empty());
        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.removed[0].1, "k2");
        assert_eq!(store.size(), 1);
    }

    #[test]
    fn reconcile_twice_with_same_candidates_is_idempotent() {
        let mut store = Store::new();
        let candidates = vec![candidate("k1", 0, 5, 0.8)];
        store.reconcile(candidates.clone());
        let diff = store.reconcile(candidates);
        assert!(diff.added.is_empty());
        assert!(diff.updated.is_empty());
        assert!(diff.removed.is_empty());
    }

    #[test]
    fn key_removed_then_reinserted_gets_a_fresh_id() {
        let mut store = Store::new();
        let diff = store.upsert(vec![candidate("k1", 0, 5, 0.8)]);
        let first_id = diff.added[0];
        store.remove_by_keys(&["k1".to_string()]);
        let diff2 = store.upsert(vec![candidate("k1", 0, 5, 0.8)]);
        let second_id = diff2.added[0];
        assert_ne!(first_id, second_id);
    }

    #[test]
    fn confirm_all_promotes_only_provisional_entities() {
        let mut store = Store::new();
        let mut confirmed_candidate = candidate("k2", 0, 3, 0.9);
        confirmed_candidate.status = EntityStatus::Confirmed;
        store.upsert(vec![candidate("k1", 0, 5, 0.8), confirmed_candidate]);

        let promoted = store.confirm_all();
        assert_eq!(promoted.len(), 1);
        assert_eq!(promoted[0].key, "k1");
        assert_eq!(store.get_by_key("k1").unwrap().status, EntityStatus::Confirmed);

        // idempotent: running again promotes nothing further.
        assert!(store.confirm_all().is_empty());
    }

    #[test]
    fn remove_by_keys_ignores_absent_keys() {
        let mut store = Store::new();
        store.upsert(vec![candidate("k1", 0, 5, 0.8)]);
        let removed = store.remove_by_keys(&["does-not-exist".to_string()]);
        assert!(removed.is_empty());
        assert_eq!(store.size(), 1);
    }

    #[test]
    fn clear_empties_both_maps() {
        let mut store = Store::new();
        store.upsert(vec![candidate("k1", 0, 5, 0.8), candidate("k2", 6, 9, 0.8)]);
        store.clear();
        assert_eq!(store.size(), 0);
        assert!(store.get_all().is_empty());
    }
}
