use reco_plugin::PluginResult;
use reco_types::{EntityCandidate, Key};
use std::collections::HashMap;

/// Result of merging a sequence of per-plugin [`PluginResult`]s
/// (spec.md §4.5 step 4): later results override earlier ones for the same
/// key, and any key explicitly removed by a later plugin drops out of the
/// upsert set even if an earlier plugin contributed it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MergedResult {
    pub upsert: Vec<EntityCandidate>,
    pub remove: Vec<Key>,
}

/// Walks `results` in order, keeping insertion order for the final
/// `upsert` list (order within the merged set is otherwise unspecified by
/// the spec — see spec.md §9 — but a stable, reproducible order makes
/// engine behavior deterministic to test against).
pub fn merge(results: Vec<PluginResult>) -> MergedResult {
    let mut order: Vec<Key> = Vec::new();
    let mut by_key: HashMap<Key, EntityCandidate> = HashMap::new();
    let mut remove_set: Vec<Key> = Vec::new();

    for result in results {
        for candidate in result.upsert {
            if !by_key.contains_key(&candidate.key) {
                order.push(candidate.key.clone());
            }
            by_key.insert(candidate.key.clone(), candidate);
        }
        for key in result.remove {
            if !remove_set.contains(&key) {
                remove_set.push(key.clone());
            }
            by_key.remove(&key);
        }
    }

    let upsert = order
        .into_iter()
        .filter_map(|key| by_key.remove(&key))
        .collect();

    MergedResult {
        upsert,
        remove: remove_set,
    }
}
