use reco_types::{EntityCandidate, Mode};

/// `{realtime, commit}` confidence thresholds (spec.md §4.5), defaulting to
/// `0.8`/`0.5`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub realtime: f64,
    pub commit: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { realtime: 0.8, commit: 0.5 }
    }
}

impl Thresholds {
    pub fn for_mode(&self, mode: Mode) -> f64 {
        match mode {
            Mode::Realtime => self.realtime,
            Mode::Commit => self.commit,
        }
    }
}

/// Filters merged upserts by `confidence >= threshold(mode)` (spec.md §4.5
/// step 5).
pub fn filter_by_confidence(candidates: Vec<EntityCandidate>, threshold: f64) -> Vec<EntityCandidate> {
    candidates
        .into_iter()
        .filter(|c| c.confidence >= threshold)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reco_types::{EntityKind, EntityStatus, Span};
    use serde_json::Value;

    fn candidate(confidence: f64) -> EntityCandidate {
        EntityCandidate {
            key: "k".into(),
            kind: EntityKind::Quantity,
            span: Span::new(0, 1),
            text: "x".into(),
            value: Value::Null,
            confidence,
            status: EntityStatus::Provisional,
        }
    }

    #[test]
    fn filters_below_threshold() {
        let filtered = filter_by_confidence(vec![candidate(0.3), candidate(0.9)], 0.5);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].confidence, 0.9);
    }

    #[test]
    fn threshold_is_inclusive() {
        let filtered = filter_by_confidence(vec![candidate(0.5)], 0.5);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn defaults_match_spec() {
        let thresholds = Thresholds::default();
        assert_eq!(thresholds.realtime, 0.8);
        assert_eq!(thresholds.commit, 0.5);
    }
}
