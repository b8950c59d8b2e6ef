//! Learned-threshold re-fitting (spec §4.5 "Threshold learning" and §6
//! `ThresholdsRepository`). `decision_version` only changes when the scoring
//! formulas themselves change — never on a threshold retune.

use crate::config::{minimums::THRESHOLD_LEARNING_BUCKET, DecisionConfig};

/// The formula version this module implements. Bump only alongside a change
/// to `scoring.rs`'s `raw_ev`/`ev_damped`/`pdv`/UDS formulas.
pub const DECISION_VERSION: &str = "UDS_v1";

/// One entry per `DECISION_VERSION` bump, oldest first. Outcome records
/// tagged with a version not in this list are neither learnable from nor
/// comparable to the current one ([`learn_ev_threshold`] already filters on
/// `DECISION_VERSION`; this is the human-readable trail for why a given
/// version exists).
pub const CHANGELOG: &[(&str, &str)] = &[("UDS_v1", "initial pdv/UDS formula: EV-damped value minus entropy and contradiction penalties")];

const TARGET_HIT_RATE: f64 = 0.38;

/// One historical, outcome-closed ticket used for threshold learning.
#[derive(Debug, Clone, Copy)]
pub struct TicketOutcomeRecord {
    pub uds: f64,
    pub decision_version: &'static str,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ThresholdLearningResult {
    Updated(DecisionConfig),
    /// No bucket met the target hit rate with enough samples; the caller
    /// keeps the prior config and surfaces this as a warning, not an error.
    Insufficient { reason: String },
}

/// Re-fit `ev_threshold` from outcome-closed tickets, bucketing by UDS
/// quantile and keeping `entropy_penalty`/`contradiction_penalty` untouched
/// (spec §4.5 only retunes `ev_threshold` here; the penalty weights are
/// tuned by the same holdout process described for strength hyperparameters
/// in §4.1, out of scope for this pass).
pub fn learn_ev_threshold(records: &[TicketOutcomeRecord], prior: &DecisionConfig) -> ThresholdLearningResult {
    let eligible: Vec<&TicketOutcomeRecord> = records.iter().filter(|r| r.decision_version == DECISION_VERSION).collect();
    if eligible.is_empty() {
        return ThresholdLearningResult::Insufficient {
            reason: "no outcome-closed tickets under the current decision_version".to_string(),
        };
    }

    let mut sorted = eligible;
    sorted.sort_by(|a, b| a.uds.partial_cmp(&b.uds).expect("uds is never NaN"));

    // Prefer the tightest (highest) threshold that already clears the target:
    // scan cutoffs from the top of the UDS range downward, accepting the
    // first bucket that both meets the minimum sample size and the hit-rate
    // target, loosening the cutoff only if the tightest buckets fall short.
    for i in (0..sorted.len()).rev() {
        let bucket = &sorted[i..];
        if bucket.len() < THRESHOLD_LEARNING_BUCKET {
            continue;
        }
        let hits = bucket.iter().filter(|r| r.correct).count() as f64;
        let hit_rate = hits / bucket.len() as f64;
        if hit_rate > TARGET_HIT_RATE {
            let mut updated = *prior;
            updated.ev_threshold = sorted[i].uds;
            return ThresholdLearningResult::Updated(updated);
        }
    }

    ThresholdLearningResult::Insufficient {
        reason: format!("no UDS bucket of >= {THRESHOLD_LEARNING_BUCKET} tickets cleared the {TARGET_HIT_RATE} hit-rate target"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(uds: f64, correct: bool) -> TicketOutcomeRecord {
        TicketOutcomeRecord { uds, decision_version: DECISION_VERSION, correct }
    }

    #[test]
    fn insufficient_when_no_bucket_reaches_minimum_size() {
        let records: Vec<_> = (0..10).map(|i| make(i as f64 * 0.1, true)).collect();
        let prior = DecisionConfig::default();
        assert!(matches!(learn_ev_threshold(&records, &prior), ThresholdLearningResult::Insufficient { .. }));
    }

    #[test]
    fn updates_threshold_when_high_uds_bucket_clears_target() {
        let mut records = Vec::new();
        for i in 0..100 {
            records.push(make(i as f64 * 0.01, false));
        }
        for i in 0..60 {
            records.push(make(1.0 + i as f64 * 0.01, true));
        }
        let prior = DecisionConfig::default();
        match learn_ev_threshold(&records, &prior) {
            ThresholdLearningResult::Updated(cfg) => assert!(cfg.ev_threshold >= 1.0),
            other => panic!("expected Updated, got {other:?}"),
        }
    }

    #[test]
    fn records_from_other_decision_versions_are_excluded() {
        let records = vec![TicketOutcomeRecord { uds: 5.0, decision_version: "UDS_v0", correct: true }];
        let prior = DecisionConfig::default();
        assert!(matches!(learn_ev_threshold(&records, &prior), ThresholdLearningResult::Insufficient { .. }));
    }
}
