use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::team::Team;

/// One anchor point of a fitted isotonic curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CalibrationPoint {
    pub x: f64,
    pub y: f64,
}

/// A monotone per-outcome calibration curve as a sequence of anchor points,
/// suitable for persistence (spec §6 "Persisted state shape").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalibrationCurve {
    pub points: Vec<CalibrationPoint>,
    /// `true` when the fit fell back to identity for lack of samples.
    pub is_identity: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ModelStatus {
    Active,
    Archived,
    Failed,
}

/// Which variant of blend set B was used to produce this version (spec §9
/// open question — this crate always picks `EntropyWeighted`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BlendPolicy {
    FixedSixtyForty,
    EntropyWeighted,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationMetrics {
    pub brier_score: f64,
    pub log_loss: f64,
    pub draw_accuracy: f64,
}

/// Immutable bundle produced by one training run (spec §3). Lifecycle:
/// created once by [`crate::strength::fit`], never mutated; superseded
/// versions become [`ModelStatus::Archived`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelVersion {
    pub id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub teams: HashMap<u64, Team>,
    /// Global home advantage.
    pub gamma: f64,
    /// Dixon-Coles low-score dependency parameter, in `[-0.2, 0]`.
    pub rho: f64,
    /// Exponential time-decay rate per day used in the weighted MLE.
    pub xi: f64,
    pub training_from: chrono::NaiveDate,
    pub training_to: chrono::NaiveDate,
    pub calibration: HashMap<String, CalibrationCurve>,
    pub blend_policy: BlendPolicy,
    /// Per-outcome Kelly-weighted blend fallback threshold used by set F.
    pub kelly_blend_fallback: f64,
    pub validation: ValidationMetrics,
    pub status: ModelStatus,
    pub calibration_quality_warning: bool,
}

impl ModelVersion {
    pub fn team(&self, id: u64) -> Option<&Team> {
        self.teams.get(&id)
    }
}
