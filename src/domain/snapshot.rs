use serde::{Deserialize, Serialize};

use super::probability::ProbabilityTriple;

/// The immutable tuple of model-native beliefs about one fixture at decision
/// time (spec §3). Written once per ticket evaluation; used for post-hoc
/// threshold re-learning so past decisions can be replayed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionSnapshot {
    pub fixture_index: usize,
    pub model_version_id: String,
    pub triple: ProbabilityTriple,
    /// `true` if the team(s) involved carried a shrinkage flag at fit time
    /// (spec §4.1 "flag propagated downstream").
    pub shrinkage_flag: bool,
}

impl PredictionSnapshot {
    pub fn new(fixture_index: usize, model_version_id: impl Into<String>, triple: ProbabilityTriple, shrinkage_flag: bool) -> Self {
        Self {
            fixture_index,
            model_version_id: model_version_id.into(),
            triple,
            shrinkage_flag,
        }
    }
}
