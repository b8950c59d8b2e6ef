//! Explicit, frozen configuration (spec §6 "Environment", §9 "Global mutable
//! state → explicit configuration"). Nothing downstream of [`Hyperparameters`]
//! or [`DecisionConfig`] reads an environment variable directly — the host
//! parses env/CLI input once at startup and hands these structs to the core.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Hyperparameters {
    /// Exponential time-decay rate per day, `ξ ∈ [0.003, 0.010]` by default
    /// grid, `0` disables decay entirely.
    pub xi: f64,
    /// Dixon-Coles low-score dependency parameter, `ρ ∈ [-0.2, 0]`.
    pub rho: f64,
    /// Global home-advantage prior, `γ ∈ [0.1, 0.6]`.
    pub home_advantage_prior: f64,
    /// L2 ridge penalty coefficient applied to `||α||^2 + ||β||^2`.
    pub l2_penalty: f64,
    /// Max optimizer iterations before declaring `FitDivergence`.
    pub max_iterations: usize,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            xi: 0.0065,
            rho: -0.1,
            home_advantage_prior: 0.3,
            l2_penalty: 1e-4,
            max_iterations: 200,
        }
    }
}

impl Hyperparameters {
    pub const RHO_BOUNDS: (f64, f64) = (-0.2, 0.0);
    pub const GAMMA_BOUNDS: (f64, f64) = (0.1, 0.6);
    pub const XI_BOUNDS: (f64, f64) = (0.0, 0.010);

    pub fn clamp_rho(rho: f64) -> f64 {
        rho.clamp(Self::RHO_BOUNDS.0, Self::RHO_BOUNDS.1)
    }

    pub fn clamp_gamma(gamma: f64) -> f64 {
        gamma.clamp(Self::GAMMA_BOUNDS.0, Self::GAMMA_BOUNDS.1)
    }
}

/// Decision-layer learned scalars (spec §6 "ThresholdsRepository").
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DecisionConfig {
    pub ev_threshold: f64,
    pub max_contradictions: usize,
    pub entropy_penalty: f64,
    pub contradiction_penalty: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            ev_threshold: 0.0,
            max_contradictions: 1,
            entropy_penalty: 0.05,
            contradiction_penalty: 0.1,
        }
    }
}

/// Minimum sample thresholds named throughout spec §4.
pub mod minimums {
    pub const LEAGUE_MATCHES: usize = 200;
    pub const TEAM_APPEARANCES: usize = 10;
    pub const CALIBRATION_SAMPLES: usize = 200;
    pub const THRESHOLD_LEARNING_BUCKET: usize = 50;
    pub const SCORE_MATRIX_MAX_GOALS: usize = 8;
}
