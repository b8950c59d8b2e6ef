use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct League {
    pub code: String,
    pub avg_draw_rate: f64,
    /// Global log-scale home advantage `γ`, fitted per §4.1, bounded to
    /// `[0.1, 0.6]`.
    pub home_advantage: f64,
    /// Reliability weight the decision layer uses to de-weight leagues with
    /// thin history.
    pub reliability_weight: f64,
    /// Multiplicative boost applied to `p_D` in blend set D (spec §4.3,
    /// "≈ 0.15" by convention).
    pub draw_boost: f64,
}

impl League {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            avg_draw_rate: 0.25,
            home_advantage: 0.3,
            reliability_weight: 1.0,
            draw_boost: 0.15,
        }
    }
}
