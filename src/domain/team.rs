use serde::{Deserialize, Serialize};

/// Log-scale attack/defense strength for one team at one point in time.
///
/// Invariant (spec §3): `|attack|, |defense| <= STRENGTH_BOUND` after every
/// fit, and the league mean of each is normalized to zero (identifiability).
pub const STRENGTH_BOUND: f64 = 3.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Team {
    pub id: u64,
    pub league_id: String,
    pub attack: f64,
    pub defense: f64,
    pub home_bias: f64,
    pub last_fit_at: chrono::DateTime<chrono::Utc>,
    /// Set when the team had fewer than the minimum appearances at fit time
    /// and was assigned a shrunk, league-mean-weighted strength (spec §4.1).
    pub shrinkage_flag: bool,
}

impl Team {
    pub fn new(id: u64, league_id: impl Into<String>) -> Self {
        Self {
            id,
            league_id: league_id.into(),
            attack: 0.0,
            defense: 0.0,
            home_bias: 0.0,
            last_fit_at: chrono::Utc::now(),
            shrinkage_flag: false,
        }
    }

    pub fn within_bounds(&self) -> bool {
        self.attack.abs() <= STRENGTH_BOUND && self.defense.abs() <= STRENGTH_BOUND
    }
}
