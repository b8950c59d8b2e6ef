use serde::{Deserialize, Serialize};

use super::match_record::ClosingOdds;

/// A future match, resolved to team ids by the host's [`crate::ports::TeamResolver`]
/// before it reaches the core (spec §3: "failure to resolve is a hard error —
/// the core does not guess").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fixture {
    pub home_team_id: u64,
    pub away_team_id: u64,
    pub league_code: String,
    pub match_date: chrono::NaiveDate,
    pub odds: Option<ClosingOdds>,
    /// Per-fixture override for DC gating (spec §4.2); defaults to `true`.
    pub lineup_stable: bool,
}

impl Fixture {
    pub fn new(
        home_team_id: u64,
        away_team_id: u64,
        league_code: impl Into<String>,
        match_date: chrono::NaiveDate,
    ) -> Self {
        Self {
            home_team_id,
            away_team_id,
            league_code: league_code.into(),
            match_date,
            odds: None,
            lineup_stable: true,
        }
    }

    pub fn with_odds(mut self, odds: ClosingOdds) -> Self {
        self.odds = Some(odds);
        self
    }
}
