use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    pub fn from_goals(home_goals: u16, away_goals: u16) -> Self {
        match home_goals.cmp(&away_goals) {
            std::cmp::Ordering::Greater => Outcome::Home,
            std::cmp::Ordering::Equal => Outcome::Draw,
            std::cmp::Ordering::Less => Outcome::Away,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Home => "H",
            Outcome::Draw => "D",
            Outcome::Away => "A",
        }
    }
}

/// Closing 1x2 odds, each constrained to `[1.01, 100]` (spec §3).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ClosingOdds {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl ClosingOdds {
    pub const MIN_ODD: f64 = 1.01;
    pub const MAX_ODD: f64 = 100.0;

    pub fn is_valid(&self) -> bool {
        [self.home, self.draw, self.away]
            .iter()
            .all(|o| o.is_finite() && *o >= Self::MIN_ODD && *o <= Self::MAX_ODD)
    }
}

/// An immutable historical match record (spec §3). `result` is derived from
/// `(home_goals, away_goals)` and must never disagree with it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoricalMatch {
    pub league_code: String,
    pub date: chrono::NaiveDate,
    pub home_team_id: u64,
    pub away_team_id: u64,
    pub home_goals: u16,
    pub away_goals: u16,
    pub result: Outcome,
    pub odds: Option<ClosingOdds>,
}

impl HistoricalMatch {
    pub fn new(
        league_code: impl Into<String>,
        date: chrono::NaiveDate,
        home_team_id: u64,
        away_team_id: u64,
        home_goals: u16,
        away_goals: u16,
        odds: Option<ClosingOdds>,
    ) -> Self {
        Self {
            league_code: league_code.into(),
            date,
            home_team_id,
            away_team_id,
            home_goals,
            away_goals,
            result: Outcome::from_goals(home_goals, away_goals),
            odds,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.result == Outcome::from_goals(self.home_goals, self.away_goals)
    }
}
