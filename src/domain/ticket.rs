use serde::{Deserialize, Serialize};

use super::match_record::Outcome;

/// The four enumerated ticket classes (spec §4.5).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Archetype {
    FavoriteLock,
    Balanced,
    DrawSelective,
    AwayEdge,
}

impl Archetype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::FavoriteLock => "FAVORITE_LOCK",
            Archetype::Balanced => "BALANCED",
            Archetype::DrawSelective => "DRAW_SELECTIVE",
            Archetype::AwayEdge => "AWAY_EDGE",
        }
    }
}

/// Per-pick decision trace (spec §6 "Persisted state shape").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketPick {
    pub fixture_index: usize,
    pub pick: Outcome,
    pub market_odds: Option<f64>,
    pub model_prob: f64,
    /// Per-decision-value, after the EV damping + xG-confidence weighting
    /// and structural-penalty subtraction (spec §4.5).
    pub pdv: f64,
    pub soft_penalty: f64,
    pub hard_contradiction_flags: Vec<String>,
}

impl TicketPick {
    pub fn has_hard_contradiction(&self) -> bool {
        !self.hard_contradiction_flags.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    pub id: String,
    pub slate_id: String,
    pub archetype: Archetype,
    pub decision_version: String,
    pub picks: Vec<TicketPick>,
    pub uds: f64,
    pub accepted: bool,
    pub rejection_reasons: Vec<String>,
    pub ev_threshold_used: f64,
}

/// Shared by [`Ticket::num_soft_contradictions`] and the evaluator, which
/// needs the same count before a `Ticket` exists to hold it.
pub fn count_soft_contradictions(picks: &[TicketPick], soft_penalty_epsilon: f64) -> usize {
    picks.iter().filter(|p| p.soft_penalty > soft_penalty_epsilon).count()
}

impl Ticket {
    pub fn num_soft_contradictions(&self, soft_penalty_epsilon: f64) -> usize {
        count_soft_contradictions(&self.picks, soft_penalty_epsilon)
    }

    pub fn mean_entropy(&self, entropies: &[f64]) -> f64 {
        if entropies.is_empty() {
            0.0
        } else {
            entropies.iter().sum::<f64>() / entropies.len() as f64
        }
    }

    pub fn draw_count(&self) -> usize {
        self.picks.iter().filter(|p| p.pick == Outcome::Draw).count()
    }

    pub fn away_count(&self) -> usize {
        self.picks.iter().filter(|p| p.pick == Outcome::Away).count()
    }
}
