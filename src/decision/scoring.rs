//! Per-pick decision value (spec §4.5): EV-damped expected value, weighted
//! by xG-confidence and reduced by structural penalties.

use crate::domain::{ClosingOdds, Outcome, ProbabilityTriple};

pub fn model_prob_for_pick(triple: &ProbabilityTriple, pick: Outcome) -> f64 {
    match pick {
        Outcome::Home => triple.p_home,
        Outcome::Draw => triple.p_draw,
        Outcome::Away => triple.p_away,
    }
}

fn odds_for_pick(odds: &ClosingOdds, pick: Outcome) -> f64 {
    match pick {
        Outcome::Home => odds.home,
        Outcome::Draw => odds.draw,
        Outcome::Away => odds.away,
    }
}

/// `model_prob · (odds - 1) - (1 - model_prob)`.
pub fn raw_ev(model_prob: f64, market_odds: f64) -> f64 {
    model_prob * (market_odds - 1.0) - (1.0 - model_prob)
}

/// `raw_ev / (1 + odds)`, damping so one long-shot can't dominate a ticket.
pub fn ev_damped(raw_ev: f64, market_odds: f64) -> f64 {
    raw_ev / (1.0 + market_odds)
}

/// Additive structural penalties (spec §4.5). Each rule is independent; all
/// that apply are summed.
pub fn structural_penalty(pick: Outcome, triple: &ProbabilityTriple, odds: Option<&ClosingOdds>) -> f64 {
    let mut penalty = 0.0;
    if pick == Outcome::Draw {
        if let Some(odds) = odds {
            if odds.draw > 3.4 {
                penalty += 0.15;
            }
        }
        if (triple.xg_home - triple.xg_away).abs() > 0.45 {
            penalty += 0.20;
        }
    }
    if pick == Outcome::Away {
        if let Some(odds) = odds {
            if odds.away > 3.2 {
                penalty += 0.10;
            }
        }
    }
    penalty
}

/// `ev_damped(pick) * xg_confidence(fixture) - penalty(pick)`.
pub fn pdv(ev_damped: f64, xg_confidence: f64, penalty: f64) -> f64 {
    ev_damped * xg_confidence - penalty
}

/// Compute `(model_prob, pdv, soft_penalty)` for one pick on one fixture.
/// Returns `(model_prob, pdv, penalty, raw_ev_value)`; the caller attaches
/// hard-contradiction flags separately (spec §4.5 keeps them as a distinct
/// boolean gate rather than part of the additive score).
pub fn score_pick(pick: Outcome, triple: &ProbabilityTriple, odds: Option<&ClosingOdds>) -> (f64, f64, f64) {
    let model_prob = model_prob_for_pick(triple, pick);
    let penalty = structural_penalty(pick, triple, odds);

    let damped = match odds {
        Some(odds) => {
            let market_odds = odds_for_pick(odds, pick);
            let raw = raw_ev(model_prob, market_odds);
            ev_damped(raw, market_odds)
        }
        None => 0.0,
    };

    let value = pdv(damped, triple.xg_confidence, penalty);
    (model_prob, value, penalty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_ev_positive_when_model_beats_market() {
        // model thinks 60%, market implies ~48% (odds 2.10).
        let ev = raw_ev(0.60, 2.10);
        assert!(ev > 0.0);
    }

    #[test]
    fn draw_penalty_accumulates_both_rules() {
        let triple = ProbabilityTriple::new(0.3, 0.3, 0.4, 2.0, 1.0, false);
        let odds = ClosingOdds { home: 2.0, draw: 3.6, away: 2.5 };
        let penalty = structural_penalty(Outcome::Draw, &triple, Some(&odds));
        assert!((penalty - 0.35).abs() < 1e-9);
    }
}
