//! The Decision Intelligence Ticket Evaluator (spec §4.5): per-pick value,
//! hard contradictions, Unified Decision Score, and the acceptance gate.

pub mod archetypes;
pub mod contradictions;
pub mod scoring;
pub mod thresholds;

use crate::config::DecisionConfig;
use crate::domain::{count_soft_contradictions, Archetype, ClosingOdds, Outcome, PredictionSnapshot, ProbabilityTriple, Ticket, TicketPick};

const SOFT_CONTRADICTION_EPSILON: f64 = 1e-9;

/// One pick under evaluation, before scoring.
#[derive(Debug, Clone, Copy)]
pub struct CandidatePick {
    pub fixture_index: usize,
    pub pick: Outcome,
}

/// Per-fixture context the evaluator needs: the model snapshot, the raw
/// closing odds (if known), and the margin-free market triple derived from
/// them (`None` propagates through to set-A fallback behavior).
pub struct FixtureContext<'a> {
    pub snapshot: &'a PredictionSnapshot,
    pub odds: Option<&'a ClosingOdds>,
    pub market: Option<&'a ProbabilityTriple>,
}

fn odds_for_pick(odds: &ClosingOdds, pick: Outcome) -> f64 {
    match pick {
        Outcome::Home => odds.home,
        Outcome::Draw => odds.draw,
        Outcome::Away => odds.away,
    }
}

/// Score and flag every candidate pick, returning the fully-populated
/// `TicketPick` records (spec §4.5 "Per-pick decision value").
pub fn score_picks(picks: &[CandidatePick], contexts: &[FixtureContext]) -> Vec<TicketPick> {
    picks
        .iter()
        .map(|c| {
            let ctx = &contexts[c.fixture_index];
            let triple = &ctx.snapshot.triple;
            let (model_prob, pdv, soft_penalty) = scoring::score_pick(c.pick, triple, ctx.odds);
            let hard_contradiction_flags = contradictions::hard_contradiction_flags(c.pick, triple, ctx.market, ctx.odds);
            let market_odds = ctx.odds.map(|o| odds_for_pick(o, c.pick));
            TicketPick {
                fixture_index: c.fixture_index,
                pick: c.pick,
                market_odds,
                model_prob,
                pdv,
                soft_penalty,
                hard_contradiction_flags,
            }
        })
        .collect()
}

/// Unified Decision Score (spec §4.5).
pub fn unified_decision_score(picks: &[TicketPick], entropies: &[f64], config: &DecisionConfig) -> f64 {
    let mean_entropy = if entropies.is_empty() {
        0.0
    } else {
        entropies.iter().sum::<f64>() / entropies.len() as f64
    };
    let num_soft = count_soft_contradictions(picks, SOFT_CONTRADICTION_EPSILON);
    picks.iter().map(|p| p.pdv).sum::<f64>() - config.entropy_penalty * mean_entropy - config.contradiction_penalty * num_soft as f64
}

/// Evaluate one candidate ticket end to end: score every pick, compute UDS,
/// and apply the three-stage acceptance gate in order (spec §4.5 "Gating").
pub fn evaluate_ticket(id: String, slate_id: String, archetype: Archetype, picks: &[CandidatePick], contexts: &[FixtureContext], config: &DecisionConfig) -> Ticket {
    let ticket_picks = score_picks(picks, contexts);
    let entropies: Vec<f64> = picks.iter().map(|c| contexts[c.fixture_index].snapshot.triple.entropy).collect();
    let uds = unified_decision_score(&ticket_picks, &entropies, config);

    let mut rejection_reasons = Vec::new();

    let hard: Vec<&TicketPick> = ticket_picks.iter().filter(|p| p.has_hard_contradiction()).collect();
    if !hard.is_empty() {
        for p in &hard {
            for flag in &p.hard_contradiction_flags {
                rejection_reasons.push(format!("hard_contradiction[{}]: {}", p.fixture_index, flag));
            }
        }
    }

    let num_soft = count_soft_contradictions(&ticket_picks, SOFT_CONTRADICTION_EPSILON);
    if rejection_reasons.is_empty() && num_soft > config.max_contradictions {
        rejection_reasons.push(format!("soft contradictions {num_soft} exceed max {}", config.max_contradictions));
    }

    if rejection_reasons.is_empty() && uds < config.ev_threshold {
        rejection_reasons.push(format!("UDS {uds} below ev_threshold {}", config.ev_threshold));
    }

    let accepted = rejection_reasons.is_empty();

    Ticket {
        id,
        slate_id,
        archetype,
        decision_version: thresholds::DECISION_VERSION.to_string(),
        picks: ticket_picks,
        uds,
        accepted,
        rejection_reasons,
        ev_threshold_used: config.ev_threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProbabilityTriple;

    fn snapshot(p_home: f64, p_draw: f64, p_away: f64, xg_h: f64, xg_a: f64, dc: bool) -> PredictionSnapshot {
        PredictionSnapshot::new(0, "v1", ProbabilityTriple::new(p_home, p_draw, p_away, xg_h, xg_a, dc), false)
    }

    /// Scenario 5 from spec §8: hard contradiction forces rejection
    /// regardless of how favorable the rest of the ticket looks.
    #[test]
    fn hard_contradiction_forces_rejection() {
        let snap = snapshot(0.6, 0.2, 0.2, 1.8, 1.0, false);
        let market = ProbabilityTriple::new(0.6, 0.2, 0.2, f64::NAN, f64::NAN, false);
        let ctx = FixtureContext { snapshot: &snap, odds: None, market: Some(&market) };
        let picks = vec![CandidatePick { fixture_index: 0, pick: Outcome::Draw }];
        let config = DecisionConfig { ev_threshold: -100.0, ..Default::default() }; // would otherwise accept
        let ticket = evaluate_ticket("t1".into(), "slate1".into(), Archetype::Balanced, &picks, &[ctx], &config);
        assert!(!ticket.accepted);
        assert!(!ticket.rejection_reasons.is_empty());
    }

    #[test]
    fn clean_favorite_pick_accepts() {
        let snap = snapshot(0.6, 0.2, 0.2, 1.6, 1.0, true);
        let odds = ClosingOdds { home: 1.8, draw: 3.4, away: 4.0 };
        let market = ProbabilityTriple::new(0.55, 0.25, 0.20, f64::NAN, f64::NAN, false);
        let ctx = FixtureContext { snapshot: &snap, odds: Some(&odds), market: Some(&market) };
        let picks = vec![CandidatePick { fixture_index: 0, pick: Outcome::Home }];
        let config = DecisionConfig { ev_threshold: -10.0, ..Default::default() };
        let ticket = evaluate_ticket("t2".into(), "slate1".into(), Archetype::FavoriteLock, &picks, &[ctx], &config);
        assert!(ticket.accepted, "reasons: {:?}", ticket.rejection_reasons);
    }
}
