//! Ticket Generator and Portfolio Optimizer (spec §4.6): enumerate
//! archetype-constrained pick combinations, evaluate each, and greedily
//! select a diversified bundle.

use rayon::prelude::*;

use crate::config::DecisionConfig;
use crate::decision::archetypes::{self, PickEvaluation};
use crate::decision::{self, CandidatePick, FixtureContext};
use crate::domain::{Archetype, Outcome, Ticket};

/// Upper bound on enumerated candidates per slate, to keep runtime bounded
/// for large `N` (spec §4.6 "cap at a candidate budget").
const CANDIDATE_BUDGET: usize = 4096;

/// `λ_corr` in the portfolio score, `≈ UDS_scale * 0.5` (spec §4.6). Ticket
/// UDS values here are O(1) per pick, so `UDS_scale = 1.0` is the natural
/// reference scale.
const CORRELATION_PENALTY: f64 = 0.5;

/// Relative odds-move threshold that flags a fixture as a "late shock".
const LATE_SHOCK_RELATIVE_CHANGE: f64 = 0.15;
const LATE_SHOCK_DEWEIGHT: f64 = 0.9;

fn pick_evaluation(pick: Outcome, ctx: &FixtureContext) -> PickEvaluation {
    let triple = &ctx.snapshot.triple;
    let model_prob = decision::scoring::model_prob_for_pick(triple, pick);
    let market_prob = ctx.market.map(|m| decision::scoring::model_prob_for_pick(m, pick));
    PickEvaluation {
        pick,
        model_prob,
        market_prob,
        market_odds_draw: ctx.odds.map(|o| o.draw),
        market_odds_away: ctx.odds.map(|o| o.away),
        dc_applied: triple.dc_applied,
    }
}

/// Enumerate every `3^N` pick combination depth-first, pruning any partial
/// combination that already violates the archetype, and stop once
/// [`CANDIDATE_BUDGET`] full combinations have been collected.
fn enumerate_candidates(archetype: Archetype, contexts: &[FixtureContext]) -> Vec<Vec<Outcome>> {
    let n = contexts.len();
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(n);

    fn recurse(depth: usize, n: usize, archetype: Archetype, contexts: &[FixtureContext], current: &mut Vec<Outcome>, out: &mut Vec<Vec<Outcome>>) {
        if out.len() >= CANDIDATE_BUDGET {
            return;
        }
        if depth == n {
            out.push(current.clone());
            return;
        }
        for pick in [Outcome::Home, Outcome::Draw, Outcome::Away] {
            if out.len() >= CANDIDATE_BUDGET {
                return;
            }
            current.push(pick);
            // Prune on per-pick rules only (odds bounds, dc_applied, market
            // edge): count-based constraints (draw/away totals) can't be
            // judged until the combination is complete.
            let per_pick_ok = current.iter().enumerate().all(|(i, &p)| match archetype {
                Archetype::FavoriteLock => contexts[i].odds.map(|o| !archetypes::exceeds_favorite_lock_bound(p, o)).unwrap_or(true),
                Archetype::DrawSelective => p != Outcome::Draw || pick_evaluation(p, &contexts[i]).dc_applied,
                Archetype::AwayEdge => {
                    p != Outcome::Away || {
                        let e = pick_evaluation(p, &contexts[i]);
                        e.market_prob.map(|m| e.model_prob > m + 0.07).unwrap_or(false)
                    }
                }
                Archetype::Balanced => true,
            });
            if per_pick_ok {
                recurse(depth + 1, n, archetype, contexts, current, out);
            }
            current.pop();
        }
    }

    recurse(0, n, archetype, contexts, &mut current, &mut out);
    out
}

/// Generate and evaluate candidate tickets for one slate, keeping only
/// accepted ones (spec §4.6 "Generation"). Each candidate is scored
/// independently of every other, so the evaluation fans out across
/// `rayon`'s global pool (spec §5 "unordered parallel work across
/// independent... candidate tickets").
pub fn generate_tickets(slate_id: &str, archetype: Archetype, contexts: &[FixtureContext], config: &DecisionConfig) -> Vec<Ticket> {
    let combinations = enumerate_candidates(archetype, contexts);
    combinations
        .into_par_iter()
        .enumerate()
        .filter_map(|(idx, picks)| {
            let candidate_picks: Vec<CandidatePick> = picks
                .into_iter()
                .enumerate()
                .map(|(fixture_index, pick)| CandidatePick { fixture_index, pick })
                .collect();
            let evaluations: Vec<PickEvaluation> = candidate_picks.iter().map(|c| pick_evaluation(c.pick, &contexts[c.fixture_index])).collect();
            if !archetypes::violations(archetype, &evaluations).is_empty() {
                return None;
            }
            let id = format!("{slate_id}-{archetype:?}-{idx}");
            let ticket = decision::evaluate_ticket(id, slate_id.to_string(), archetype, &candidate_picks, contexts, config);
            ticket.accepted.then_some(ticket)
        })
        .collect()
}

/// Fraction of fixtures where two tickets make the same pick.
fn pairwise_correlation(a: &Ticket, b: &Ticket) -> f64 {
    let n = a.picks.len().max(b.picks.len()).max(1);
    let overlap = a
        .picks
        .iter()
        .filter(|pa| b.picks.iter().any(|pb| pb.fixture_index == pa.fixture_index && pb.pick == pa.pick))
        .count();
    overlap as f64 / n as f64
}

fn mean_pairwise_correlation(tickets: &[&Ticket]) -> f64 {
    if tickets.len() < 2 {
        return 0.0;
    }
    let mut total = 0.0;
    let mut pairs = 0;
    for i in 0..tickets.len() {
        for j in (i + 1)..tickets.len() {
            total += pairwise_correlation(tickets[i], tickets[j]);
            pairs += 1;
        }
    }
    if pairs == 0 {
        0.0
    } else {
        total / pairs as f64
    }
}

/// `Score(S) = Σ UDS(t) - λ_corr * mean_pairwise_corr(S)`, with late-shock
/// de-weighting folded into each ticket's contribution (spec §4.6).
fn score_bundle(tickets: &[&Ticket], shocked_fixtures: &std::collections::HashSet<usize>) -> f64 {
    let sum_uds: f64 = tickets
        .iter()
        .map(|t| {
            let touches_shock = t.picks.iter().any(|p| shocked_fixtures.contains(&p.fixture_index));
            if touches_shock {
                t.uds * LATE_SHOCK_DEWEIGHT
            } else {
                t.uds
            }
        })
        .sum();
    sum_uds - CORRELATION_PENALTY * mean_pairwise_correlation(tickets)
}

/// Detect fixtures whose odds moved by more than 15% relative to the
/// snapshot the model trained on (spec §4.6 "Late-shock detection").
pub fn detect_late_shocks(trained_odds: &[(usize, f64)], current_odds: &[(usize, f64)]) -> std::collections::HashSet<usize> {
    let mut shocked = std::collections::HashSet::new();
    for &(fixture_index, trained) in trained_odds {
        if let Some(&(_, current)) = current_odds.iter().find(|(i, _)| *i == fixture_index) {
            if trained > 0.0 {
                let relative_change = (current - trained).abs() / trained;
                if relative_change >= LATE_SHOCK_RELATIVE_CHANGE {
                    shocked.insert(fixture_index);
                }
            }
        }
    }
    shocked
}

/// Greedily build the final bundle: start from the highest-UDS accepted
/// ticket, then repeatedly add whichever remaining ticket maximizes the
/// marginal `Score(S)`, stopping at `bundle_size` or when no ticket
/// contributes positively (spec §4.6 "Portfolio scoring").
pub fn select_bundle<'a>(accepted: &'a [Ticket], bundle_size: usize, shocked_fixtures: &std::collections::HashSet<usize>) -> Vec<&'a Ticket> {
    if accepted.is_empty() {
        return Vec::new();
    }
    let mut remaining: Vec<&Ticket> = accepted.iter().collect();
    remaining.sort_by(|a, b| b.uds.partial_cmp(&a.uds).expect("uds is never NaN"));

    let mut selected: Vec<&Ticket> = Vec::new();
    selected.push(remaining.remove(0));

    while selected.len() < bundle_size && !remaining.is_empty() {
        let base_score = score_bundle(&selected, shocked_fixtures);
        let mut best_idx = None;
        let mut best_marginal = 0.0;
        for (idx, candidate) in remaining.iter().enumerate() {
            let mut trial = selected.clone();
            trial.push(candidate);
            let marginal = score_bundle(&trial, shocked_fixtures) - base_score;
            if best_idx.is_none() || marginal > best_marginal {
                best_idx = Some(idx);
                best_marginal = marginal;
            }
        }
        match best_idx {
            Some(idx) if best_marginal > 0.0 => selected.push(remaining.remove(idx)),
            _ => break,
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClosingOdds, PredictionSnapshot, ProbabilityTriple};

    fn ctx(p_home: f64, p_draw: f64, p_away: f64) -> (PredictionSnapshot, Option<ClosingOdds>) {
        (
            PredictionSnapshot::new(0, "v1", ProbabilityTriple::new(p_home, p_draw, p_away, 1.5, 1.0, true), false),
            Some(ClosingOdds { home: 1.8, draw: 3.6, away: 4.0 }),
        )
    }

    #[test]
    fn single_fixture_ticket_is_valid_archetype_target() {
        let (snap, odds) = ctx(0.6, 0.2, 0.2);
        let market = ProbabilityTriple::new(0.55, 0.25, 0.20, f64::NAN, f64::NAN, false);
        let contexts = vec![FixtureContext { snapshot: &snap, odds: odds.as_ref(), market: Some(&market) }];
        let config = DecisionConfig { ev_threshold: -10.0, ..DecisionConfig::default() };
        let tickets = generate_tickets("slate1", Archetype::FavoriteLock, &contexts, &config);
        assert!(!tickets.is_empty());
    }

    #[test]
    fn bundle_selection_stops_at_requested_size() {
        let (snap, odds) = ctx(0.6, 0.2, 0.2);
        let market = ProbabilityTriple::new(0.55, 0.25, 0.20, f64::NAN, f64::NAN, false);
        let contexts = vec![FixtureContext { snapshot: &snap, odds: odds.as_ref(), market: Some(&market) }];
        let config = DecisionConfig { ev_threshold: -10.0, ..DecisionConfig::default() };
        let tickets = generate_tickets("slate1", Archetype::FavoriteLock, &contexts, &config);
        let shocked = std::collections::HashSet::new();
        let bundle = select_bundle(&tickets, 1, &shocked);
        assert!(bundle.len() <= 1);
    }
}
