//! Ticket archetypes (spec §4.5): enforced before evaluation so the
//! generator doesn't churn through tickets the gate will reject anyway.

use crate::domain::{Archetype, ClosingOdds, Outcome, ProbabilityTriple};

/// Everything the archetype conformance check needs about one pick, beyond
/// what [`crate::domain::TicketPick`] carries once scored.
#[derive(Debug, Clone, Copy)]
pub struct PickEvaluation {
    pub pick: Outcome,
    pub model_prob: f64,
    pub market_prob: Option<f64>,
    pub market_odds_draw: Option<f64>,
    pub market_odds_away: Option<f64>,
    pub dc_applied: bool,
}

fn draw_count(picks: &[PickEvaluation]) -> usize {
    picks.iter().filter(|p| p.pick == Outcome::Draw).count()
}

fn away_count(picks: &[PickEvaluation]) -> usize {
    picks.iter().filter(|p| p.pick == Outcome::Away).count()
}

/// Check whether `picks` satisfies `archetype`'s constraints (spec §4.5
/// table). Returns the list of violated constraints; empty means conformant.
pub fn violations(archetype: Archetype, picks: &[PickEvaluation]) -> Vec<String> {
    let mut out = Vec::new();
    let draws = draw_count(picks);
    let aways = away_count(picks);

    match archetype {
        Archetype::FavoriteLock => {
            if draws > 1 {
                out.push(format!("FAVORITE_LOCK allows <= 1 draw, got {draws}"));
            }
            if aways > 1 {
                out.push(format!("FAVORITE_LOCK allows <= 1 away, got {aways}"));
            }
            for p in picks {
                if p.pick == Outcome::Draw {
                    if let Some(o) = p.market_odds_draw {
                        if o > 3.4 {
                            out.push("FAVORITE_LOCK forbids a draw pick with odds > 3.4".to_string());
                        }
                    }
                }
                if p.pick == Outcome::Away {
                    if let Some(o) = p.market_odds_away {
                        if o > 3.2 {
                            out.push("FAVORITE_LOCK forbids an away pick with odds > 3.2".to_string());
                        }
                    }
                }
            }
        }
        Archetype::Balanced => {
            if draws > 2 {
                out.push(format!("BALANCED allows <= 2 draws, got {draws}"));
            }
            if aways > 2 {
                out.push(format!("BALANCED allows <= 2 aways, got {aways}"));
            }
        }
        Archetype::DrawSelective => {
            if !(2..=3).contains(&draws) {
                out.push(format!("DRAW_SELECTIVE requires 2..=3 draws, got {draws}"));
            }
            for p in picks {
                if p.pick == Outcome::Draw && !p.dc_applied {
                    out.push("DRAW_SELECTIVE requires dc_applied on every draw pick".to_string());
                }
            }
        }
        Archetype::AwayEdge => {
            if !(2..=3).contains(&aways) {
                out.push(format!("AWAY_EDGE requires 2..=3 aways, got {aways}"));
            }
            for p in picks {
                if p.pick == Outcome::Away {
                    let edge_ok = match p.market_prob {
                        Some(market_prob) => p.model_prob > market_prob + 0.07,
                        None => false,
                    };
                    if !edge_ok {
                        out.push("AWAY_EDGE requires model_prob > market_prob + 0.07 on every away pick".to_string());
                    }
                }
            }
        }
    }

    out
}

/// Aggregate slate-level signal used to pick an archetype before generation
/// (spec §4.5 "Selection is driven by slate profile").
#[derive(Debug, Clone, Copy)]
pub struct SlateProfile {
    pub avg_home_prob: f64,
    pub balanced_rate: f64,
    pub away_value_rate: f64,
}

pub fn compute_profile(triples: &[ProbabilityTriple], market_triples: &[Option<ProbabilityTriple>]) -> SlateProfile {
    let n = triples.len().max(1) as f64;
    let avg_home_prob = triples.iter().map(|t| t.p_home).sum::<f64>() / n;
    let balanced_rate = triples.iter().filter(|t| t.probs().iter().cloned().fold(0.0, f64::max) < 0.5).count() as f64 / n;
    let away_value_rate = triples
        .iter()
        .zip(market_triples.iter())
        .filter(|(t, m)| match m {
            Some(m) => t.p_away >= m.p_away + 0.07,
            None => false,
        })
        .count() as f64
        / n;

    SlateProfile { avg_home_prob, balanced_rate, away_value_rate }
}

/// Map a slate profile to the archetype whose constraints it most easily
/// satisfies (spec §4.5).
pub fn select_archetype(profile: &SlateProfile) -> Archetype {
    if profile.away_value_rate >= 0.2 {
        Archetype::AwayEdge
    } else if profile.balanced_rate >= 0.5 {
        Archetype::DrawSelective
    } else if profile.avg_home_prob >= 0.55 {
        Archetype::FavoriteLock
    } else {
        Archetype::Balanced
    }
}

/// Convenience: whether given `Outcome` odds-field of `ClosingOdds` is
/// beyond the favorite-lock thresholds, used by the generator when
/// constructing candidate picks archetype-first.
pub fn exceeds_favorite_lock_bound(pick: Outcome, odds: &ClosingOdds) -> bool {
    match pick {
        Outcome::Draw => odds.draw > 3.4,
        Outcome::Away => odds.away > 3.2,
        Outcome::Home => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(pick: Outcome, model_prob: f64, market_prob: Option<f64>, dc_applied: bool) -> PickEvaluation {
        PickEvaluation {
            pick,
            model_prob,
            market_prob,
            market_odds_draw: None,
            market_odds_away: None,
            dc_applied,
        }
    }

    #[test]
    fn favorite_lock_rejects_two_draws() {
        let picks = vec![
            eval(Outcome::Draw, 0.3, None, true),
            eval(Outcome::Draw, 0.3, None, true),
            eval(Outcome::Home, 0.6, None, true),
        ];
        assert!(!violations(Archetype::FavoriteLock, &picks).is_empty());
    }

    #[test]
    fn draw_selective_requires_dc_applied() {
        let picks = vec![eval(Outcome::Draw, 0.3, None, false), eval(Outcome::Draw, 0.3, None, true)];
        let v = violations(Archetype::DrawSelective, &picks);
        assert!(v.iter().any(|s| s.contains("dc_applied")));
    }

    #[test]
    fn away_edge_requires_model_edge_over_market() {
        let picks = vec![eval(Outcome::Away, 0.3, Some(0.29), false), eval(Outcome::Away, 0.35, Some(0.2), false)];
        let v = violations(Archetype::AwayEdge, &picks);
        assert!(!v.is_empty());
    }
}
