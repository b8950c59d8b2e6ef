//! Hard contradiction rules (spec §4.5): any true flag forces rejection
//! regardless of the Unified Decision Score.

use crate::domain::{ClosingOdds, Outcome, ProbabilityTriple};

/// Evaluate the three hard-contradiction rules for one pick. `market` is the
/// margin-free market triple (`None` when odds were missing).
pub fn hard_contradiction_flags(pick: Outcome, triple: &ProbabilityTriple, market: Option<&ProbabilityTriple>, odds: Option<&ClosingOdds>) -> Vec<String> {
    let mut flags = Vec::new();

    if pick == Outcome::Draw {
        if let Some(market) = market {
            if market.p_home > 0.55 {
                flags.push("draw_pick_vs_high_market_home_prob".to_string());
            }
        }
        if (triple.xg_home - triple.xg_away).abs() > 0.45 {
            flags.push("draw_pick_vs_wide_xg_gap".to_string());
        }
    }

    if pick == Outcome::Away {
        if let (Some(odds), Some(market)) = (odds, market) {
            if odds.away > 3.2 && market.p_home > 0.50 {
                flags.push("away_pick_vs_long_odds_and_high_market_home_prob".to_string());
            }
        }
    }

    flags
}
