//! Market-implied probability extraction (spec §4.3): remove the bookmaker
//! margin from 1x2 odds to get a triple comparable to the model's.

use crate::domain::{ClosingOdds, ProbabilityTriple};

/// `q_X = 1/o_X`; `m_X = q_X / Σq`. Returns `None` if any odd is invalid
/// (the caller then falls back to the model triple per spec §4.3).
pub fn market_triple(odds: &ClosingOdds) -> Option<ProbabilityTriple> {
    if !odds.is_valid() {
        return None;
    }
    let q_home = 1.0 / odds.home;
    let q_draw = 1.0 / odds.draw;
    let q_away = 1.0 / odds.away;
    let total = q_home + q_draw + q_away;
    if !total.is_finite() || total <= 0.0 {
        return None;
    }
    let m_home = q_home / total;
    let m_draw = q_draw / total;
    let m_away = q_away / total;
    Some(ProbabilityTriple::new(m_home, m_draw, m_away, f64::NAN, f64::NAN, false))
}
