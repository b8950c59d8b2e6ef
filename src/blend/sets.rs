//! The Seven-Set Generator (spec §4.3): blend one model triple with an
//! optional market triple into the seven named perspectives A through G.

use crate::domain::{League, ProbabilityTriple};
use crate::error::{CoreError, CoreResult};

/// Fixed coefficient for set B (spec §4.3 table), used when the `ModelVersion`
/// selects `BlendPolicy::FixedSixtyForty`.
pub const B_FIXED_MODEL_WEIGHT: f64 = 0.6;
/// Coefficient for set C, market-dominant.
pub const C_MODEL_WEIGHT: f64 = 0.2;
/// Sharpening temperature for set E, `T = 1/1.5`.
const E_INVERSE_TEMPERATURE: f64 = 1.5;

fn linear_blend(p: &ProbabilityTriple, m: &ProbabilityTriple, model_weight: f64) -> CoreResult<ProbabilityTriple> {
    if !(0.0..=1.0).contains(&model_weight) {
        return Err(CoreError::BlendError {
            reason: format!("blend coefficient {model_weight} outside [0, 1]"),
        });
    }
    let market_weight = 1.0 - model_weight;
    let triple = ProbabilityTriple::new(
        model_weight * p.p_home + market_weight * m.p_home,
        model_weight * p.p_draw + market_weight * m.p_draw,
        model_weight * p.p_away + market_weight * m.p_away,
        p.xg_home,
        p.xg_away,
        p.dc_applied,
    )
    .renormalized();
    if !triple.validate() {
        return Err(CoreError::BlendError {
            reason: format!("blended triple failed sum invariant: sum={}", triple.sum()),
        });
    }
    Ok(triple)
}

/// Entropy-weighted coefficient for set B: `clip(1 - H(p)/log2(3), 0.3, 0.8)`.
/// `ModelVersion::blend_policy` records which variant a training run used.
pub fn entropy_weighted_model_weight(p: &ProbabilityTriple) -> f64 {
    let max_entropy = 3.0_f64.log2();
    (1.0 - p.entropy / max_entropy).clamp(0.3, 0.8)
}

fn set_b(p: &ProbabilityTriple, m: &ProbabilityTriple, entropy_weighted: bool) -> CoreResult<ProbabilityTriple> {
    let weight = if entropy_weighted {
        entropy_weighted_model_weight(p)
    } else {
        B_FIXED_MODEL_WEIGHT
    };
    linear_blend(p, m, weight)
}

fn set_c(p: &ProbabilityTriple, m: &ProbabilityTriple) -> CoreResult<ProbabilityTriple> {
    linear_blend(p, m, C_MODEL_WEIGHT)
}

fn set_d(b: &ProbabilityTriple, league: &League) -> CoreResult<ProbabilityTriple> {
    let boosted_draw = b.p_draw * (1.0 + league.draw_boost);
    let triple = ProbabilityTriple::new(b.p_home, boosted_draw, b.p_away, b.xg_home, b.xg_away, b.dc_applied).renormalized();
    if !triple.validate() {
        return Err(CoreError::BlendError {
            reason: "draw-boosted triple failed sum invariant".to_string(),
        });
    }
    Ok(triple)
}

fn set_e(b: &ProbabilityTriple) -> CoreResult<ProbabilityTriple> {
    let t = 1.0 / E_INVERSE_TEMPERATURE;
    let sharpen = |x: f64| x.max(0.0).powf(1.0 / t);
    let triple = ProbabilityTriple::new(
        sharpen(b.p_home),
        sharpen(b.p_draw),
        sharpen(b.p_away),
        b.xg_home,
        b.xg_away,
        b.dc_applied,
    )
    .renormalized();
    if !triple.validate() {
        return Err(CoreError::BlendError {
            reason: "entropy-sharpened triple failed sum invariant".to_string(),
        });
    }
    Ok(triple)
}

/// Per-outcome Kelly fraction against decimal odds `o`, clamped to `[0, 1]`
/// (teacher's `vault::kelly::calculate_kelly_position`, adapted for a
/// per-outcome rather than single-bankroll decision).
fn kelly_fraction(model_prob: f64, odds: f64) -> f64 {
    let b = odds - 1.0;
    if b <= 0.0 {
        return 0.0;
    }
    let q = 1.0 - model_prob;
    ((model_prob * b - q) / b).clamp(0.0, 1.0)
}

/// Per-outcome weight for set F: the fractional-Kelly stake against that
/// outcome's market odds, falling back to the set-B weight whenever Kelly
/// would assign no more than `kelly_blend_fallback` stake (the market
/// disagrees with the model enough that Kelly calls for zero exposure).
fn set_f(p: &ProbabilityTriple, m: &ProbabilityTriple, odds: Option<&crate::domain::ClosingOdds>, kelly_blend_fallback: f64) -> CoreResult<ProbabilityTriple> {
    let Some(odds) = odds else {
        return set_b(p, m, true);
    };
    let b_weight = entropy_weighted_model_weight(p);
    let weight_for = |model_prob: f64, outcome_odds: f64| {
        let k = kelly_fraction(model_prob, outcome_odds);
        if k <= kelly_blend_fallback {
            b_weight
        } else {
            k
        }
    };
    let k_home = weight_for(p.p_home, odds.home);
    let k_draw = weight_for(p.p_draw, odds.draw);
    let k_away = weight_for(p.p_away, odds.away);
    let triple = ProbabilityTriple::new(
        k_home * p.p_home + (1.0 - k_home) * m.p_home,
        k_draw * p.p_draw + (1.0 - k_draw) * m.p_draw,
        k_away * p.p_away + (1.0 - k_away) * m.p_away,
        p.xg_home,
        p.xg_away,
        p.dc_applied,
    )
    .renormalized();
    if !triple.validate() {
        return Err(CoreError::BlendError {
            reason: "Kelly-weighted triple failed sum invariant".to_string(),
        });
    }
    Ok(triple)
}

fn set_g(a: &ProbabilityTriple, b: &ProbabilityTriple, c: &ProbabilityTriple) -> CoreResult<ProbabilityTriple> {
    let triple = ProbabilityTriple::new(
        (a.p_home + b.p_home + c.p_home) / 3.0,
        (a.p_draw + b.p_draw + c.p_draw) / 3.0,
        (a.p_away + b.p_away + c.p_away) / 3.0,
        a.xg_home,
        a.xg_away,
        a.dc_applied,
    )
    .renormalized();
    if !triple.validate() {
        return Err(CoreError::BlendError {
            reason: "ensemble triple failed sum invariant".to_string(),
        });
    }
    Ok(triple)
}

/// All seven aligned triples, keyed by [`crate::domain::ProbabilitySetKind`].
pub struct BlendedSets {
    pub a: ProbabilityTriple,
    pub b: ProbabilityTriple,
    pub c: ProbabilityTriple,
    pub d: ProbabilityTriple,
    pub e: ProbabilityTriple,
    pub f: ProbabilityTriple,
    pub g: ProbabilityTriple,
}

impl BlendedSets {
    pub fn get(&self, kind: crate::domain::ProbabilitySetKind) -> &ProbabilityTriple {
        use crate::domain::ProbabilitySetKind::*;
        match kind {
            A => &self.a,
            B => &self.b,
            C => &self.c,
            D => &self.d,
            E => &self.e,
            F => &self.f,
            G => &self.g,
        }
    }
}

/// Build all seven sets from a model triple and optional market odds. When
/// odds are missing or invalid, market-based sets fall back to the model
/// triple (spec §4.3). `kelly_blend_fallback` is the model version's
/// recorded dead-zone for set F (spec §10.7).
pub fn build_sets(model: &ProbabilityTriple, odds: Option<&crate::domain::ClosingOdds>, league: &League, kelly_blend_fallback: f64) -> CoreResult<BlendedSets> {
    let market = odds.and_then(super::market::market_triple).unwrap_or(*model);

    let a = *model;
    let b = set_b(model, &market, true)?;
    let c = set_c(model, &market)?;
    let d = set_d(&b, league)?;
    let e = set_e(&b)?;
    let f = set_f(model, &market, odds, kelly_blend_fallback)?;
    let g = set_g(&a, &b, &c)?;

    Ok(BlendedSets { a, b, c, d, e, f, g })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_triple() -> ProbabilityTriple {
        ProbabilityTriple::new(0.478, 0.252, 0.270, 1.5, 1.2, false)
    }

    /// Scenario 4 from spec §8 family: set B/C formulas with odds (2.10, 3.40, 3.20).
    #[test]
    fn set_b_and_c_blend_with_market() {
        let league = League::new("TEST");
        let odds = crate::domain::ClosingOdds { home: 2.10, draw: 3.40, away: 3.20 };
        let sets = build_sets(&model_triple(), Some(&odds), &league, 0.0).unwrap();
        assert!(sets.b.validate());
        assert!(sets.c.validate());
        // market-dominant set C should sit closer to market than B does.
        let market = crate::blend::market::market_triple(&odds).unwrap();
        let model = model_triple();
        let b_gap = (sets.b.p_home - market.p_home).abs();
        let c_gap = (sets.c.p_home - market.p_home).abs();
        assert!(c_gap <= b_gap || (model.p_home - market.p_home).abs() < 1e-9);
    }

    #[test]
    fn missing_odds_falls_back_to_model_triple() {
        let league = League::new("TEST");
        let sets = build_sets(&model_triple(), None, &league, 0.0).unwrap();
        assert!((sets.c.p_home - model_triple().p_home).abs() < 1e-9);
    }

    #[test]
    fn draw_boost_increases_draw_share() {
        let league = League::new("TEST");
        let odds = crate::domain::ClosingOdds { home: 2.10, draw: 3.40, away: 3.20 };
        let sets = build_sets(&model_triple(), Some(&odds), &league, 0.0).unwrap();
        assert!(sets.d.p_draw >= sets.b.p_draw);
    }

    #[test]
    fn entropy_weight_clips_to_bounds() {
        let sharp = ProbabilityTriple::new(0.98, 0.01, 0.01, 1.0, 1.0, false);
        let flat = ProbabilityTriple::new(0.34, 0.33, 0.33, 1.0, 1.0, false);
        assert!(entropy_weighted_model_weight(&sharp) <= 0.8);
        assert!(entropy_weighted_model_weight(&flat) >= 0.3);
    }
}
