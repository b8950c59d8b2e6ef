//! The Outcome Integrator (spec §4.2): converts expected goal rates into a
//! full `ProbabilityTriple` via truncated Dixon-Coles score-matrix summation.

use crate::config::minimums::SCORE_MATRIX_MAX_GOALS;
use crate::domain::{ModelVersion, ProbabilityTriple, Team};
use crate::error::{CoreError, CoreResult};
use crate::strength::poisson::dc_joint_pmf;

/// `λ_h + λ_a` below this threshold is "low-scoring enough" for the
/// Dixon-Coles correction to be empirically justified.
const DC_GATING_TOTAL_GOALS: f64 = 2.4;

fn expected_goals(home: &Team, away: &Team, gamma: f64) -> (f64, f64) {
    let lambda_h = (home.attack - away.defense + gamma).exp();
    let lambda_a = (away.attack - home.defense).exp();
    (lambda_h, lambda_a)
}

/// Sum the truncated `(K+1)x(K+1)` score matrix into `(p_H, p_D, p_A)`.
fn score_matrix_sum(lambda_h: f64, lambda_a: f64, rho: f64) -> (f64, f64, f64) {
    let k = SCORE_MATRIX_MAX_GOALS as u32;
    let mut p_home = 0.0;
    let mut p_draw = 0.0;
    let mut p_away = 0.0;
    for x in 0..=k {
        for y in 0..=k {
            let cell = dc_joint_pmf(x, y, lambda_h, lambda_a, rho);
            match x.cmp(&y) {
                std::cmp::Ordering::Greater => p_home += cell,
                std::cmp::Ordering::Equal => p_draw += cell,
                std::cmp::Ordering::Less => p_away += cell,
            }
        }
    }
    (p_home, p_draw, p_away)
}

/// `predict(home, away, version) -> ProbabilityTriple`. `lineup_stable`
/// defaults to `true` at the call site that has no lineup information.
pub fn predict(home: &Team, away: &Team, version: &ModelVersion, lineup_stable: bool) -> CoreResult<ProbabilityTriple> {
    let (lambda_h, lambda_a) = expected_goals(home, away, version.gamma);
    if !lambda_h.is_finite() || !lambda_a.is_finite() || lambda_h <= 0.0 || lambda_a <= 0.0 {
        return Err(CoreError::BlendError {
            reason: format!("non-finite or non-positive expected goals: lambda_h={lambda_h} lambda_a={lambda_a}"),
        });
    }

    let dc_applied = (lambda_h + lambda_a) < DC_GATING_TOTAL_GOALS && lineup_stable;
    let rho = if dc_applied { version.rho } else { 0.0 };

    let (p_home, p_draw, p_away) = score_matrix_sum(lambda_h, lambda_a, rho);
    let total = p_home + p_draw + p_away;
    if !total.is_finite() || total <= 0.0 {
        return Err(CoreError::BlendError {
            reason: format!("score matrix mass is non-positive: total={total}"),
        });
    }

    let triple = ProbabilityTriple::new(p_home / total, p_draw / total, p_away / total, lambda_h, lambda_a, dc_applied);
    if !triple.validate() {
        return Err(CoreError::BlendError {
            reason: format!("probability triple failed sum invariant: sum={}", triple.sum()),
        });
    }
    Ok(triple)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn team(attack: f64, defense: f64) -> Team {
        Team {
            id: 0,
            league_id: "TEST".into(),
            attack,
            defense,
            home_bias: 0.0,
            last_fit_at: Utc::now(),
            shrinkage_flag: false,
        }
    }

    fn version(gamma: f64, rho: f64) -> ModelVersion {
        ModelVersion {
            id: "test".into(),
            created_at: Utc::now(),
            teams: std::collections::HashMap::new(),
            gamma,
            rho,
            xi: 0.0065,
            training_from: chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            training_to: chrono::NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            calibration: std::collections::HashMap::new(),
            blend_policy: crate::domain::BlendPolicy::EntropyWeighted,
            kelly_blend_fallback: 0.0,
            validation: crate::domain::model_version::ValidationMetrics {
                brier_score: f64::NAN,
                log_loss: f64::NAN,
                draw_accuracy: f64::NAN,
            },
            status: crate::domain::ModelStatus::Active,
            calibration_quality_warning: false,
        }
    }

    /// lambda_h=1.5, lambda_a=1.2, rho=0: independent-Poisson outcome split,
    /// cross-checked against an unrounded bivariate sum.
    #[test]
    fn poisson_sanity_scenario() {
        let home = team(1.5_f64.ln(), 0.0);
        let away = team(1.2_f64.ln(), 0.0);
        let v = version(0.0, 0.0);
        let triple = predict(&home, &away, &v, true).unwrap();
        assert!((triple.p_home - 0.4415).abs() < 0.001, "p_home={}", triple.p_home);
        assert!((triple.p_draw - 0.2548).abs() < 0.001, "p_draw={}", triple.p_draw);
        assert!((triple.p_away - 0.3037).abs() < 0.001, "p_away={}", triple.p_away);
        assert!((triple.entropy - 1.5455).abs() < 0.01, "entropy={}", triple.entropy);
    }

    #[test]
    fn dc_gating_disables_rho_for_high_scoring_fixtures() {
        let home = team(2.0_f64.ln(), 0.0);
        let away = team(1.5_f64.ln(), 0.0);
        let v = version(0.0, -0.15);
        let triple = predict(&home, &away, &v, true).unwrap();
        assert!(!triple.dc_applied);
    }

    #[test]
    fn unstable_lineup_disables_dc_applied() {
        let home = team(0.0, 0.0);
        let away = team(0.0, 0.0);
        let v = version(0.0, -0.1);
        let triple = predict(&home, &away, &v, false).unwrap();
        assert!(!triple.dc_applied);
    }

    #[test]
    fn triple_sums_to_one_within_tolerance() {
        let home = team(0.3, -0.1);
        let away = team(-0.2, 0.2);
        let v = version(0.3, -0.1);
        let triple = predict(&home, &away, &v, true).unwrap();
        assert!(triple.validate());
    }
}
