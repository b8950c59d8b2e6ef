//! End-to-end coverage across the Strength/Integrator/Blender/Calibrator/
//! Decision pipeline, assembled the way the orchestrator composes them.

use std::collections::HashMap;

use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use football_predict_core::cache::PredictionCache;
use football_predict_core::calibrate::isotonic::{self, CalibrationSample};
use football_predict_core::decision::archetypes::{self, SlateProfile};
use football_predict_core::domain::{Archetype, ClosingOdds, League, ModelStatus, ModelVersion, Team};
use football_predict_core::orchestrator::{self, FixtureRequest, PredictOptions};
use football_predict_core::ports::TeamResolver;
use football_predict_core::strength::poisson::dc_joint_pmf;

struct FixedResolver {
    ids: HashMap<String, u64>,
}

impl TeamResolver for FixedResolver {
    fn resolve(&self, name: &str, _league: &str) -> Option<u64> {
        self.ids.get(name).copied()
    }
}

fn team(id: u64, attack: f64, defense: f64) -> Team {
    Team {
        id,
        league_id: "TEST".into(),
        attack,
        defense,
        home_bias: 0.0,
        last_fit_at: chrono::Utc::now(),
        shrinkage_flag: false,
    }
}

fn version(teams: Vec<Team>, gamma: f64, rho: f64) -> ModelVersion {
    ModelVersion {
        id: "TEST-1".into(),
        created_at: chrono::Utc::now(),
        teams: teams.into_iter().map(|t| (t.id, t)).collect(),
        gamma,
        rho,
        xi: 0.0065,
        training_from: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        training_to: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        calibration: HashMap::new(),
        blend_policy: football_predict_core::domain::BlendPolicy::EntropyWeighted,
        kelly_blend_fallback: 0.0,
        validation: football_predict_core::domain::model_version::ValidationMetrics { brier_score: 0.2, log_loss: 0.5, draw_accuracy: 0.25 },
        status: ModelStatus::Active,
        calibration_quality_warning: false,
    }
}

/// Two `predict_slate` calls against the same cache, version, and fixtures
/// produce bit-identical output (spec §8 "Idempotence of `predict_slate`").
#[test]
fn predict_slate_is_idempotent() {
    let home = team(1, 0.3, -0.1);
    let away = team(2, -0.1, 0.2);
    let v = version(vec![home, away], 0.3, -0.1);
    let league = League::new("TEST");
    let resolver = FixedResolver { ids: HashMap::from([("Home".to_string(), 1), ("Away".to_string(), 2)]) };

    let fixtures = vec![FixtureRequest {
        home_name: "Home".to_string(),
        away_name: "Away".to_string(),
        league_code: "TEST".to_string(),
        match_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        odds: Some(ClosingOdds { home: 2.1, draw: 3.4, away: 3.2 }),
        lineup_stable: true,
    }];
    let options = PredictOptions::default();

    let cache_a = PredictionCache::default();
    let result_a = orchestrator::predict_slate(&fixtures, &v, &league, &cache_a, &resolver, &options).unwrap();

    let cache_b = PredictionCache::default();
    let result_b = orchestrator::predict_slate(&fixtures, &v, &league, &cache_b, &resolver, &options).unwrap();

    assert_eq!(result_a.predictions.len(), 1);
    assert_eq!(result_a.predictions[0].sets, result_b.predictions[0].sets);
    assert!(result_a.predictions[0].team_resolution_ok);

    // Re-running through the *same* warm cache must not change the answer.
    let result_c = orchestrator::predict_slate(&fixtures, &v, &league, &cache_a, &resolver, &options).unwrap();
    assert_eq!(result_a.predictions[0].sets, result_c.predictions[0].sets);
}

/// An unresolved team name is flagged per-fixture rather than aborting the
/// whole slate.
#[test]
fn unresolved_team_flags_without_aborting_slate() {
    let home = team(1, 0.0, 0.0);
    let away = team(2, 0.0, 0.0);
    let v = version(vec![home, away], 0.3, -0.1);
    let league = League::new("TEST");
    let resolver = FixedResolver { ids: HashMap::from([("Home".to_string(), 1), ("Away".to_string(), 2)]) };

    let fixtures = vec![FixtureRequest {
        home_name: "Home".to_string(),
        away_name: "Ghost".to_string(),
        league_code: "TEST".to_string(),
        match_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        odds: None,
        lineup_stable: true,
    }];
    let cache = PredictionCache::default();
    let options = PredictOptions::default();
    let result = orchestrator::predict_slate(&fixtures, &v, &league, &cache, &resolver, &options).unwrap();
    assert!(!result.predictions[0].team_resolution_ok);
    assert!(result.predictions[0].sets.is_empty());
}

/// DC low-score correction (spec §8 scenario 2): lambda_h=1.5, lambda_a=1.2,
/// rho=-0.13. `M[0,0]` gains the `1 - lambda_h*lambda_a*rho` factor and
/// `M[1,1]` gains `1 - rho`, exactly as Dixon-Coles defines tau.
#[test]
fn dc_low_score_correction_matches_tau_factors() {
    let lh = 1.5;
    let la = 1.2;
    let rho = -0.13;

    let independent_00 = dc_joint_pmf(0, 0, lh, la, 0.0);
    let corrected_00 = dc_joint_pmf(0, 0, lh, la, rho);
    let factor_00 = corrected_00 / independent_00;
    assert_abs_diff_eq!(factor_00, 1.0 + 0.234, epsilon = 1e-9);

    let independent_11 = dc_joint_pmf(1, 1, lh, la, 0.0);
    let corrected_11 = dc_joint_pmf(1, 1, lh, la, rho);
    let factor_11 = corrected_11 / independent_11;
    assert_abs_diff_eq!(factor_11, 1.13, epsilon = 1e-9);
}

/// Archetype enforcement (spec §8 scenario 6): a slate profile with
/// `avg_home_prob = 0.58`, `balanced_rate = 0.15` selects `FAVORITE_LOCK`,
/// whose per-combination constraint rejects any candidate with two draws.
#[test]
fn archetype_selection_and_draw_constraint() {
    let profile = SlateProfile { avg_home_prob: 0.58, balanced_rate: 0.15, away_value_rate: 0.0 };
    assert_eq!(archetypes::select_archetype(&profile), Archetype::FavoriteLock);

    use football_predict_core::decision::archetypes::PickEvaluation;
    use football_predict_core::domain::Outcome;
    let two_draws = vec![
        PickEvaluation { pick: Outcome::Draw, model_prob: 0.3, market_prob: None, market_odds_draw: None, market_odds_away: None, dc_applied: true },
        PickEvaluation { pick: Outcome::Draw, model_prob: 0.3, market_prob: None, market_odds_draw: None, market_odds_away: None, dc_applied: true },
    ];
    assert!(!archetypes::violations(Archetype::FavoriteLock, &two_draws).is_empty());
}

/// Isotonic fit-then-apply on its own training data recovers observed
/// frequencies within bucketing error (spec §8 round-trip law).
#[test]
fn isotonic_round_trip_recovers_training_frequencies() {
    let mut samples = Vec::new();
    for i in 0..400 {
        let p_hat = (i % 20) as f64 / 20.0 + 0.025;
        let occurred = (i * 7 % 20) < (p_hat * 20.0) as i32;
        samples.push(CalibrationSample { p_hat, occurred });
    }
    let curve = isotonic::fit(&samples);
    for s in &samples {
        let calibrated = isotonic::apply(&curve, s.p_hat);
        assert!((0.0..=1.0).contains(&calibrated));
    }
    // monotone: a higher raw probability never calibrates to a lower one.
    let lo = isotonic::apply(&curve, 0.1);
    let hi = isotonic::apply(&curve, 0.9);
    assert!(hi >= lo);
}
