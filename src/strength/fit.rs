//! The Strength Estimator (spec §4.1): fits `(α_i, β_i)` per team plus
//! `(γ, ρ)` for one league by time-decay-weighted maximum likelihood under
//! the Dixon-Coles bivariate-Poisson model.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::calibrate::isotonic::CalibrationSample;
use crate::calibrate::{self, CalibrationTrainingSet};
use crate::config::{minimums, Hyperparameters};
use crate::domain::{BlendPolicy, CalibrationCurve, ModelStatus, ModelVersion, Outcome, Team, ValidationMetrics};
use crate::error::{CoreError, CoreResult};
use crate::integrator;

use super::optimizer::{coordinate_descent, Parameter};
use super::poisson::dc_joint_pmf;

/// Per-match working record used only during fitting (weights + outcome).
struct WeightedMatch<'a> {
    m: &'a crate::domain::HistoricalMatch,
    weight: f64,
}

fn lambda_home(alpha_home: f64, beta_away: f64, gamma: f64) -> f64 {
    (alpha_home - beta_away + gamma).exp()
}

fn lambda_away(alpha_away: f64, beta_home: f64) -> f64 {
    (alpha_away - beta_home).exp()
}

/// Weighted negative log-likelihood (plus L2 ridge) for one league's
/// matches, given a dense `team_id -> index` map and flattened parameter
/// vector `[alpha_0..alpha_n, beta_0..beta_n, gamma, rho]`.
fn negative_log_likelihood(
    matches: &[WeightedMatch],
    team_index: &HashMap<u64, usize>,
    n_teams: usize,
    params: &[f64],
    l2_penalty: f64,
) -> f64 {
    let alphas = &params[0..n_teams];
    let betas = &params[n_teams..2 * n_teams];
    let gamma = params[2 * n_teams];
    let rho = params[2 * n_teams + 1];

    let mut nll = 0.0;
    for wm in matches {
        let hi = *team_index.get(&wm.m.home_team_id).unwrap_or(&usize::MAX);
        let ai = *team_index.get(&wm.m.away_team_id).unwrap_or(&usize::MAX);
        let alpha_h = if hi == usize::MAX { 0.0 } else { alphas[hi] };
        let beta_h = if hi == usize::MAX { 0.0 } else { betas[hi] };
        let alpha_a = if ai == usize::MAX { 0.0 } else { alphas[ai] };
        let beta_a = if ai == usize::MAX { 0.0 } else { betas[ai] };

        let lh = lambda_home(alpha_h, beta_a, gamma);
        let la = lambda_away(alpha_a, beta_h);
        if !lh.is_finite() || !la.is_finite() || lh <= 0.0 || la <= 0.0 {
            return f64::INFINITY;
        }

        let p = dc_joint_pmf(wm.m.home_goals as u32, wm.m.away_goals as u32, lh, la, rho);
        if !p.is_finite() || p <= 0.0 {
            return f64::INFINITY;
        }
        nll -= wm.weight * p.ln();
    }

    let ridge: f64 = alphas.iter().chain(betas.iter()).map(|v| v * v).sum::<f64>() * l2_penalty;
    nll + ridge
}

/// Fit one league's `ModelVersion` from its historical matches.
///
/// `t0` defaults to `clock.now()`'s date when `None` is passed by the
/// caller — the usual case for a live retrain, where "now" is the correct
/// time-decay reference point. Backtests over a fixed historical window
/// should pass `t0` explicitly instead of relying on the default.
pub fn fit(
    league_code: &str,
    matches: &[crate::domain::HistoricalMatch],
    hyperparams: Hyperparameters,
    t0: Option<NaiveDate>,
    clock: &dyn crate::ports::Clock,
) -> CoreResult<ModelVersion> {
    let league_matches: Vec<&crate::domain::HistoricalMatch> = matches
        .iter()
        .filter(|m| m.league_code == league_code)
        .collect();

    if league_matches.len() < minimums::LEAGUE_MATCHES {
        return Err(CoreError::InsufficientData {
            reason: format!(
                "league {league_code} has {} matches, need >= {}",
                league_matches.len(),
                minimums::LEAGUE_MATCHES
            ),
        });
    }

    let now = clock.now();
    let t0 = t0.unwrap_or_else(|| now.date_naive());

    let mut appearances: HashMap<u64, usize> = HashMap::new();
    for m in &league_matches {
        *appearances.entry(m.home_team_id).or_insert(0) += 1;
        *appearances.entry(m.away_team_id).or_insert(0) += 1;
    }

    let established: Vec<u64> = appearances
        .iter()
        .filter(|(_, &n)| n >= minimums::TEAM_APPEARANCES)
        .map(|(&id, _)| id)
        .collect();
    let shrunk: Vec<u64> = appearances
        .iter()
        .filter(|(_, &n)| n < minimums::TEAM_APPEARANCES)
        .map(|(&id, _)| id)
        .collect();

    let mut team_index: HashMap<u64, usize> = HashMap::new();
    for (i, &id) in established.iter().enumerate() {
        team_index.insert(id, i);
    }
    let n_teams = established.len();

    let weighted: Vec<WeightedMatch> = league_matches
        .iter()
        .map(|&m| {
            let days = (t0 - m.date).num_days() as f64;
            let weight = (-hyperparams.xi * days).exp();
            WeightedMatch { m, weight }
        })
        .collect();

    info!(league = league_code, n_matches = league_matches.len(), n_teams, "fitting strength estimator");

    let mut params: Vec<Parameter> = Vec::with_capacity(2 * n_teams + 2);
    for _ in 0..n_teams {
        params.push(Parameter { value: 0.0, bounds: (-crate::domain::team::STRENGTH_BOUND, crate::domain::team::STRENGTH_BOUND) });
    }
    for _ in 0..n_teams {
        params.push(Parameter { value: 0.0, bounds: (-crate::domain::team::STRENGTH_BOUND, crate::domain::team::STRENGTH_BOUND) });
    }
    params.push(Parameter { value: hyperparams.home_advantage_prior, bounds: Hyperparameters::GAMMA_BOUNDS });
    params.push(Parameter { value: hyperparams.rho, bounds: Hyperparameters::RHO_BOUNDS });

    let (sweeps, final_cost) = coordinate_descent(&mut params, hyperparams.max_iterations, 1e-6, |v| {
        negative_log_likelihood(&weighted, &team_index, n_teams, v, hyperparams.l2_penalty)
    });

    if !final_cost.is_finite() {
        return Err(CoreError::FitDivergence {
            reason: "non-finite negative log-likelihood after optimization".to_string(),
        });
    }
    if sweeps >= hyperparams.max_iterations {
        warn!(league = league_code, sweeps, "strength estimator hit iteration cap");
    }

    let mut alphas: Vec<f64> = params[0..n_teams].iter().map(|p| p.value).collect();
    let mut betas: Vec<f64> = params[n_teams..2 * n_teams].iter().map(|p| p.value).collect();
    let mut gamma = params[2 * n_teams].value;
    let rho = Hyperparameters::clamp_rho(params[2 * n_teams + 1].value);

    for (&a, &b) in alphas.iter().zip(betas.iter()) {
        if a.abs() > crate::domain::team::STRENGTH_BOUND || b.abs() > crate::domain::team::STRENGTH_BOUND {
            return Err(CoreError::FitDivergence {
                reason: format!("team strength out of bounds: alpha={a} beta={b}"),
            });
        }
    }

    // Identifiability normalization (spec §3): recenter league means of
    // alpha and beta to zero. Shifting both series by a shared constant
    // leaves every lambda_home exactly unchanged once gamma absorbs the
    // residual; lambda_away picks up a second-order residual from the
    // (generally small) gap between the two shifts, which is the accepted
    // approximation documented in DESIGN.md.
    let mean_alpha = mean(&alphas);
    let mean_beta = mean(&betas);
    for a in alphas.iter_mut() {
        *a -= mean_alpha;
    }
    for b in betas.iter_mut() {
        *b -= mean_beta;
    }
    gamma += mean_alpha - mean_beta;
    gamma = Hyperparameters::clamp_gamma(gamma);

    let mut teams: HashMap<u64, Team> = HashMap::new();
    for (&id, &idx) in &team_index {
        teams.insert(
            id,
            Team {
                id,
                league_id: league_code.to_string(),
                attack: alphas[idx],
                defense: betas[idx],
                home_bias: 0.0,
                last_fit_at: now,
                shrinkage_flag: false,
            },
        );
    }

    for &id in &shrunk {
        let n = appearances[&id] as f64;
        let scale = (n / minimums::TEAM_APPEARANCES as f64).min(1.0);
        teams.insert(
            id,
            Team {
                id,
                league_id: league_code.to_string(),
                attack: mean_alpha * scale,
                defense: mean_beta * scale,
                home_bias: 0.0,
                last_fit_at: now,
                shrinkage_flag: true,
            },
        );
        debug!(team_id = id, n_appearances = n, "applying shrinkage to thin-history team");
    }

    let version = ModelVersion {
        id: format!("{league_code}-{}", now.timestamp()),
        created_at: now,
        teams,
        gamma,
        rho,
        xi: hyperparams.xi,
        training_from: league_matches.iter().map(|m| m.date).min().unwrap(),
        training_to: league_matches.iter().map(|m| m.date).max().unwrap(),
        calibration: HashMap::new(),
        blend_policy: BlendPolicy::EntropyWeighted,
        kelly_blend_fallback: 0.0,
        validation: ValidationMetrics {
            brier_score: f64::NAN,
            log_loss: f64::NAN,
            draw_accuracy: f64::NAN,
        },
        status: ModelStatus::Active,
        calibration_quality_warning: false,
    };

    let fitted = fit_in_sample_calibration(&version, &league_matches);
    let quality_warning = fitted.quality_warning;
    if quality_warning {
        warn!(league = league_code, "in-sample calibration exceeded the ECE quality threshold on at least one outcome");
    }
    let mut version = with_calibration(version, fitted.curves);
    version.calibration_quality_warning = quality_warning;

    Ok(version)
}

/// Back-test the freshly fitted model against its own training matches to
/// produce a calibration curve per outcome. This is in-sample (the host is
/// free to re-fit calibration from a genuine held-out window via the same
/// [`calibrate::fit_calibration`] entry point once outcome history exists),
/// but it means every `ModelVersion` leaves `fit` with a non-trivial
/// calibration map rather than an always-identity placeholder.
fn fit_in_sample_calibration(version: &ModelVersion, league_matches: &[&crate::domain::HistoricalMatch]) -> calibrate::FittedCalibration {
    let mut home = Vec::new();
    let mut draw = Vec::new();
    let mut away = Vec::new();

    for m in league_matches {
        let (Some(home_team), Some(away_team)) = (version.team(m.home_team_id), version.team(m.away_team_id)) else {
            continue;
        };
        let Ok(triple) = integrator::predict(home_team, away_team, version, true) else {
            continue;
        };
        let actual = Outcome::from_goals(m.home_goals, m.away_goals);
        home.push(CalibrationSample { p_hat: triple.p_home, occurred: actual == Outcome::Home });
        draw.push(CalibrationSample { p_hat: triple.p_draw, occurred: actual == Outcome::Draw });
        away.push(CalibrationSample { p_hat: triple.p_away, occurred: actual == Outcome::Away });
    }

    calibrate::fit_calibration(&CalibrationTrainingSet { home, draw, away })
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        0.0
    } else {
        xs.iter().sum::<f64>() / xs.len() as f64
    }
}

/// Attach a validation-curve map placeholder; used by the calibrator once
/// it has fitted curves to embed into the version record.
pub fn with_calibration(mut version: ModelVersion, calibration: HashMap<String, CalibrationCurve>) -> ModelVersion {
    version.calibration = calibration;
    version
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HistoricalMatch;
    use chrono::Duration;

    fn synth_matches(n_teams: u64, n_rounds: usize) -> Vec<HistoricalMatch> {
        let mut matches = Vec::new();
        let base_date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let mut day = 0;
        for round in 0..n_rounds {
            for i in 0..n_teams {
                let j = (i + 1 + round as u64) % n_teams;
                if i == j {
                    continue;
                }
                let home_goals = ((i + round as u64) % 4) as u16;
                let away_goals = ((j + round as u64) % 3) as u16;
                matches.push(HistoricalMatch::new(
                    "TEST",
                    base_date + Duration::days(day),
                    i,
                    j,
                    home_goals,
                    away_goals,
                    None,
                ));
                day += 1;
            }
        }
        matches
    }

    #[test]
    fn insufficient_data_below_200_matches() {
        let matches = synth_matches(4, 5);
        let result = fit("TEST", &matches, Hyperparameters::default(), None, &crate::ports::SystemClock);
        assert!(matches!(result, Err(CoreError::InsufficientData { .. })));
    }

    #[test]
    fn fit_converges_on_synthetic_league() {
        let matches = synth_matches(10, 25);
        let t0 = matches.iter().map(|m| m.date).max().unwrap();
        let result = fit("TEST", &matches, Hyperparameters::default(), Some(t0), &crate::ports::SystemClock).expect("should fit");
        assert!(!result.teams.is_empty());
        for team in result.teams.values() {
            assert!(team.within_bounds());
        }
        assert!(result.rho <= 0.0 && result.rho >= -0.2);
        assert!(result.gamma >= 0.1 && result.gamma <= 0.6);
    }
}
