//! The orchestrator (spec §5, §6): composes Strength Estimator → Integrator
//! → Blender → Calibrator → Decision in that strict order, and exposes the
//! two inbound operations the host calls.

use std::time::Instant;

use tracing::{info, warn};

use crate::blend;
use crate::cache::{PredictionCache, PredictionCacheKey};
use crate::calibrate;
use crate::config::DecisionConfig;
use crate::decision::{self, FixtureContext};
use crate::domain::{Archetype, ClosingOdds, Fixture, League, ModelVersion, PredictionSnapshot, ProbabilitySetKind, ProbabilityTriple, Ticket};
use crate::error::{CoreError, CoreResult};
use crate::generator;
use crate::integrator;
use crate::ports::TeamResolver;

/// One inbound fixture exactly as the host names it (spec §6
/// `predict_slate`): names are resolved to ids here, inside the core, so a
/// failed resolution can be flagged per-fixture instead of aborting the
/// whole slate.
pub struct FixtureRequest {
    pub home_name: String,
    pub away_name: String,
    pub league_code: String,
    pub match_date: chrono::NaiveDate,
    pub odds: Option<ClosingOdds>,
    pub lineup_stable: bool,
}

/// Per-fixture result of [`predict_slate`].
pub struct FixturePrediction {
    pub sets: Vec<(ProbabilitySetKind, ProbabilityTriple)>,
    pub team_resolution_ok: bool,
}

pub struct SlateResult {
    pub predictions: Vec<FixturePrediction>,
}

/// Options recognized by `predict_slate` (spec §6).
pub struct PredictOptions<'a> {
    pub sets: &'a [ProbabilitySetKind],
    pub apply_calibration: bool,
    pub deadline: Option<Instant>,
}

impl Default for PredictOptions<'_> {
    fn default() -> Self {
        Self { sets: &ProbabilitySetKind::ALL, apply_calibration: true, deadline: None }
    }
}

fn check_deadline(deadline: Option<Instant>) -> CoreResult<()> {
    if let Some(d) = deadline {
        if Instant::now() >= d {
            return Err(CoreError::Cancelled);
        }
    }
    Ok(())
}

/// `predict_slate(fixtures, options) -> SlateResult` (spec §6). `resolver`
/// resolves each fixture's home/away names to team ids; unresolved fixtures
/// come back flagged rather than aborting the whole slate.
pub fn predict_slate(
    fixtures: &[FixtureRequest],
    version: &ModelVersion,
    league: &League,
    cache: &PredictionCache,
    resolver: &dyn TeamResolver,
    options: &PredictOptions,
) -> CoreResult<SlateResult> {
    let mut predictions = Vec::with_capacity(fixtures.len());

    for request in fixtures {
        check_deadline(options.deadline)?;

        let home_id = resolver.resolve(&request.home_name, &request.league_code);
        let away_id = resolver.resolve(&request.away_name, &request.league_code);
        let (Some(home_id), Some(away_id)) = (home_id, away_id) else {
            predictions.push(FixturePrediction { sets: Vec::new(), team_resolution_ok: false });
            continue;
        };
        let fixture = Fixture { home_team_id: home_id, away_team_id: away_id, league_code: request.league_code.clone(), match_date: request.match_date, odds: request.odds, lineup_stable: request.lineup_stable };

        let home = version.team(home_id).ok_or_else(|| CoreError::TeamNotFound { name: request.home_name.clone(), league: fixture.league_code.clone() })?;
        let away = version.team(away_id).ok_or_else(|| CoreError::TeamNotFound { name: request.away_name.clone(), league: fixture.league_code.clone() })?;

        let cache_key: PredictionCacheKey = (version.id.clone(), home_id, away_id, fixture.lineup_stable);
        let model_triple = match cache.get(&cache_key) {
            Some(cached) => cached,
            None => {
                let computed = integrator::predict(home, away, version, fixture.lineup_stable)?;
                cache.insert(cache_key, computed);
                computed
            }
        };

        let sets = blend::build_sets(&model_triple, fixture.odds.as_ref(), league, version.kelly_blend_fallback)?;

        let mut out = Vec::with_capacity(options.sets.len());
        for &kind in options.sets {
            let mut triple = *sets.get(kind);
            if options.apply_calibration {
                triple = calibrate::apply(&triple, &version.calibration);
            }
            out.push((kind, triple));
        }

        predictions.push(FixturePrediction { sets: out, team_resolution_ok: true });
    }

    Ok(SlateResult { predictions })
}

/// Diagnostics and the selected bundle from [`evaluate_tickets`].
pub struct BundleResult {
    pub accepted: Vec<Ticket>,
    pub bundle: Vec<Ticket>,
}

/// `evaluate_tickets(slate_id, candidate_tickets, options) -> BundleResult`
/// (spec §6). Here `candidate_tickets` is expressed as the slate-level
/// inputs the generator needs, since the core builds its own candidates
/// archetype-first (spec §4.6) rather than accepting pre-built pick lists
/// from the host. `trained_odds` is the closing-odds snapshot the model
/// trained on, per fixture, in the same order as `odds`; fixtures whose
/// current odds moved by more than the late-shock threshold relative to
/// `trained_odds` have their contribution de-weighted in the bundle score
/// (spec §4.6 "Late-shock detection").
pub fn evaluate_tickets(
    slate_id: &str,
    snapshots: &[PredictionSnapshot],
    odds: &[Option<ClosingOdds>],
    trained_odds: &[Option<ClosingOdds>],
    archetype_hint: Option<Archetype>,
    bundle_size: usize,
    config: &DecisionConfig,
) -> BundleResult {
    let triples: Vec<ProbabilityTriple> = snapshots.iter().map(|s| s.triple).collect();
    let market_triples: Vec<Option<ProbabilityTriple>> = odds.iter().map(|o| o.as_ref().and_then(blend::market::market_triple)).collect();

    let profile = decision::archetypes::compute_profile(&triples, &market_triples);
    let archetype = archetype_hint.unwrap_or_else(|| decision::archetypes::select_archetype(&profile));

    let contexts: Vec<FixtureContext> = snapshots
        .iter()
        .zip(odds.iter())
        .zip(market_triples.iter())
        .map(|((snapshot, odds), market)| FixtureContext { snapshot, odds: odds.as_ref(), market: market.as_ref() })
        .collect();

    let accepted = generator::generate_tickets(slate_id, archetype, &contexts, config);
    info!(slate_id, archetype = archetype.as_str(), n_accepted = accepted.len(), "ticket generation complete");

    let trained_pairs: Vec<(usize, f64)> = trained_odds.iter().enumerate().filter_map(|(i, o)| o.as_ref().map(|o| (i, o.home))).collect();
    let current_pairs: Vec<(usize, f64)> = odds.iter().enumerate().filter_map(|(i, o)| o.as_ref().map(|o| (i, o.home))).collect();
    let shocked = generator::detect_late_shocks(&trained_pairs, &current_pairs);
    if !shocked.is_empty() {
        warn!(slate_id, n_shocked = shocked.len(), "late odds moves detected, de-weighting affected tickets");
    }
    let bundle: Vec<Ticket> = generator::select_bundle(&accepted, bundle_size, &shocked).into_iter().cloned().collect();

    if bundle.is_empty() && !accepted.is_empty() {
        warn!(slate_id, "no ticket cleared positive marginal contribution for the bundle");
    }

    BundleResult { accepted, bundle }
}
