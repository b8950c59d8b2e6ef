//! Outbound ports (spec §6): pure capability contracts the core requires
//! from its host. The core never imports a transport or storage engine
//! directly — every adapter lives behind one of these traits.

use crate::domain::{HistoricalMatch, ModelVersion, PredictionSnapshot, Ticket};
use crate::error::CoreResult;

/// Resolves a human-facing team name within a league to the internal id the
/// rest of the core operates on.
pub trait TeamResolver {
    fn resolve(&self, name: &str, league: &str) -> Option<u64>;
}

/// Filters describing the slice of historical matches a fit run needs.
#[derive(Debug, Clone, Default)]
pub struct MatchFilters {
    pub league_code: Option<String>,
    pub from: Option<chrono::NaiveDate>,
    pub to: Option<chrono::NaiveDate>,
}

pub trait MatchRepository {
    fn historical(&self, filters: &MatchFilters) -> CoreResult<Vec<HistoricalMatch>>;
}

/// Model version lifecycle: load by id, persist a new one, and manage the
/// single "active" version per league (spec §6 "Exactly one version per
/// league is active").
pub trait ModelRepository {
    fn load(&self, version_id: &str) -> CoreResult<ModelVersion>;
    fn save(&self, version: &ModelVersion) -> CoreResult<()>;
    fn activate(&self, version_id: &str) -> CoreResult<()>;
    fn active(&self, league: &str) -> CoreResult<ModelVersion>;
}

/// The learned decision-layer scalars (spec §6).
pub trait ThresholdsRepository {
    fn current(&self) -> CoreResult<crate::config::DecisionConfig>;
    fn save(&self, snapshot: &crate::config::DecisionConfig) -> CoreResult<()>;
}

/// Append-only record of what the core believed and decided, used later for
/// threshold re-learning (spec §6).
pub trait SnapshotRepository {
    fn record(&self, snapshot: &PredictionSnapshot) -> CoreResult<()>;
    fn record_ticket(&self, ticket: &Ticket) -> CoreResult<()>;
    fn record_outcome(&self, ticket_id: &str, correct: u32, total: u32) -> CoreResult<()>;
}

/// Injected wall-clock, so time-decay weighting is deterministic in tests
/// (spec §6 "injected to make time-decay deterministic in tests"). Strength
/// fitting uses this both as the default time-decay reference date and as
/// the `ModelVersion`/`Team` fit timestamp.
pub trait Clock {
    fn now(&self) -> chrono::DateTime<chrono::Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now()
    }
}
