//! The core data model (spec §3): a strict DAG of immutable records —
//! `League ← Team ← HistoricalMatch ← ModelVersion ← PredictionSnapshot ←
//! TicketPick ← Ticket`.

pub mod fixture;
pub mod league;
pub mod match_record;
pub mod model_version;
pub mod probability;
pub mod snapshot;
pub mod team;
pub mod ticket;

pub use fixture::Fixture;
pub use league::League;
pub use match_record::{ClosingOdds, HistoricalMatch, Outcome};
pub use model_version::{BlendPolicy, CalibrationCurve, CalibrationPoint, ModelStatus, ModelVersion, ValidationMetrics};
pub use probability::{ProbabilitySetKind, ProbabilityTriple};
pub use snapshot::PredictionSnapshot;
pub use team::Team;
pub use ticket::{count_soft_contradictions, Archetype, Ticket, TicketPick};
