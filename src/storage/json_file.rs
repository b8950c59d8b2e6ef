//! A flat-file JSON adapter implementing every outbound port (spec §6).
//! Grounded in the teacher's preference for a small, explicit persistence
//! surface rather than a generic ORM — here traded for `serde_json` files
//! since this crate carries no database driver.

use std::collections::HashMap;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::DecisionConfig;
use crate::domain::{HistoricalMatch, ModelVersion, PredictionSnapshot, Ticket};
use crate::error::CoreError;
use crate::error::CoreResult;
use crate::ports::{MatchFilters, MatchRepository, ModelRepository, SnapshotRepository, TeamResolver, ThresholdsRepository};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct TeamDirectory {
    /// `"{league}:{name}" -> team_id`.
    by_name: HashMap<String, u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct ActiveVersions {
    /// `league -> version_id`.
    by_league: HashMap<String, String>,
}

/// One JSON-file-backed repository covering all five outbound ports. Every
/// write serializes the whole affected file; per-league training holds the
/// repository-level exclusive lock described in spec §5 via `train_lock`.
pub struct JsonFileRepository {
    base_dir: PathBuf,
    train_lock: Mutex<()>,
}

impl JsonFileRepository {
    pub fn new(base_dir: impl Into<PathBuf>) -> CoreResult<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(base_dir.join("models")).map_err(|e| io_err("creating models dir", e))?;
        Ok(Self { base_dir, train_lock: Mutex::new(()) })
    }

    fn models_dir(&self) -> PathBuf {
        self.base_dir.join("models")
    }

    fn team_directory_path(&self) -> PathBuf {
        self.base_dir.join("teams.json")
    }

    fn active_versions_path(&self) -> PathBuf {
        self.base_dir.join("active_versions.json")
    }

    fn matches_path(&self) -> PathBuf {
        self.base_dir.join("matches.json")
    }

    fn thresholds_path(&self) -> PathBuf {
        self.base_dir.join("thresholds.json")
    }

    fn snapshots_path(&self) -> PathBuf {
        self.base_dir.join("snapshots.jsonl")
    }

    fn tickets_path(&self) -> PathBuf {
        self.base_dir.join("tickets.jsonl")
    }

    fn outcomes_path(&self) -> PathBuf {
        self.base_dir.join("outcomes.jsonl")
    }

    /// Exclusive per-repository training lock (spec §5 "only one training
    /// run may be in flight per league"). A single mutex is a conservative
    /// approximation of the per-league lock: correct, just coarser.
    pub fn with_training_lock<T>(&self, f: impl FnOnce() -> CoreResult<T>) -> CoreResult<T> {
        let _guard = self.train_lock.lock();
        f()
    }

    fn read_json<T: for<'de> Deserialize<'de> + Default>(path: &Path) -> CoreResult<T> {
        if !path.exists() {
            return Ok(T::default());
        }
        let text = fs::read_to_string(path).map_err(|e| io_err("reading", e))?;
        serde_json::from_str(&text).map_err(|e| CoreError::ModelNotFound { version_id: format!("malformed json at {}: {e}", path.display()) })
    }

    fn write_json<T: Serialize>(path: &Path, value: &T) -> CoreResult<()> {
        let text = serde_json::to_string_pretty(value).map_err(|e| io_err("serializing", e))?;
        fs::write(path, text).map_err(|e| io_err("writing", e))
    }

    fn append_jsonl<T: Serialize>(path: &Path, value: &T) -> CoreResult<()> {
        let line = serde_json::to_string(value).map_err(|e| io_err("serializing", e))?;
        let mut file = fs::OpenOptions::new().create(true).append(true).open(path).map_err(|e| io_err("opening", e))?;
        writeln!(file, "{line}").map_err(|e| io_err("appending", e))
    }

    pub fn register_team(&self, league: &str, name: &str, team_id: u64) -> CoreResult<()> {
        let path = self.team_directory_path();
        let mut dir: TeamDirectory = Self::read_json(&path)?;
        dir.by_name.insert(format!("{league}:{name}"), team_id);
        Self::write_json(&path, &dir)
    }
}

fn io_err(context: &str, e: impl std::fmt::Display) -> CoreError {
    CoreError::CalibrationError { reason: format!("{context}: {e}") }
}

impl TeamResolver for JsonFileRepository {
    fn resolve(&self, name: &str, league: &str) -> Option<u64> {
        let dir: TeamDirectory = Self::read_json(&self.team_directory_path()).ok()?;
        dir.by_name.get(&format!("{league}:{name}")).copied()
    }
}

impl MatchRepository for JsonFileRepository {
    fn historical(&self, filters: &MatchFilters) -> CoreResult<Vec<HistoricalMatch>> {
        let all: Vec<HistoricalMatch> = Self::read_json(&self.matches_path())?;
        Ok(all
            .into_iter()
            .filter(|m| filters.league_code.as_deref().map(|l| l == m.league_code).unwrap_or(true))
            .filter(|m| filters.from.map(|d| m.date >= d).unwrap_or(true))
            .filter(|m| filters.to.map(|d| m.date <= d).unwrap_or(true))
            .collect())
    }
}

impl ModelRepository for JsonFileRepository {
    fn load(&self, version_id: &str) -> CoreResult<ModelVersion> {
        let path = self.models_dir().join(format!("{version_id}.json"));
        if !path.exists() {
            return Err(CoreError::ModelNotFound { version_id: version_id.to_string() });
        }
        let text = fs::read_to_string(&path).map_err(|e| io_err("reading model", e))?;
        serde_json::from_str(&text).map_err(|e| io_err("parsing model", e))
    }

    fn save(&self, version: &ModelVersion) -> CoreResult<()> {
        let path = self.models_dir().join(format!("{}.json", version.id));
        Self::write_json(&path, version)
    }

    fn activate(&self, version_id: &str) -> CoreResult<()> {
        let version = self.load(version_id)?;
        let path = self.active_versions_path();
        let mut active: ActiveVersions = Self::read_json(&path)?;
        for team in version.teams.values() {
            active.by_league.insert(team.league_id.clone(), version_id.to_string());
        }
        Self::write_json(&path, &active)
    }

    fn active(&self, league: &str) -> CoreResult<ModelVersion> {
        let active: ActiveVersions = Self::read_json(&self.active_versions_path())?;
        let version_id = active.by_league.get(league).ok_or_else(|| CoreError::ModelNotFound { version_id: format!("no active version for league {league}") })?;
        self.load(version_id)
    }
}

impl ThresholdsRepository for JsonFileRepository {
    fn current(&self) -> CoreResult<DecisionConfig> {
        let path = self.thresholds_path();
        if !path.exists() {
            return Ok(DecisionConfig::default());
        }
        let text = fs::read_to_string(&path).map_err(|e| io_err("reading thresholds", e))?;
        serde_json::from_str(&text).map_err(|e| io_err("parsing thresholds", e))
    }

    fn save(&self, snapshot: &DecisionConfig) -> CoreResult<()> {
        Self::write_json(&self.thresholds_path(), snapshot)
    }
}

impl SnapshotRepository for JsonFileRepository {
    fn record(&self, snapshot: &PredictionSnapshot) -> CoreResult<()> {
        Self::append_jsonl(&self.snapshots_path(), snapshot)
    }

    fn record_ticket(&self, ticket: &Ticket) -> CoreResult<()> {
        Self::append_jsonl(&self.tickets_path(), ticket)
    }

    fn record_outcome(&self, ticket_id: &str, correct: u32, total: u32) -> CoreResult<()> {
        #[derive(Serialize)]
        struct OutcomeRecord<'a> {
            ticket_id: &'a str,
            correct: u32,
            total: u32,
        }
        Self::append_jsonl(&self.outcomes_path(), &OutcomeRecord { ticket_id, correct, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn round_trips_a_model_version_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path()).unwrap();

        let version = ModelVersion {
            id: "EPL-1".into(),
            created_at: chrono::Utc::now(),
            teams: HashMap::new(),
            gamma: 0.3,
            rho: -0.1,
            xi: 0.0065,
            training_from: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            training_to: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            calibration: HashMap::new(),
            blend_policy: crate::domain::BlendPolicy::EntropyWeighted,
            kelly_blend_fallback: 0.0,
            validation: crate::domain::model_version::ValidationMetrics { brier_score: 0.2, log_loss: 0.5, draw_accuracy: 0.25 },
            status: crate::domain::ModelStatus::Active,
            calibration_quality_warning: false,
        };

        ModelRepository::save(&repo, &version).unwrap();
        let loaded = repo.load("EPL-1").unwrap();
        assert_eq!(loaded.id, version.id);
        assert!(repo.load("missing").is_err());
    }

    #[test]
    fn thresholds_default_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path()).unwrap();
        let cfg = repo.current().unwrap();
        assert_eq!(cfg, DecisionConfig::default());
    }
}
