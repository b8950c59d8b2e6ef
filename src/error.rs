//! Named error kinds for the prediction core (see spec §7).
//!
//! Every fallible core operation returns one of these variants rather than a
//! generic error; callers branch on kind, never on message text. CLI/adapter
//! glue wraps these in `anyhow::Error` with additional context the way the
//! teacher's `main.rs` does for I/O-level failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Too few matches or team appearances to fit a model.
    #[error("insufficient data: {reason}")]
    InsufficientData { reason: String },

    /// The strength-estimator optimizer failed to converge or produced an
    /// out-of-bounds parameter. Fatal to the current training run only; the
    /// prior active `ModelVersion` stays active.
    #[error("fit divergence: {reason}")]
    FitDivergence { reason: String },

    /// A fixture names a team the host could not resolve.
    #[error("team not found: {name} (league {league})")]
    TeamNotFound { name: String, league: String },

    /// A model version id the host asked for does not exist.
    #[error("model not found: {version_id}")]
    ModelNotFound { version_id: String },

    /// A blend coefficient left `[0, 1]` or a blended triple failed its sum
    /// invariant.
    #[error("blend error: {reason}")]
    BlendError { reason: String },

    /// A calibration-stage numerical invariant was violated.
    #[error("calibration error: {reason}")]
    CalibrationError { reason: String },

    /// The caller's deadline was exceeded; the request is abandoned with no
    /// partial state persisted.
    #[error("cancelled: deadline exceeded")]
    Cancelled,
}

pub type CoreResult<T> = Result<T, CoreError>;
