//! Error taxonomy for startup and per-cycle failures.

use std::path::PathBuf;

/// Failures while loading the process-wide artifacts. These are fatal: the
/// predictor never starts serving without its model and column list.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("{kind} not found at {}: {source}", .path.display())]
    ArtifactMissing {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{kind} at {} is not valid: {reason}", .path.display())]
    ArtifactInvalid {
        kind: &'static str,
        path: PathBuf,
        reason: String,
    },
    #[error("unknown time zone '{0}'")]
    UnknownTimeZone(String),
}

/// Failures inside a single fetch cycle. The next cycle is unaffected.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("failed to fetch live feed: {0}")]
    Transport(String),
    #[error("failed to parse live feed: {0}")]
    FeedParse(#[from] prost::DecodeError),
    #[error("failed to score live trains: {0}")]
    Scoring(#[from] ModelError),
}

/// Failures raised by a [`crate::model::Classifier`].
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("feature width mismatch: got {got}, model expects {expected}")]
    WidthMismatch { got: usize, expected: usize },
    #[error("model returned {got} probability rows for {expected} inputs")]
    RowCountMismatch { got: usize, expected: usize },
    #[error("model returned {got} probabilities for {expected} classes")]
    ClassCountMismatch { got: usize, expected: usize },
}
