use std::io;
use std::time::Duration;

use thiserror::Error;

/// Everything that can go wrong during one pipeline run. Each variant is
/// converted to a failure-shaped response at the orchestrator boundary;
/// none of these escape to the HTTP layer.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Upload metadata failed the size/extension/content-type policy.
    #[error("invalid image file")]
    Validation,

    /// Filesystem failure while writing the staged copy. No worker process
    /// was launched.
    #[error("failed to stage upload: {0}")]
    Staging(#[source] io::Error),

    /// The worker executable could not be started at all (missing binary,
    /// permission denied). Distinct from a worker that ran and failed.
    #[error("failed to launch detection worker: {0}")]
    Launch(#[source] io::Error),

    /// The worker outlived the configured deadline and was killed.
    #[error("detection worker timed out after {0:?}")]
    Timeout(Duration),

    /// The worker exited non-zero. Carries its (truncated) stderr text.
    #[error("detection worker failed: {0}")]
    WorkerExit(String),

    /// The worker exited zero but its stdout did not match the expected
    /// document shape.
    #[error("failed to parse detection results")]
    Parse(#[source] ParseError),
}

/// Why the worker's stdout could not be decoded. Surfaced to callers only
/// as a fixed generic message; the detail stays in diagnostics.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("worker output is not the expected JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("worker reported success without a data payload")]
    MissingData,
}
