pub mod parse;
pub mod staging;
pub mod validate;
pub mod worker;

use tracing::{error, info, warn};

use crate::config::DetectorConfig;
use crate::error::PipelineError;
use crate::models::{DetectionParams, DetectionResponse, UploadedImage};

pub use parse::parse_detection_output;
pub use staging::{StagedFile, StagingStore};
pub use validate::is_valid_image;
pub use worker::{DetectionWorker, RawOutput, ScriptWorker};

/// Worker stderr is user-visible on failure, so cap how much of it we quote.
const MAX_STDERR_MESSAGE_LEN: usize = 2048;

/// Sequences one request through validate, stage, invoke and parse, and
/// turns every failure along the way into a uniform failure response.
///
/// Generic over the worker port so the external script can be replaced by
/// an in-process detector or a test fake.
pub struct FaceDetectionPipeline<W = ScriptWorker> {
    staging: StagingStore,
    worker: W,
    max_upload_size: u64,
}

impl FaceDetectionPipeline<ScriptWorker> {
    pub fn new(config: &DetectorConfig) -> Self {
        let worker = ScriptWorker::new(config);
        Self::with_worker(config, worker)
    }
}

impl<W: DetectionWorker> FaceDetectionPipeline<W> {
    pub fn with_worker(config: &DetectorConfig, worker: W) -> Self {
        Self {
            staging: StagingStore::new(config.temp_dir.clone()),
            worker,
            max_upload_size: config.max_upload_size,
        }
    }

    /// Runs the full pipeline for one upload and always yields exactly one
    /// terminal response.
    ///
    /// If staging succeeded, the staged file is removed exactly once before
    /// this returns, whatever happened after staging.
    pub async fn detect(
        &self,
        upload: &UploadedImage,
        params: &DetectionParams,
    ) -> DetectionResponse {
        info!(
            filename = upload.filename.as_deref().unwrap_or("<none>"),
            size = upload.data.len(),
            min_size = params.min_size,
            scale_factor = params.scale_factor,
            min_neighbors = params.min_neighbors,
            "starting face detection"
        );

        if !is_valid_image(upload, self.max_upload_size) {
            return Self::failure_response(&PipelineError::Validation);
        }

        let staged = match self.staging.stage(upload).await {
            Ok(staged) => staged,
            Err(e) => {
                error!(error = %e, "failed to stage upload");
                return Self::failure_response(&PipelineError::Staging(e));
            }
        };

        // Everything fallible after staging happens inside run_staged, so
        // the single unstage below covers every exit path.
        let outcome = self.run_staged(&staged, params).await;
        self.staging.unstage(staged).await;

        match outcome {
            Ok(response) => {
                info!(
                    face_count = response.data().face_count(),
                    success = response.is_success(),
                    "face detection completed"
                );
                response
            }
            Err(e) => {
                error!(error = %e, "face detection failed");
                Self::failure_response(&e)
            }
        }
    }

    async fn run_staged(
        &self,
        staged: &StagedFile,
        params: &DetectionParams,
    ) -> Result<DetectionResponse, PipelineError> {
        let raw = self.worker.invoke(staged.path(), params).await?;

        if !raw.is_success() {
            error!(
                exit_code = ?raw.exit_code,
                stderr = %raw.stderr.trim(),
                "detection worker exited with an error"
            );
            let stderr = raw.stderr.trim();
            let detail = if stderr.is_empty() {
                match raw.exit_code {
                    Some(code) => format!("worker exited with code {code}"),
                    None => "worker terminated by signal".to_string(),
                }
            } else {
                truncated(stderr, MAX_STDERR_MESSAGE_LEN)
            };
            return Err(PipelineError::WorkerExit(detail));
        }

        if !raw.stderr.trim().is_empty() {
            // Exit code zero wins: stderr chatter is diagnostics, not failure.
            warn!(stderr = %raw.stderr.trim(), "detection worker wrote to stderr");
        }

        match parse_detection_output(&raw.stdout) {
            Ok(response) => Ok(response),
            Err(e) => {
                error!(
                    error = %e,
                    stdout = %truncated(raw.stdout.trim(), MAX_STDERR_MESSAGE_LEN),
                    "could not parse detection worker output"
                );
                Err(PipelineError::Parse(e))
            }
        }
    }

    /// Maps the error taxonomy onto the caller-facing failure messages.
    /// Parse failures never echo worker output; worker exit failures quote
    /// (bounded) stderr.
    fn failure_response(error: &PipelineError) -> DetectionResponse {
        match error {
            PipelineError::Validation => DetectionResponse::failure("Invalid image file"),
            PipelineError::Parse(_) => {
                DetectionResponse::failure("Failed to parse detection results")
            }
            other => DetectionResponse::failure(format!("Face detection failed: {other}")),
        }
    }
}

fn truncated(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
