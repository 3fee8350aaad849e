use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use facedetect::{
    DetectionParams, DetectionWorker, DetectorConfig, PipelineError, RawOutput, UploadedImage,
};

/// Worker stdout used by the happy-path tests: two faces, in a fixed order.
pub const TWO_FACES_JSON: &str = r#"{"success":true,"message":"ok","data":{"face_count":2,"faces":[{"x":1,"y":2,"width":3,"height":4},{"x":5,"y":6,"width":7,"height":8}]}}"#;

/// Builds an upload with the given metadata and a small non-empty body.
pub fn make_upload(filename: Option<&str>, content_type: Option<&str>) -> UploadedImage {
    UploadedImage::new(
        vec![0xFF, 0xD8, 0xFF, 0xE0],
        filename.map(str::to_string),
        content_type.map(str::to_string),
    )
}

/// A well-formed JPEG upload that passes validation.
pub fn jpeg_upload() -> UploadedImage {
    make_upload(Some("photo.jpg"), Some("image/jpeg"))
}

/// Writes a `/bin/sh` script that plays the detection worker. The pipeline
/// invokes it exactly like the real script: `sh worker.sh <image> --min-size ...`.
pub fn write_worker_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("worker.sh");
    std::fs::write(&path, body).expect("Failed to write worker script");
    path
}

/// Config pointing the pipeline at a shell-script worker and a dedicated
/// staging directory.
pub fn sh_worker_config(script_dir: &Path, staging_dir: &Path, body: &str) -> DetectorConfig {
    let script = write_worker_script(script_dir, body);
    DetectorConfig::new(script)
        .with_executable("/bin/sh")
        .with_temp_dir(staging_dir)
}

/// A script body that prints the given document on stdout and exits zero.
pub fn script_emitting(stdout_json: &str) -> String {
    format!("echo '{stdout_json}'\n")
}

pub fn count_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| entries.count())
        .unwrap_or(0)
}

/// Worker fake that records how often it was invoked and replays a canned
/// output. Used to prove the orchestrator never reaches the worker on
/// rejected uploads.
pub struct RecordingWorker {
    calls: Arc<AtomicUsize>,
    output: RawOutput,
}

impl RecordingWorker {
    pub fn succeeding(stdout: &str) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            output: RawOutput {
                stdout: stdout.to_string(),
                stderr: String::new(),
                exit_code: Some(0),
            },
        }
    }

    /// Shared call counter, still readable after the worker is moved into a
    /// pipeline.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl DetectionWorker for RecordingWorker {
    async fn invoke(
        &self,
        _image: &Path,
        _params: &DetectionParams,
    ) -> Result<RawOutput, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }
}
