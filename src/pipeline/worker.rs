use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::config::DetectorConfig;
use crate::error::PipelineError;
use crate::models::DetectionParams;

/// Everything captured from one worker run. `exit_code` is `None` when the
/// process was killed by a signal.
#[derive(Debug, Clone)]
pub struct RawOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl RawOutput {
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// The process-invocation port: hand it an image path and parameters, get
/// back whatever the worker printed plus its exit status.
///
/// The orchestrator only knows this trait, so the external script can be
/// swapped for an in-process detector (or a test fake) without touching it.
pub trait DetectionWorker: Send + Sync {
    fn invoke(
        &self,
        image: &Path,
        params: &DetectionParams,
    ) -> impl Future<Output = Result<RawOutput, PipelineError>> + Send;
}

/// Runs the external detection script as a child process.
#[derive(Debug, Clone)]
pub struct ScriptWorker {
    executable: PathBuf,
    script: PathBuf,
    timeout: Option<Duration>,
}

impl ScriptWorker {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            executable: config.executable.clone(),
            script: config.script.clone(),
            timeout: config.worker_timeout,
        }
    }
}

impl DetectionWorker for ScriptWorker {
    /// Invokes
    /// `<executable> <script> <image> --min-size N --scale-factor F --min-neighbors N`.
    ///
    /// The image path is resolved to an absolute one first: the worker may
    /// run with a different working directory than ours. Both output
    /// streams are drained concurrently while waiting for exit, so a full
    /// stderr pipe can never block stdout (or vice versa).
    async fn invoke(
        &self,
        image: &Path,
        params: &DetectionParams,
    ) -> Result<RawOutput, PipelineError> {
        let image = std::path::absolute(image).map_err(PipelineError::Launch)?;

        debug!(
            executable = %self.executable.display(),
            script = %self.script.display(),
            image = %image.display(),
            min_size = params.min_size,
            scale_factor = params.scale_factor,
            min_neighbors = params.min_neighbors,
            "invoking detection worker"
        );

        let mut command = Command::new(&self.executable);
        command
            .arg(&self.script)
            .arg(&image)
            .arg("--min-size")
            .arg(params.min_size.to_string())
            .arg("--scale-factor")
            .arg(params.scale_factor.to_string())
            .arg("--min-neighbors")
            .arg(params.min_neighbors.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // output() reads both pipes concurrently and then waits for exit.
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| PipelineError::Timeout(limit))?,
            None => command.output().await,
        }
        .map_err(PipelineError::Launch)?;

        Ok(RawOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }
}
