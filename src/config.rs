use std::path::PathBuf;
use std::time::Duration;

/// Default maximum upload size: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;

/// Everything the pipeline needs from the outside world, passed in at
/// construction. Nothing here is computed by the pipeline itself.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Interpreter used to run the worker script.
    pub executable: PathBuf,
    /// Path to the detection worker script.
    pub script: PathBuf,
    /// Directory for staged upload copies. Created on demand.
    pub temp_dir: PathBuf,
    /// Uploads larger than this are rejected by the validator.
    pub max_upload_size: u64,
    /// How long to wait for the worker before killing it.
    /// `None` waits indefinitely.
    pub worker_timeout: Option<Duration>,
}

impl DetectorConfig {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            executable: PathBuf::from("python"),
            script: script.into(),
            temp_dir: std::env::temp_dir(),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            worker_timeout: None,
        }
    }

    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    pub fn with_max_upload_size(mut self, max_upload_size: u64) -> Self {
        self.max_upload_size = max_upload_size;
        self
    }

    pub fn with_worker_timeout(mut self, worker_timeout: Option<Duration>) -> Self {
        self.worker_timeout = worker_timeout;
        self
    }
}
