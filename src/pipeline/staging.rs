use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::UploadedImage;

/// A uniquely named temporary copy of an upload. Exists solely to hand a
/// stable path to the worker process.
///
/// `StagingStore::unstage` takes this by value, so each staged file can be
/// cleaned up at most once.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Writes validated uploads into the temp directory and removes them again
/// once the pipeline run is over.
#[derive(Debug, Clone)]
pub struct StagingStore {
    temp_dir: PathBuf,
}

impl StagingStore {
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
        }
    }

    /// Copies the upload's bytes to `face_detection_<uuid><ext>` inside the
    /// temp directory, creating the directory first if needed. The extension
    /// is taken from the original filename and defaults to `.jpg`.
    ///
    /// The UUID token is what keeps concurrent requests from colliding;
    /// there is no locking beyond the unique name.
    pub async fn stage(&self, upload: &UploadedImage) -> io::Result<StagedFile> {
        if !tokio::fs::try_exists(&self.temp_dir).await? {
            tokio::fs::create_dir_all(&self.temp_dir).await?;
            debug!(temp_dir = %self.temp_dir.display(), "created temp directory");
        }

        let extension = match upload.extension() {
            Some(ext) => format!(".{ext}"),
            None => ".jpg".to_string(),
        };
        let filename = format!("face_detection_{}{}", Uuid::new_v4(), extension);
        let path = self.temp_dir.join(filename);

        tokio::fs::write(&path, &upload.data).await?;
        debug!(path = %path.display(), "staged upload");

        Ok(StagedFile { path })
    }

    /// Deletes the staged file. A file that is already gone counts as
    /// success; any other deletion failure is logged and swallowed so that
    /// cleanup can never mask the pipeline's real outcome.
    pub async fn unstage(&self, staged: StagedFile) {
        match tokio::fs::remove_file(&staged.path).await {
            Ok(()) => debug!(path = %staged.path.display(), "removed staged file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %staged.path.display(), error = %e, "failed to remove staged file");
            }
        }
    }
}
