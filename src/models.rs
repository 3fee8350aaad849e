use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One detected face's bounding rectangle, in pixel coordinates of the
/// original image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Tuning parameters forwarded verbatim to the detection worker.
/// No range checks happen here; the worker may reject unreasonable values
/// by exiting non-zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionParams {
    /// Minimum face size in pixels.
    pub min_size: u32,
    /// How much the image size is reduced at each detection scale.
    pub scale_factor: f64,
    /// How many neighbors each candidate rectangle must retain.
    pub min_neighbors: u32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            min_size: 10,
            scale_factor: 1.1,
            min_neighbors: 1,
        }
    }
}

/// An uploaded image as handed over by the HTTP layer, alive for the
/// duration of one pipeline run. Never persisted.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub data: Vec<u8>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

impl UploadedImage {
    pub fn new(
        data: Vec<u8>,
        filename: Option<String>,
        content_type: Option<String>,
    ) -> Self {
        Self {
            data,
            filename,
            content_type,
        }
    }

    /// The filename's extension (text after the last dot), if any.
    /// A trailing dot yields an empty extension.
    pub fn extension(&self) -> Option<&str> {
        let filename = self.filename.as_deref()?;
        filename.rfind('.').map(|i| &filename[i + 1..])
    }
}

/// Detection result data: the face list plus a count that is always derived
/// from the list length at construction time. The fields are private so the
/// two can never drift apart.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionData {
    face_count: usize,
    faces: Vec<FaceBox>,
}

impl DetectionData {
    pub fn new(faces: Vec<FaceBox>) -> Self {
        Self {
            face_count: faces.len(),
            faces,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn face_count(&self) -> usize {
        self.face_count
    }

    pub fn faces(&self) -> &[FaceBox] {
        &self.faces
    }
}

/// The uniform response emitted for every pipeline run, success or failure.
/// The timestamp is set when the response is built, not supplied by the
/// worker.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionResponse {
    success: bool,
    message: String,
    data: DetectionData,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
}

impl DetectionResponse {
    pub fn success(message: impl Into<String>, faces: Vec<FaceBox>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: DetectionData::new(faces),
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: DetectionData::empty(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> &DetectionData {
        &self.data
    }
}
