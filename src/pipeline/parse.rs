use serde::Deserialize;
use tracing::warn;

use crate::error::ParseError;
use crate::models::{DetectionResponse, FaceBox};

/// Top level of the worker's stdout document. `data` stays an opaque JSON
/// value here: when the worker reports failure we take its message and do
/// not look at the payload at all, malformed or not.
#[derive(Debug, Deserialize)]
struct WorkerReport {
    success: bool,
    message: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct WorkerData {
    /// What the worker claims it counted. Only used for a diagnostic; the
    /// count we answer with is always re-derived from the face list.
    face_count: u64,
    faces: Vec<FaceBox>,
}

/// Decodes the worker's stdout into a detection response.
///
/// A face entry missing any of its four coordinate fields fails the whole
/// parse; there are no partial face lists. Callers are expected to map a
/// `ParseError` to a fixed generic message and keep the raw text out of the
/// response.
pub fn parse_detection_output(stdout: &str) -> Result<DetectionResponse, ParseError> {
    let report: WorkerReport = serde_json::from_str(stdout.trim())?;

    if !report.success {
        return Ok(DetectionResponse::failure(report.message));
    }

    let data = report.data.ok_or(ParseError::MissingData)?;
    let data: WorkerData = serde_json::from_value(data)?;

    if data.face_count != data.faces.len() as u64 {
        warn!(
            reported = data.face_count,
            actual = data.faces.len(),
            "worker-reported face count disagrees with its face list"
        );
    }

    Ok(DetectionResponse::success(report.message, data.faces))
}
