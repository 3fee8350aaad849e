mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from facedetect for tests
pub use facedetect::{
    DetectionParams, DetectionWorker, DetectorConfig, FaceDetectionPipeline, PipelineError,
    RawOutput, ScriptWorker, StagingStore, UploadedImage,
};
