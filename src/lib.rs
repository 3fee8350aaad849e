pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;

pub use config::DetectorConfig;
pub use error::{ParseError, PipelineError};
pub use models::{
    DetectionData, DetectionParams, DetectionResponse, FaceBox, UploadedImage,
};
pub use pipeline::{
    DetectionWorker, FaceDetectionPipeline, RawOutput, ScriptWorker, StagedFile, StagingStore,
};

#[cfg(feature = "server")]
pub mod server;
