//! Thin HTTP surface over the detection pipeline. Routing and multipart
//! decoding live here; everything with actual failure-handling complexity
//! is in [`crate::pipeline`].

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::routing::{get, post};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::config::DetectorConfig;
use crate::models::{DetectionParams, DetectionResponse, UploadedImage};
use crate::pipeline::FaceDetectionPipeline;

struct AppState {
    pipeline: FaceDetectionPipeline,
}

/// Detection tuning knobs as query parameters, e.g. `?minSize=30`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectQuery {
    #[serde(default = "default_min_size")]
    min_size: u32,
    #[serde(default = "default_scale_factor")]
    scale_factor: f64,
    #[serde(default = "default_min_neighbors")]
    min_neighbors: u32,
}

fn default_min_size() -> u32 {
    DetectionParams::default().min_size
}

fn default_scale_factor() -> f64 {
    DetectionParams::default().scale_factor
}

fn default_min_neighbors() -> u32 {
    DetectionParams::default().min_neighbors
}

impl From<DetectQuery> for DetectionParams {
    fn from(query: DetectQuery) -> Self {
        Self {
            min_size: query.min_size,
            scale_factor: query.scale_factor,
            min_neighbors: query.min_neighbors,
        }
    }
}

pub fn router(config: DetectorConfig) -> Router {
    // Leave headroom above the validator's limit so oversized uploads reach
    // the policy check instead of dying as an opaque body-limit error.
    let body_limit = config.max_upload_size as usize + 1024 * 1024;
    let state = Arc::new(AppState {
        pipeline: FaceDetectionPipeline::new(&config),
    });
    Router::new()
        .route("/api/face-detection/health", get(health))
        .route("/api/face-detection/detect", post(detect))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, config: DetectorConfig) -> anyhow::Result<()> {
    let app = router(config);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "face detection API listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> &'static str {
    "Face Detection API is running!"
}

async fn detect(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DetectQuery>,
    mut multipart: Multipart,
) -> Json<DetectionResponse> {
    let params = DetectionParams::from(query);

    let upload = match read_image_field(&mut multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => return Json(DetectionResponse::failure("Missing image upload")),
        Err(response) => return Json(response),
    };

    Json(state.pipeline.detect(&upload, &params).await)
}

/// Pulls the `image` field out of the multipart body. Fields with other
/// names are skipped.
async fn read_image_field(
    multipart: &mut Multipart,
) -> Result<Option<UploadedImage>, DetectionResponse> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!(error = %e, "failed to read multipart body");
                return Err(DetectionResponse::failure(
                    "File size exceeds maximum allowed size or the upload is malformed",
                ));
            }
        };

        if field.name() != Some("image") {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = match field.bytes().await {
            Ok(data) => data.to_vec(),
            Err(e) => {
                warn!(error = %e, "failed to read image field");
                return Err(DetectionResponse::failure(
                    "File size exceeds maximum allowed size or the upload is malformed",
                ));
            }
        };

        return Ok(Some(UploadedImage::new(data, filename, content_type)));
    }
}
