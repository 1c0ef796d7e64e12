//! HTTP delivery surface
//!
//! Thin axum layer over [`Fetcher`]:
//! - `GET /`, `GET /health` - liveness
//! - `POST /api/video-info` - resolve media info
//! - `POST /api/download` - materialize and stream the file
//! - `GET /metrics` - Prometheus text exposition

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use dlxcore::core::config;
use dlxcore::{Artifact, FetchError, FetchMode, FetchRequest, Fetcher, MediaInfo, MediaKind, MediaQuery};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::io::ReaderStream;
use tower_http::cors::{Any, CorsLayer};

/// Shared handler state
#[derive(Clone)]
pub struct ApiState {
    fetcher: Fetcher,
}

#[derive(Debug, Deserialize)]
pub struct InfoRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_quality")]
    pub quality: String,
    #[serde(default)]
    pub is_audio: bool,
}

fn default_quality() -> String {
    config::download::DEFAULT_QUALITY.to_string()
}

/// Errors returned to API callers as `{"error": msg}`
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Build the API router
pub fn router(fetcher: Fetcher) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/api/video-info", post(handle_video_info))
        .route("/api/download", post(handle_download))
        .route("/metrics", get(metrics_handler))
        .layer(cors)
        .with_state(ApiState { fetcher })
}

/// Start the API server and run until Ctrl+C
pub async fn serve(fetcher: Fetcher, addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(fetcher);

    log::info!("Starting VideoDlx API on http://{}", addr);
    log::info!("  POST /api/video-info - resolve media info");
    log::info!("  POST /api/download   - download video or audio");
    log::info!("  GET  /metrics        - Prometheus metrics");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "online",
        "service": config::server::SERVICE_NAME,
    }))
}

async fn handle_video_info(
    State(state): State<ApiState>,
    Json(req): Json<InfoRequest>,
) -> Result<Json<MediaInfo>, ApiError> {
    let query = MediaQuery::new(req.url.unwrap_or_default());
    let info = state.fetcher.resolve_info(&query).await.map_err(|e| {
        log::warn!("video-info failed ({}): {}", e.kind(), e);
        ApiError::from(e)
    })?;
    Ok(Json(info))
}

async fn handle_download(
    State(state): State<ApiState>,
    Json(req): Json<DownloadRequest>,
) -> Result<Response, ApiError> {
    let request = FetchRequest {
        query: MediaQuery::new(req.url.unwrap_or_default()),
        mode: FetchMode::from_parts(&req.quality, req.is_audio),
    };
    let artifact = state.fetcher.materialize(&request).await.map_err(|e| {
        log::warn!("download failed ({}): {}", e.kind(), e);
        ApiError::from(e)
    })?;

    let file = tokio::fs::File::open(&artifact.path).await.map_err(|e| {
        log::error!("Failed to open artifact {}: {}", artifact.path.display(), e);
        ApiError::Internal("Failed to read downloaded file".to_string())
    })?;

    let filename = download_filename(&artifact, &req.quality);
    log::info!("Sending {} as {}", artifact.path.display(), filename);

    let headers = [
        (header::CONTENT_TYPE, content_type(&artifact.extension).to_string()),
        (header::CONTENT_LENGTH, artifact.size_bytes.to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
    ];
    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

/// Handler for /metrics endpoint
async fn metrics_handler() -> Response {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    match encoder.encode(&prometheus::gather(), &mut buffer) {
        Ok(()) => ([(header::CONTENT_TYPE, encoder.format_type().to_string())], buffer).into_response(),
        Err(e) => {
            log::error!("Failed to encode metrics: {}", e);
            ApiError::Internal(format!("Failed to encode metrics: {}", e)).into_response()
        }
    }
}

/// Name offered to the client: `video_<quality>.<ext>` or `audio.<ext>`.
///
/// The quality label is echoed from the request, restricted to characters
/// that are safe inside a quoted header value.
pub fn download_filename(artifact: &Artifact, requested_quality: &str) -> String {
    let ext = if artifact.extension.is_empty() {
        match artifact.kind {
            MediaKind::Video => config::download::VIDEO_MERGE_FORMAT,
            MediaKind::Audio => config::download::AUDIO_CODEC,
        }
    } else {
        artifact.extension.as_str()
    };

    match artifact.kind {
        MediaKind::Audio => format!("audio.{}", ext),
        MediaKind::Video => {
            let label: String = requested_quality
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                .collect();
            let label = if label.is_empty() { "default".to_string() } else { label };
            format!("video_{}.{}", label, ext)
        }
    }
}

fn content_type(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "opus" | "ogg" => "audio/ogg",
        _ => "application/octet-stream",
    }
}
