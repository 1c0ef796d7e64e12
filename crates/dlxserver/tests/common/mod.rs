//! Test helpers for driving the API router without a network.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::Router;
use dlxcore::extract::{DownloadJob, EngineError, ExtractionEngine, RawInfo, YtDlpErrorType};
use dlxcore::{ArtifactStore, Fetcher};
use tempfile::TempDir;

/// Engine returning a fixed record and writing a fixed payload on download.
pub struct StubEngine {
    pub metadata: Result<Option<RawInfo>, YtDlpErrorType>,
    /// Extension to write, `None` to fail the download
    pub download_ext: Option<&'static str>,
    pub payload: &'static [u8],
}

impl StubEngine {
    pub fn ok(metadata: RawInfo) -> Self {
        Self {
            metadata: Ok(Some(metadata)),
            download_ext: Some("mp4"),
            payload: b"fake-media-bytes",
        }
    }
}

#[async_trait]
impl ExtractionEngine for StubEngine {
    fn name(&self) -> &str {
        "stub"
    }

    async fn resolve_metadata(&self, _url: &str) -> Result<Option<RawInfo>, EngineError> {
        self.metadata.clone().map_err(|kind| EngineError::Failed {
            kind,
            stderr: "ERROR: stubbed".to_string(),
        })
    }

    async fn download(&self, job: &DownloadJob) -> Result<Option<PathBuf>, EngineError> {
        let Some(ext) = self.download_ext else {
            return Err(EngineError::Failed {
                kind: YtDlpErrorType::VideoUnavailable,
                stderr: "ERROR: stubbed".to_string(),
            });
        };
        let path = PathBuf::from(job.output_template.replace("%(ext)s", ext));
        std::fs::write(&path, self.payload).map_err(|e| EngineError::Other(e.to_string()))?;
        Ok(Some(path))
    }
}

/// Router over `engine` with a fresh temporary download folder.
pub fn app(engine: StubEngine) -> (Router, TempDir) {
    let tmp = TempDir::new().unwrap();
    let fetcher = Fetcher::new(Arc::new(engine), ArtifactStore::new(tmp.path()));
    (dlxserver::server::router(fetcher), tmp)
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
