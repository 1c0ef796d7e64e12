//! Fetch orchestration.
//!
//! [`Fetcher`] implements the two operations exposed to delivery surfaces:
//!
//! - [`Fetcher::resolve_info`]: metadata-only engine call, normalized into a
//!   [`MediaInfo`].
//! - [`Fetcher::materialize`]: reserve an output name, pick the format
//!   selector, run the engine download and locate the produced file.
//!
//! Engine failures are logged here in full and translated into
//! [`FetchError`]; the raw engine detail only travels on as the error source.

pub mod normalize;
pub mod store;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

pub use normalize::{normalize, MediaInfo, RenditionSummary};
pub use store::{Artifact, ArtifactStore, MediaKind, Reservation};

use crate::core::config;
use crate::core::error::FetchError;
use crate::core::metrics;
use crate::extract::{DownloadJob, ExtractionEngine, FormatSelector, PostProcessing, Quality, YtDlpEngine};

/// A media URL as received from a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaQuery {
    pub url: String,
}

impl MediaQuery {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Trimmed URL, or `InvalidInput` when empty.
    fn validated(&self) -> Result<&str, FetchError> {
        let url = self.url.trim();
        if url.is_empty() {
            Err(FetchError::InvalidInput)
        } else {
            Ok(url)
        }
    }
}

/// What to produce for a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Video(Quality),
    /// Audio only; any requested quality is ignored.
    Audio,
}

impl FetchMode {
    /// Mode from the loose caller inputs (quality string plus audio flag).
    pub fn from_parts(quality: &str, is_audio: bool) -> Self {
        if is_audio {
            FetchMode::Audio
        } else {
            FetchMode::Video(Quality::parse_lenient(quality))
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            FetchMode::Video(_) => MediaKind::Video,
            FetchMode::Audio => MediaKind::Audio,
        }
    }

    pub fn selector(&self) -> FormatSelector {
        match self {
            FetchMode::Video(quality) => FormatSelector::for_video(*quality),
            FetchMode::Audio => FormatSelector::for_audio(),
        }
    }

    pub fn post_processing(&self) -> PostProcessing {
        match self {
            FetchMode::Video(_) => PostProcessing::video_merge(),
            FetchMode::Audio => PostProcessing::audio_extract(),
        }
    }
}

/// One materialize call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub query: MediaQuery,
    pub mode: FetchMode,
}

impl FetchRequest {
    pub fn video(url: impl Into<String>, quality: Quality) -> Self {
        Self {
            query: MediaQuery::new(url),
            mode: FetchMode::Video(quality),
        }
    }

    pub fn audio(url: impl Into<String>) -> Self {
        Self {
            query: MediaQuery::new(url),
            mode: FetchMode::Audio,
        }
    }
}

/// Settings the fetcher is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    pub download_dir: PathBuf,
    pub ytdl_bin: String,
    pub engine_timeout: Duration,
    pub cookies_file: Option<String>,
    pub proxy: Option<String>,
}

impl FetcherConfig {
    /// Read from DOWNLOAD_FOLDER, YTDL_BIN, YTDLP_TIMEOUT_SECS, YTDL_COOKIES_FILE and YTDL_PROXY.
    pub fn from_env() -> Self {
        Self {
            download_dir: config::expand_path(&config::DOWNLOAD_FOLDER),
            ytdl_bin: config::YTDL_BIN.clone(),
            engine_timeout: config::download::ytdlp_timeout(),
            cookies_file: config::YTDL_COOKIES_FILE.clone(),
            proxy: config::YTDL_PROXY.clone(),
        }
    }

    /// yt-dlp engine with these settings.
    pub fn engine(&self) -> YtDlpEngine {
        YtDlpEngine::new(self.ytdl_bin.as_str(), self.engine_timeout)
            .with_cookies(self.cookies_file.clone())
            .with_proxy(self.proxy.clone())
    }
}

/// Orchestrates engine calls against the shared download directory.
#[derive(Clone)]
pub struct Fetcher {
    engine: Arc<dyn ExtractionEngine>,
    store: ArtifactStore,
}

impl Fetcher {
    pub fn new(engine: Arc<dyn ExtractionEngine>, store: ArtifactStore) -> Self {
        Self { engine, store }
    }

    /// Production fetcher: yt-dlp engine and download folder from `config`.
    pub fn from_config(config: &FetcherConfig) -> Self {
        Self::new(Arc::new(config.engine()), ArtifactStore::new(config.download_dir.clone()))
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Resolve metadata for a URL without downloading anything.
    pub async fn resolve_info(&self, query: &MediaQuery) -> Result<MediaInfo, FetchError> {
        metrics::record_request("resolve", "info");
        let result = self.resolve_inner(query).await;
        if let Err(e) = &result {
            metrics::record_failure("resolve", e.kind().as_ref());
        }
        result
    }

    async fn resolve_inner(&self, query: &MediaQuery) -> Result<MediaInfo, FetchError> {
        let url = query.validated()?;
        log::info!("Resolving media info via {}: {}", self.engine.name(), url);

        let raw = match self.engine.resolve_metadata(url).await {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => {
                log::warn!("Engine returned no metadata for {}", url);
                return Err(FetchError::unresolved("Failed"));
            }
            Err(e) => {
                log::error!("Metadata resolution failed for {}: {}", url, e);
                return Err(FetchError::engine("Failed to resolve media info", e));
            }
        };

        let info = MediaInfo::from_raw(url, raw);
        log::info!(
            "Resolved '{}' from {} ({}s, {} renditions)",
            info.title,
            info.source_site,
            info.duration_seconds,
            info.renditions.len()
        );
        Ok(info)
    }

    /// Download a URL in the requested mode and return the produced file.
    pub async fn materialize(&self, request: &FetchRequest) -> Result<Artifact, FetchError> {
        self.materialize_at(request, Utc::now()).await
    }

    /// [`Fetcher::materialize`] with an explicit start time, which decides the
    /// reserved output name.
    pub async fn materialize_at(
        &self,
        request: &FetchRequest,
        started_at: DateTime<Utc>,
    ) -> Result<Artifact, FetchError> {
        metrics::record_request("fetch", request.mode.kind().as_ref());
        let result = self.materialize_inner(request, started_at).await;
        if let Err(e) = &result {
            metrics::record_failure("fetch", e.kind().as_ref());
        }
        result
    }

    async fn materialize_inner(
        &self,
        request: &FetchRequest,
        started_at: DateTime<Utc>,
    ) -> Result<Artifact, FetchError> {
        let url = request.query.validated()?;
        let reservation = self.store.reserve(request.mode.kind(), started_at);
        let job = DownloadJob {
            url: url.to_string(),
            selector: request.mode.selector(),
            output_template: reservation.output_template(),
            post_processing: request.mode.post_processing(),
        };

        log::info!(
            "Fetching {} as {:?} with selector '{}' -> {}",
            url,
            request.mode,
            job.selector,
            job.output_template
        );

        let reported = self.engine.download(&job).await.map_err(|e| {
            log::error!("Download failed for {}: {}", url, e);
            FetchError::engine("Download failed", e)
        })?;

        let artifact = self.store.locate(&reservation, reported.as_deref())?;
        log::info!(
            "Fetched {} -> {} ({} bytes)",
            url,
            artifact.path.display(),
            artifact.size_bytes
        );
        Ok(artifact)
    }
}
