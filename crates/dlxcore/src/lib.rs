//! VideoDlx core: media metadata resolution and fetch orchestration.
//!
//! Given a media URL this crate resolves normalized metadata (title,
//! thumbnail, duration, available renditions) and downloads either a video
//! rendition at a requested quality or an audio-only extraction into a
//! shared download directory. Media extraction itself is delegated to an
//! [`extract::ExtractionEngine`]; the production engine runs yt-dlp.
//!
//! - [`core`]: configuration, errors, logging, metrics, process helpers
//! - [`extract`]: engine trait, yt-dlp backend, format selection
//! - [`fetch`]: normalizer, artifact store and the [`Fetcher`] orchestrator

pub mod core;
pub mod extract;
pub mod fetch;

pub use crate::core::{AppError, AppResult, FailureKind, FetchError};
pub use extract::{EngineError, ExtractionEngine, Quality, YtDlpEngine};
pub use fetch::{
    Artifact, ArtifactStore, FetchMode, FetchRequest, Fetcher, FetcherConfig, MediaInfo, MediaKind, MediaQuery,
    RenditionSummary,
};
