//! Extraction engine abstraction.
//!
//! The fetch layer never talks to yt-dlp directly. It goes through the
//! [`ExtractionEngine`] trait, which has two operations: resolve metadata for
//! a URL, and download a URL to an output template. [`YtDlpEngine`] is the
//! production backend; tests plug in fakes.

pub mod selector;
pub mod ytdlp;
pub mod ytdlp_errors;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub use selector::{FormatSelector, PostProcessing, Quality};
pub use ytdlp::YtDlpEngine;
pub use ytdlp_errors::{analyze_ytdlp_error, get_error_message, YtDlpErrorType};

/// Raw metadata record as produced by the engine.
///
/// Every field is optional on the wire; the normalizer supplies defaults.
/// Fields of an unexpected JSON type read as missing, and format entries that
/// are not objects are dropped, so one odd value never rejects the record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawInfo {
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub duration: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub extractor: Option<String>,
    #[serde(default, deserialize_with = "lenient::formats")]
    pub formats: Vec<RawFormat>,
}

impl RawInfo {
    /// True when the record carries none of the fields we read.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.thumbnail.is_none()
            && self.duration.is_none()
            && self.extractor.is_none()
            && self.formats.is_empty()
    }
}

/// One entry of the engine's `formats` list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawFormat {
    #[serde(default, deserialize_with = "lenient::id")]
    pub format_id: String,
    #[serde(default, deserialize_with = "lenient::uint32")]
    pub height: Option<u32>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub vcodec: Option<String>,
    #[serde(default, deserialize_with = "lenient::uint64")]
    pub filesize: Option<u64>,
}

/// Tolerant field readers for engine JSON.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::{Number, Value};

    use super::RawFormat;

    /// Non-negative whole number; floats are truncated.
    fn whole(n: &Number) -> Option<u64> {
        n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && *f <= u64::MAX as f64)
                .map(|f| f.trunc() as u64)
        })
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        })
    }

    pub fn float<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_f64(),
            _ => None,
        })
    }

    pub fn uint32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => whole(&n).and_then(|v| u32::try_from(v).ok()),
            _ => None,
        })
    }

    pub fn uint64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => whole(&n),
            _ => None,
        })
    }

    pub fn formats<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<RawFormat>, D::Error> {
        let Value::Array(items) = Value::deserialize(d)? else {
            return Ok(Vec::new());
        };
        Ok(items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect())
    }
}

/// A single download job handed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadJob {
    pub url: String,
    pub selector: FormatSelector,
    /// Output path template; the engine substitutes `%(ext)s`.
    pub output_template: String,
    pub post_processing: PostProcessing,
}

/// Errors from an engine call.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to execute {bin}: {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{bin} timed out after {secs}s")]
    Timeout { bin: String, secs: u64 },

    #[error("engine failed ({}): {stderr}", .kind.category())]
    Failed { kind: YtDlpErrorType, stderr: String },

    #[error("failed to parse engine output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl EngineError {
    /// Short description safe to show to an API caller (no raw stderr).
    pub fn summary(&self) -> String {
        match self {
            EngineError::Spawn { .. } => "extraction engine is not available".to_string(),
            EngineError::Timeout { secs, .. } => format!("extraction engine timed out after {}s", secs),
            EngineError::Failed { kind, .. } => get_error_message(kind).to_string(),
            EngineError::Parse(_) => "extraction engine returned unreadable output".to_string(),
            EngineError::Other(msg) => msg.clone(),
        }
    }

    /// Label for the engine error metric.
    pub fn category(&self) -> &'static str {
        match self {
            EngineError::Spawn { .. } => "spawn",
            EngineError::Timeout { .. } => "timeout",
            EngineError::Failed { kind, .. } => kind.category(),
            EngineError::Parse(_) => "parse",
            EngineError::Other(_) => "other",
        }
    }
}

/// Backend capable of resolving and downloading media URLs.
#[async_trait]
pub trait ExtractionEngine: Send + Sync {
    /// Human-readable name of this engine (e.g. "yt-dlp")
    fn name(&self) -> &str;

    /// Resolve metadata without downloading. `Ok(None)` means the engine
    /// ran but produced no record.
    async fn resolve_metadata(&self, url: &str) -> Result<Option<RawInfo>, EngineError>;

    /// Run the download. Returns the final file path when the engine reports
    /// one; callers fall back to scanning the output directory otherwise.
    async fn download(&self, job: &DownloadJob) -> Result<Option<PathBuf>, EngineError>;
}
