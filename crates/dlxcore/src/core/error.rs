use std::path::PathBuf;

use thiserror::Error;

use crate::extract::EngineError;

/// Public failure kinds of the fetch layer.
///
/// This is what crosses the delivery boundary; the engine detail behind a
/// failure stays inside [`FetchError`] as its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    /// Missing or empty URL
    InvalidInput,
    /// Engine metadata or download call failed or returned nothing usable
    ResolutionFailed,
    /// Download finished but no produced file could be located
    ArtifactNotFound,
}

/// Errors returned by [`crate::fetch::Fetcher`].
///
/// # Example
///
/// ```
/// use dlxcore::{FailureKind, FetchError};
///
/// let err = FetchError::InvalidInput;
/// assert_eq!(err.kind(), FailureKind::InvalidInput);
/// assert_eq!(err.to_string(), "URL required");
/// ```
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("URL required")]
    InvalidInput,

    /// Engine call failed; `source` keeps the full engine detail.
    #[error("{message}")]
    ResolutionFailed {
        message: String,
        #[source]
        source: Option<EngineError>,
    },

    #[error("Downloaded file not found (expected name starting with {prefix})")]
    ArtifactNotFound { dir: PathBuf, prefix: String },
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::InvalidInput => FailureKind::InvalidInput,
            FetchError::ResolutionFailed { .. } => FailureKind::ResolutionFailed,
            FetchError::ArtifactNotFound { .. } => FailureKind::ArtifactNotFound,
        }
    }

    /// Resolution failure caused by an engine error.
    pub fn engine(context: &str, source: EngineError) -> Self {
        FetchError::ResolutionFailed {
            message: format!("{}: {}", context, source.summary()),
            source: Some(source),
        }
    }

    /// Resolution failure without an underlying engine error (e.g. empty result).
    pub fn unresolved(message: impl Into<String>) -> Self {
        FetchError::ResolutionFailed {
            message: message.into(),
            source: None,
        }
    }
}

/// Application-level errors (startup, configuration, IO outside a fetch).
#[derive(Error, Debug)]
pub enum AppError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Fetch errors surfaced to a caller that is not the HTTP layer (CLI)
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
