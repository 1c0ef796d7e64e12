//! Download directory handling.
//!
//! The directory is shared by every in-flight fetch. Each fetch reserves an
//! output stem derived from its start time; after the engine finishes the
//! produced file is located either from the path the engine reported or by
//! scanning the directory for the stem.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::core::error::FetchError;

/// What kind of file a fetch produces. Decides the file name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            MediaKind::Video => "video_",
            MediaKind::Audio => "audio_",
        }
    }
}

/// Output name reserved for one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    kind: MediaKind,
    /// `<prefix><secs>.<micros>`, unique per microsecond
    stem: String,
    /// `<prefix><secs>`, what the directory scan matches on
    scan_prefix: String,
    template: PathBuf,
}

impl Reservation {
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn scan_prefix(&self) -> &str {
        &self.scan_prefix
    }

    /// Engine output template, `%(ext)s` left for the engine to fill.
    pub fn output_template(&self) -> String {
        self.template.to_string_lossy().into_owned()
    }
}

/// A produced media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub file_name: String,
    /// Extension chosen by the engine, empty if the file has none
    pub extension: String,
    pub kind: MediaKind,
    pub size_bytes: u64,
}

impl Artifact {
    fn from_path(path: PathBuf, kind: MediaKind) -> io::Result<Self> {
        let size_bytes = fs::metadata(&path)?.len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            path,
            file_name,
            extension,
            kind,
            size_bytes,
        })
    }
}

/// Files the engine leaves behind while still writing.
fn is_in_progress(name: &str) -> bool {
    name.ends_with(".part") || name.ends_with(".ytdl") || name.contains(".part-Frag")
}

/// `name` starts with `prefix` and the timestamp is not a prefix of a longer one.
fn matches_prefix(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_digit()))
}

/// The shared download directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if it does not exist yet.
    pub fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    /// Reserve an output name for a fetch that started at `started_at`.
    pub fn reserve(&self, kind: MediaKind, started_at: DateTime<Utc>) -> Reservation {
        let secs = started_at.timestamp();
        let micros = started_at.timestamp_subsec_micros() % 1_000_000;
        let scan_prefix = format!("{}{}", kind.prefix(), secs);
        let stem = format!("{}.{:06}", scan_prefix, micros);
        let template = self.dir.join(format!("{}.%(ext)s", stem));
        Reservation {
            kind,
            stem,
            scan_prefix,
            template,
        }
    }

    /// Find the file produced for `reservation`.
    ///
    /// A path reported by the engine wins if it is an existing file inside the
    /// directory. Otherwise the directory is scanned: a file carrying the exact
    /// reserved stem is preferred, then the first name (sorted) that starts
    /// with the scan prefix.
    pub fn locate(&self, reservation: &Reservation, reported: Option<&Path>) -> Result<Artifact, FetchError> {
        if let Some(path) = reported.and_then(|p| self.trusted_path(p)) {
            log::debug!("Using engine-reported artifact: {}", path.display());
            return Artifact::from_path(path, reservation.kind).map_err(|e| {
                log::error!("Failed to stat reported artifact: {}", e);
                self.not_found(reservation)
            });
        }
        if let Some(p) = reported {
            log::warn!("Ignoring engine-reported path outside download dir or missing: {}", p.display());
        }

        let entries = fs::read_dir(&self.dir).map_err(|e| {
            log::error!("Failed to read download dir {}: {}", self.dir.display(), e);
            self.not_found(reservation)
        })?;

        let mut candidates: Vec<(String, PathBuf)> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                (matches_prefix(&name, &reservation.scan_prefix) && !is_in_progress(&name))
                    .then(|| (name, entry.path()))
            })
            .collect();
        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        let exact = format!("{}.", reservation.stem);
        let chosen = candidates
            .iter()
            .position(|(name, _)| name.starts_with(&exact))
            .unwrap_or(0);

        if candidates.len() > 1 {
            log::warn!(
                "{} files match {} in {}, using {}",
                candidates.len(),
                reservation.scan_prefix,
                self.dir.display(),
                candidates.get(chosen).map(|c| c.0.as_str()).unwrap_or_default()
            );
        }

        let Some((_, path)) = candidates.into_iter().nth(chosen) else {
            log::error!(
                "No file starting with {} found in {}",
                reservation.scan_prefix,
                self.dir.display()
            );
            return Err(self.not_found(reservation));
        };

        Artifact::from_path(path, reservation.kind).map_err(|e| {
            log::error!("Failed to stat artifact: {}", e);
            self.not_found(reservation)
        })
    }

    fn trusted_path(&self, reported: &Path) -> Option<PathBuf> {
        let dir = self.dir.canonicalize().ok()?;
        let path = reported.canonicalize().ok()?;
        (path.starts_with(&dir) && path.is_file()).then_some(path)
    }

    fn not_found(&self, reservation: &Reservation) -> FetchError {
        FetchError::ArtifactNotFound {
            dir: self.dir.clone(),
            prefix: reservation.scan_prefix.clone(),
        }
    }
}
