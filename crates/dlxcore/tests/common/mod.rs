//! Fake extraction engine shared by the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use dlxcore::extract::{DownloadJob, EngineError, ExtractionEngine, RawInfo, YtDlpErrorType};

/// How the fake behaves on `download`.
#[derive(Debug, Clone)]
pub enum DownloadBehavior {
    /// Fill the template with this extension, write the file and report it.
    WriteAndReport(&'static str),
    /// Fill the template with this extension, write the file, report nothing.
    WriteSilently(&'static str),
    /// Write a file with this exact name into `dir`, report nothing.
    WriteNamed { dir: PathBuf, name: String },
    /// Succeed without producing anything.
    Nothing,
    /// Fail like yt-dlp would.
    Fail(YtDlpErrorType),
}

/// Scripted engine that records every download job it receives.
pub struct FakeEngine {
    pub metadata: Option<RawInfo>,
    pub metadata_error: Option<YtDlpErrorType>,
    pub download: DownloadBehavior,
    pub jobs: Mutex<Vec<DownloadJob>>,
}

impl FakeEngine {
    pub fn new(download: DownloadBehavior) -> Self {
        Self {
            metadata: None,
            metadata_error: None,
            download,
            jobs: Mutex::new(Vec::new()),
        }
    }

    pub fn with_metadata(mut self, metadata: RawInfo) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn failing_metadata(mut self, kind: YtDlpErrorType) -> Self {
        self.metadata_error = Some(kind);
        self
    }

    pub fn recorded_jobs(&self) -> Vec<DownloadJob> {
        self.jobs.lock().unwrap().clone()
    }
}

fn fill_template(template: &str, ext: &str) -> PathBuf {
    PathBuf::from(template.replace("%(ext)s", ext))
}

#[async_trait]
impl ExtractionEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    async fn resolve_metadata(&self, _url: &str) -> Result<Option<RawInfo>, EngineError> {
        if let Some(kind) = self.metadata_error {
            return Err(EngineError::Failed {
                kind,
                stderr: "ERROR: scripted failure".to_string(),
            });
        }
        Ok(self.metadata.clone())
    }

    async fn download(&self, job: &DownloadJob) -> Result<Option<PathBuf>, EngineError> {
        self.jobs.lock().unwrap().push(job.clone());
        match &self.download {
            DownloadBehavior::WriteAndReport(ext) => {
                let path = fill_template(&job.output_template, ext);
                std::fs::write(&path, b"media").map_err(|e| EngineError::Other(e.to_string()))?;
                Ok(Some(path))
            }
            DownloadBehavior::WriteSilently(ext) => {
                let path = fill_template(&job.output_template, ext);
                std::fs::write(&path, b"media").map_err(|e| EngineError::Other(e.to_string()))?;
                Ok(None)
            }
            DownloadBehavior::WriteNamed { dir, name } => {
                std::fs::write(dir.join(name), b"media").map_err(|e| EngineError::Other(e.to_string()))?;
                Ok(None)
            }
            DownloadBehavior::Nothing => Ok(None),
            DownloadBehavior::Fail(kind) => Err(EngineError::Failed {
                kind: *kind,
                stderr: "ERROR: scripted failure".to_string(),
            }),
        }
    }
}
