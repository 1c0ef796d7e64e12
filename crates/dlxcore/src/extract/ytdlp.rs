//! yt-dlp backed extraction engine.
//!
//! Metadata is read with `--dump-single-json`; downloads print the final
//! file path via `--print after_move:filepath` so the caller does not have to
//! guess what extension the merge or audio extraction produced.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;

use super::{analyze_ytdlp_error, DownloadJob, EngineError, ExtractionEngine, PostProcessing, RawInfo};
use crate::core::{config, metrics, process::run_with_timeout};

/// Extraction engine that shells out to the yt-dlp binary.
#[derive(Debug, Clone)]
pub struct YtDlpEngine {
    bin: String,
    timeout: Duration,
    cookies_file: Option<String>,
    proxy: Option<String>,
}

impl YtDlpEngine {
    pub fn new(bin: impl Into<String>, timeout: Duration) -> Self {
        Self {
            bin: bin.into(),
            timeout,
            cookies_file: None,
            proxy: None,
        }
    }

    pub fn with_cookies(mut self, cookies_file: Option<String>) -> Self {
        self.cookies_file = cookies_file;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    fn push_network_args(&self, args: &mut Vec<String>) {
        if let Some(cookies) = &self.cookies_file {
            let path = config::expand_path(cookies);
            if path.exists() {
                args.push("--cookies".to_string());
                args.push(path.to_string_lossy().into_owned());
            } else {
                log::warn!("Cookies file not found, continuing without it: {}", path.display());
            }
        }
        if let Some(proxy) = &self.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }
    }

    /// Arguments for a metadata-only call.
    pub fn metadata_args(&self, url: &str) -> Vec<String> {
        let mut args: Vec<String> = ["--dump-single-json", "--no-playlist", "--no-warnings", "--skip-download"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        self.push_network_args(&mut args);
        args.push(url.to_string());
        args
    }

    /// Arguments for a download call.
    pub fn download_args(&self, job: &DownloadJob) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "--format".to_string(),
            job.selector.as_str().to_string(),
            "--output".to_string(),
            job.output_template.clone(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--no-progress".to_string(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
        ];

        match &job.post_processing {
            PostProcessing::MergeInto { container } => {
                args.push("--merge-output-format".to_string());
                args.push(container.clone());
            }
            PostProcessing::ExtractAudio { codec, bitrate_kbps } => {
                args.push("--extract-audio".to_string());
                args.push("--audio-format".to_string());
                args.push(codec.clone());
                args.push("--audio-quality".to_string());
                args.push(format!("{}K", bitrate_kbps));
            }
        }

        self.push_network_args(&mut args);
        args.push(job.url.clone());
        args
    }

    async fn run(&self, operation: &str, args: &[String]) -> Result<Vec<u8>, EngineError> {
        log::debug!("yt-dlp command: {} {}", self.bin, args.join(" "));

        let start = Instant::now();
        let mut cmd = Command::new(&self.bin);
        cmd.args(args);
        let result = run_with_timeout(&mut cmd, &self.bin, self.timeout).await;
        metrics::observe_engine_duration(operation, start.elapsed().as_secs_f64());

        let output = result.inspect_err(|e| metrics::record_engine_error(operation, e.category()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            let kind = analyze_ytdlp_error(&stderr);
            log::error!("yt-dlp {} failed, error type: {:?}", operation, kind);
            log::error!("yt-dlp stderr: {}", stderr);
            metrics::record_engine_error(operation, kind.category());
            return Err(EngineError::Failed { kind, stderr });
        }

        Ok(output.stdout)
    }
}

/// Parse `--dump-single-json` output. Empty output or a JSON `null` means no record.
pub(crate) fn parse_metadata(stdout: &[u8]) -> Result<Option<RawInfo>, EngineError> {
    let text = String::from_utf8_lossy(stdout);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(serde_json::from_str::<Option<RawInfo>>(trimmed)?)
}

/// Last non-empty stdout line is the path printed after the final move.
pub(crate) fn parse_reported_path(stdout: &[u8]) -> Option<PathBuf> {
    String::from_utf8_lossy(stdout)
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(PathBuf::from)
}

#[async_trait]
impl ExtractionEngine for YtDlpEngine {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn resolve_metadata(&self, url: &str) -> Result<Option<RawInfo>, EngineError> {
        let args = self.metadata_args(url);
        let stdout = self.run("metadata", &args).await?;
        parse_metadata(&stdout)
    }

    async fn download(&self, job: &DownloadJob) -> Result<Option<PathBuf>, EngineError> {
        let args = self.download_args(job);
        let stdout = self.run("download", &args).await?;
        let reported = parse_reported_path(&stdout);
        match &reported {
            Some(path) => log::debug!("yt-dlp reported output file: {}", path.display()),
            None => log::debug!("yt-dlp did not report an output file"),
        }
        Ok(reported)
    }
}
