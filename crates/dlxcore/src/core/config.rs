use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration constants for the service

/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Download folder path
/// Read from DOWNLOAD_FOLDER environment variable
/// Defaults to ./downloads, supports tilde (~) expansion
pub static DOWNLOAD_FOLDER: Lazy<String> =
    Lazy::new(|| env::var("DOWNLOAD_FOLDER").unwrap_or_else(|_| "downloads".to_string()));

/// Path to cookies file passed to yt-dlp
/// Read from YTDL_COOKIES_FILE environment variable
pub static YTDL_COOKIES_FILE: Lazy<Option<String>> = Lazy::new(|| non_empty_var("YTDL_COOKIES_FILE"));

/// Proxy URL passed to yt-dlp (e.g. socks5://127.0.0.1:40000)
/// Read from YTDL_PROXY environment variable
pub static YTDL_PROXY: Lazy<Option<String>> = Lazy::new(|| non_empty_var("YTDL_PROXY"));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: app.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "app.log".to_string()));

/// Log level (error, warn, info, debug, trace)
/// Read from LOG_LEVEL environment variable
/// Default: info
pub static LOG_LEVEL: Lazy<String> = Lazy::new(|| env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Expand `~` in a configured path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

/// HTTP server configuration
pub mod server {
    use once_cell::sync::Lazy;
    use std::env;

    /// Port for the API server
    /// Read from PORT environment variable
    /// Default: 8080
    pub static PORT: Lazy<u16> = Lazy::new(|| env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8080));

    /// Interface to bind
    /// Read from BIND_ADDR environment variable
    /// Default: 0.0.0.0
    pub static BIND_ADDR: Lazy<String> =
        Lazy::new(|| env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()));

    /// Service name reported by the liveness endpoint
    pub const SERVICE_NAME: &str = "VideoDlx API";
}

/// Download configuration
pub mod download {
    use super::Duration;
    use once_cell::sync::Lazy;
    use std::env;

    /// Default timeout for yt-dlp commands (in seconds)
    pub const DEFAULT_YTDLP_TIMEOUT_SECS: u64 = 600;

    /// Timeout for yt-dlp commands
    /// Read from YTDLP_TIMEOUT_SECS environment variable
    pub static YTDLP_TIMEOUT_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("YTDLP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_YTDLP_TIMEOUT_SECS)
    });

    /// Container requested when merging video and audio streams
    pub const VIDEO_MERGE_FORMAT: &str = "mp4";

    /// Codec for audio extraction
    pub const AUDIO_CODEC: &str = "mp3";

    /// Target bitrate for audio extraction (kbps)
    pub const AUDIO_BITRATE_KBPS: u32 = 192;

    /// Quality used by the API when the caller sends none
    pub const DEFAULT_QUALITY: &str = "720p";

    /// yt-dlp command timeout duration
    pub fn ytdlp_timeout() -> Duration {
        Duration::from_secs(*YTDLP_TIMEOUT_SECS)
    }
}

/// Normalizer configuration
pub mod renditions {
    /// Maximum number of renditions returned by resolve
    pub const MAX_RENDITIONS: usize = 6;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_plain() {
        assert_eq!(expand_path("downloads"), PathBuf::from("downloads"));
    }

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path("~/downloads");
        assert!(expanded.ends_with("downloads"));
    }

    #[test]
    fn test_ytdlp_timeout_positive() {
        assert!(download::ytdlp_timeout() > Duration::ZERO);
    }
}
