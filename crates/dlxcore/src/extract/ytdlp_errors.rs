//! yt-dlp error analysis
//!
//! Classifies yt-dlp stderr into coarse categories used for logging,
//! metrics labels and the short message shown to API callers.

/// yt-dlp error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YtDlpErrorType {
    /// Cookies are invalid or expired
    InvalidCookies,
    /// The site flagged the request as a bot
    BotDetection,
    /// Media is unavailable (private, removed, geo-blocked)
    VideoUnavailable,
    /// Unsupported or malformed URL
    UnsupportedUrl,
    /// Network problems (timeouts, connection)
    NetworkError,
    /// Anything else
    Unknown,
}

impl YtDlpErrorType {
    /// Label used in metrics
    pub fn category(&self) -> &'static str {
        match self {
            YtDlpErrorType::InvalidCookies => "invalid_cookies",
            YtDlpErrorType::BotDetection => "bot_detection",
            YtDlpErrorType::VideoUnavailable => "video_unavailable",
            YtDlpErrorType::UnsupportedUrl => "unsupported_url",
            YtDlpErrorType::NetworkError => "network",
            YtDlpErrorType::Unknown => "ytdlp_unknown",
        }
    }
}

/// Analyze yt-dlp stderr and determine the error type
pub fn analyze_ytdlp_error(stderr: &str) -> YtDlpErrorType {
    let stderr_lower = stderr.to_lowercase();

    if stderr_lower.contains("cookies are no longer valid")
        || stderr_lower.contains("cookies have likely been rotated")
        || stderr_lower.contains("use --cookies-from-browser")
        || stderr_lower.contains("use --cookies for the authentication")
    {
        return YtDlpErrorType::InvalidCookies;
    }

    if stderr_lower.contains("sign in to confirm you're not a bot")
        || stderr_lower.contains("bot detection")
        || stderr_lower.contains("http error 403")
        || stderr_lower.contains("http error 429")
    {
        return YtDlpErrorType::BotDetection;
    }

    if stderr_lower.contains("private video")
        || stderr_lower.contains("video unavailable")
        || stderr_lower.contains("this video is not available")
        || stderr_lower.contains("video has been removed")
        || stderr_lower.contains("this video does not exist")
        || stderr_lower.contains("not available in your country")
    {
        return YtDlpErrorType::VideoUnavailable;
    }

    if stderr_lower.contains("unsupported url") || stderr_lower.contains("is not a valid url") {
        return YtDlpErrorType::UnsupportedUrl;
    }

    if stderr_lower.contains("timed out")
        || stderr_lower.contains("timeout")
        || stderr_lower.contains("connection")
        || stderr_lower.contains("network")
        || stderr_lower.contains("name resolution")
        || stderr_lower.contains("failed to connect")
    {
        return YtDlpErrorType::NetworkError;
    }

    YtDlpErrorType::Unknown
}

/// Short caller-facing message for an error type
pub fn get_error_message(error_type: &YtDlpErrorType) -> &'static str {
    match error_type {
        YtDlpErrorType::InvalidCookies => "The source requires authentication; try again later",
        YtDlpErrorType::BotDetection => "The source blocked the request; try again later",
        YtDlpErrorType::VideoUnavailable => "Media is unavailable (private, removed or region-locked)",
        YtDlpErrorType::UnsupportedUrl => "Unsupported URL",
        YtDlpErrorType::NetworkError => "Network problem while contacting the source",
        YtDlpErrorType::Unknown => "Failed to process the link; check that it is correct",
    }
}
