//! Format selection for the extraction engine.
//!
//! Maps a requested quality (or audio mode) to a yt-dlp format selector and
//! the post-processing the engine should apply.

use std::fmt;

use strum::{AsRefStr, EnumString};

use crate::core::config;

/// Video quality accepted by fetch requests.
///
/// Parsing never fails: anything that is not one of the fixed heights maps to
/// [`Quality::Default`], which selects the best streams with no ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
pub enum Quality {
    #[strum(serialize = "1080p")]
    P1080,
    #[strum(serialize = "720p")]
    P720,
    #[strum(serialize = "480p")]
    P480,
    #[strum(serialize = "360p")]
    P360,
    #[strum(serialize = "default")]
    Default,
}

impl Quality {
    /// Lenient parse; anything but an exact known label becomes `Default`.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or(Quality::Default)
    }

    /// Height ceiling for this quality, `None` for `Default`.
    pub fn max_height(&self) -> Option<u32> {
        match self {
            Quality::P1080 => Some(1080),
            Quality::P720 => Some(720),
            Quality::P480 => Some(480),
            Quality::P360 => Some(360),
            Quality::Default => None,
        }
    }
}

/// A yt-dlp `--format` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSelector(String);

impl FormatSelector {
    /// Best video and audio at or below the quality's height, else best overall
    /// at or below it. `Default` drops the ceiling.
    pub fn for_video(quality: Quality) -> Self {
        match quality.max_height() {
            Some(h) => Self(format!("bestvideo[height<={h}]+bestaudio/best[height<={h}]")),
            None => Self("bestvideo+bestaudio/best".to_string()),
        }
    }

    /// Best available audio.
    pub fn for_audio() -> Self {
        Self("bestaudio/best".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormatSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Post-processing the engine applies after downloading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostProcessing {
    /// Merge separate video/audio streams into this container.
    MergeInto { container: String },
    /// Extract the audio track and transcode it.
    ExtractAudio { codec: String, bitrate_kbps: u32 },
}

impl PostProcessing {
    pub fn video_merge() -> Self {
        PostProcessing::MergeInto {
            container: config::download::VIDEO_MERGE_FORMAT.to_string(),
        }
    }

    pub fn audio_extract() -> Self {
        PostProcessing::ExtractAudio {
            codec: config::download::AUDIO_CODEC.to_string(),
            bitrate_kbps: config::download::AUDIO_BITRATE_KBPS,
        }
    }

    /// Container/extension expected in the output, used when naming the
    /// delivered file if the artifact has no extension of its own.
    pub fn expected_extension(&self) -> &str {
        match self {
            PostProcessing::MergeInto { container } => container,
            PostProcessing::ExtractAudio { codec, .. } => codec,
        }
    }
}
