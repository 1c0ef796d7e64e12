//! Metadata normalization: engine output to the stable response shape.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::config::renditions::MAX_RENDITIONS;
use crate::extract::{RawFormat, RawInfo};

/// Fallback for missing title and source site.
pub const UNKNOWN: &str = "Unknown";

/// One selectable rendition, keyed by height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenditionSummary {
    /// `"<height>p"`
    pub quality: String,
    pub format_id: String,
    /// Bytes, 0 when unknown
    pub filesize: u64,
}

/// Canonical metadata returned by resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub title: String,
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: String,
    #[serde(rename = "duration")]
    pub duration_seconds: u64,
    #[serde(rename = "formats")]
    pub renditions: Vec<RenditionSummary>,
    #[serde(rename = "url")]
    pub source_url: String,
    #[serde(rename = "source")]
    pub source_site: String,
}

impl MediaInfo {
    /// Build from an engine record, filling defaults for missing fields.
    pub fn from_raw(source_url: &str, raw: RawInfo) -> Self {
        Self {
            title: raw.title.unwrap_or_else(|| UNKNOWN.to_string()),
            thumbnail_url: raw.thumbnail.unwrap_or_default(),
            duration_seconds: duration_secs(raw.duration),
            renditions: normalize(&raw.formats),
            source_url: source_url.to_string(),
            source_site: raw.extractor.unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }
}

/// Truncate to whole seconds; negative, NaN and missing become 0.
fn duration_secs(duration: Option<f64>) -> u64 {
    match duration {
        Some(d) if d.is_finite() && d > 0.0 => d.trunc() as u64,
        _ => 0,
    }
}

/// Height of a video format worth listing, `None` for audio-only or heightless ones.
fn eligible_height(format: &RawFormat) -> Option<u32> {
    let height = format.height.filter(|h| *h > 0)?;
    if format.vcodec.as_deref() == Some("none") {
        return None;
    }
    Some(height)
}

/// Reduce raw formats to at most [`MAX_RENDITIONS`] video renditions, one per
/// height, tallest first.
///
/// When several formats share a height the first in source order is kept.
pub fn normalize(formats: &[RawFormat]) -> Vec<RenditionSummary> {
    let mut seen = HashSet::new();
    let mut picked: Vec<(u32, &RawFormat)> = formats
        .iter()
        .filter_map(|f| eligible_height(f).map(|h| (h, f)))
        .filter(|(h, _)| seen.insert(*h))
        .collect();

    picked.sort_by(|a, b| b.0.cmp(&a.0));

    picked
        .into_iter()
        .take(MAX_RENDITIONS)
        .map(|(height, f)| RenditionSummary {
            quality: format!("{}p", height),
            format_id: f.format_id.clone(),
            filesize: f.filesize.unwrap_or(0),
        })
        .collect()
}
