use std::path::Path;

use audiotags::Tag;
use color_eyre::Result;
use color_eyre::eyre::Context;

/// Metadata of a local audio file, as read from its existing tags.
///
/// These are the fields a similar-track lookup is built from; anything the
/// tags don't carry stays empty and is simply omitted from the query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub track_number: Option<u32>,
    pub total_tracks: Option<u32>,
    pub duration_ms: Option<u64>,
    pub isrc: Option<String>,
}

impl TrackMetadata {
    /// Read metadata from a file's tags
    pub fn from_file(path: &Path) -> Result<Self> {
        let tag = Tag::new()
            .read_from_path(path)
            .wrap_err_with(|| format!("Failed to read tags from {}", path.display()))?;

        Ok(Self {
            title: tag.title().unwrap_or_default().to_string(),
            artist: tag.artist().unwrap_or_default().to_string(),
            album: tag.album_title().unwrap_or_default().to_string(),
            track_number: tag.track_number().map(u32::from),
            total_tracks: tag.total_tracks().map(u32::from),
            duration_ms: tag.duration().map(|secs| (secs * 1000.0) as u64),
            // Not exposed by audiotags
            isrc: None,
        })
    }
}

/// Relative importance of each field when ranking candidates against a
/// file's metadata. Weighted parts are combined into a score in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonWeights {
    pub title: f64,
    pub artist: f64,
    pub album: f64,
    pub length: f64,
}

impl Default for ComparisonWeights {
    fn default() -> Self {
        Self {
            title: 13.0,
            artist: 4.0,
            album: 5.0,
            length: 10.0,
        }
    }
}

/// Format a millisecond duration as `m:ss` for display.
pub fn format_time(ms: u64) -> String {
    let secs = (ms + 500) / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}
