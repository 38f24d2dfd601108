use serde::{Deserialize, Serialize};

use crate::metadata::TrackMetadata;

/// Structured query derived from a file's existing tags for a
/// similar-track lookup.
///
/// Renders either as the bare track title or, with advanced syntax on, as
/// `field:(value)` clauses in a fixed field order with empty fields
/// omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueryTemplate {
    pub track: Option<String>,
    pub artist: Option<String>,
    pub release: Option<String>,
    pub tnum: Option<String>,
    pub tracks: Option<String>,
    pub qdur: Option<String>,
    pub isrc: Option<String>,
}

impl QueryTemplate {
    pub fn from_metadata(metadata: &TrackMetadata) -> Self {
        Self {
            track: non_empty(&metadata.title),
            artist: non_empty(&metadata.artist),
            release: non_empty(&metadata.album),
            tnum: metadata.track_number.map(|n| n.to_string()),
            tracks: metadata.total_tracks.map(|n| n.to_string()),
            // Coarse duration bucket, tolerant of encoding-length variance
            qdur: metadata.duration_ms.map(|ms| (ms / 2000).to_string()),
            isrc: metadata.isrc.as_deref().and_then(non_empty),
        }
    }

    pub fn render(&self, advanced: bool) -> String {
        if !advanced {
            return self.track.clone().unwrap_or_default();
        }

        let mut parts = Vec::new();
        for (field, value) in [
            ("track", &self.track),
            ("artist", &self.artist),
            ("release", &self.release),
            ("tnum", &self.tnum),
            ("tracks", &self.tracks),
            ("qdur", &self.qdur),
            ("isrc", &self.isrc),
        ] {
            if let Some(value) = value
                && !value.is_empty()
            {
                parts.push(format!("{field}:({value})"));
            }
        }
        parts.join(" ")
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advanced_render_omits_empty_fields() {
        let template = QueryTemplate {
            track: Some("Hello".into()),
            artist: Some("".into()),
            release: Some("World".into()),
            qdur: Some("120".into()),
            ..QueryTemplate::default()
        };
        assert_eq!(template.render(true), "track:(Hello) release:(World) qdur:(120)");
    }

    #[test]
    fn test_plain_render_is_just_the_track_title() {
        let template = QueryTemplate {
            track: Some("Hello".into()),
            artist: Some("Adele".into()),
            release: Some("25".into()),
            ..QueryTemplate::default()
        };
        assert_eq!(template.render(false), "Hello");
    }

    #[test]
    fn test_plain_render_without_title_is_empty() {
        assert_eq!(QueryTemplate::default().render(false), "");
    }

    #[test]
    fn test_advanced_render_of_empty_template_is_empty() {
        assert_eq!(QueryTemplate::default().render(true), "");
    }

    #[test]
    fn test_from_metadata() {
        let metadata = TrackMetadata {
            title: "Hello".into(),
            artist: "Adele".into(),
            album: "25".into(),
            track_number: Some(1),
            total_tracks: Some(11),
            duration_ms: Some(295_000),
            isrc: Some("GBUM71505078".into()),
        };

        let template = QueryTemplate::from_metadata(&metadata);
        assert_eq!(template.qdur.as_deref(), Some("147"));
        assert_eq!(
            template.render(true),
            "track:(Hello) artist:(Adele) release:(25) tnum:(1) tracks:(11) \
             qdur:(147) isrc:(GBUM71505078)"
        );
    }

    #[test]
    fn test_from_metadata_with_empty_tags() {
        let template = QueryTemplate::from_metadata(&TrackMetadata::default());
        assert_eq!(template, QueryTemplate::default());
        assert_eq!(template.render(true), "");
    }
}
