use serde_json::Value;
use thiserror::Error;

use crate::metadata::format_time;
use crate::search::candidate::{CandidateRecord, ResultSet, STANDALONE_RECORDING_LABEL};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response has no recording list")]
    MissingRecordings,
}

/// Parse a recording search response into an ordered candidate list.
///
/// Recordings carrying release and release-group data yield one candidate
/// per release element, in traversal order and without deduplication.
/// Recordings without a usable release fall back to a single standalone
/// candidate. Missing fields inside a recording never fail the parse; only
/// a missing top-level recording list does.
pub fn parse_recordings(root: &Value) -> Result<ResultSet, ParseError> {
    let recordings = root
        .get("recordings")
        .and_then(Value::as_array)
        .ok_or(ParseError::MissingRecordings)?;

    let mut records = Vec::new();
    let mut raw_nodes = Vec::with_capacity(recordings.len());

    for (index, node) in recordings.iter().enumerate() {
        let base = recording_candidate(node, index);
        match node.get("releases").and_then(Value::as_array) {
            Some(releases) if has_release_group(releases) => {
                for release in releases {
                    records.push(release_candidate(&base, release));
                }
            }
            _ => records.push(standalone_candidate(&base)),
        }
        raw_nodes.push(node.clone());
    }

    Ok(ResultSet::new(records, raw_nodes))
}

fn has_release_group(releases: &[Value]) -> bool {
    releases
        .first()
        .and_then(|release| release.get("release-group"))
        .is_some()
}

/// Fields shared by all candidates of one recording node.
fn recording_candidate(node: &Value, index: usize) -> CandidateRecord {
    let length_ms = node.get("length").and_then(Value::as_u64);
    CandidateRecord {
        recording_id: string_field(node, "id"),
        title: string_field(node, "title"),
        length: length_ms.map(format_time).unwrap_or_default(),
        length_ms,
        artist: artist_credit(node),
        source_index: index,
        ..CandidateRecord::default()
    }
}

fn release_candidate(base: &CandidateRecord, release: &Value) -> CandidateRecord {
    let mut candidate = base.clone();
    candidate.release_id = non_empty_string(release.get("id"));
    candidate.release = string_field(release, "title");
    candidate.date = string_field(release, "date");
    candidate.country = release_event_countries(release);

    let group = release.get("release-group");
    candidate.release_group_id = non_empty_string(group.and_then(|g| g.get("id")));
    candidate.release_type = group
        .and_then(|g| g.get("primary-type"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    candidate
}

fn standalone_candidate(base: &CandidateRecord) -> CandidateRecord {
    let mut candidate = base.clone();
    candidate.release = STANDALONE_RECORDING_LABEL.to_string();
    candidate
}

/// Comma-joined ISO country codes across the release's events. An event
/// without an area code contributes nothing.
fn release_event_countries(release: &Value) -> String {
    let Some(events) = release.get("release-events").and_then(Value::as_array) else {
        return String::new();
    };
    let codes: Vec<&str> = events
        .iter()
        .filter_map(|event| {
            event
                .get("area")?
                .get("iso-3166-1-codes")?
                .as_array()?
                .first()?
                .as_str()
        })
        .collect();
    codes.join(", ")
}

/// Join the artist credit the way it is meant to be displayed: each credit
/// name followed by its join phrase.
fn artist_credit(node: &Value) -> String {
    let Some(credits) = node.get("artist-credit").and_then(Value::as_array) else {
        return String::new();
    };
    let mut out = String::new();
    for credit in credits {
        if let Some(name) = credit.get("name").and_then(Value::as_str) {
            out.push_str(name);
        } else if let Some(name) = credit
            .get("artist")
            .and_then(|artist| artist.get("name"))
            .and_then(Value::as_str)
        {
            out.push_str(name);
        }
        if let Some(join) = credit.get("joinphrase").and_then(Value::as_str) {
            out.push_str(join);
        }
    }
    out
}

fn string_field(node: &Value, key: &str) -> String {
    node.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
