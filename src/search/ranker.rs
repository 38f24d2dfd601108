use std::cmp::Ordering;

use unaccent::unaccent;

use crate::metadata::{ComparisonWeights, TrackMetadata};
use crate::search::candidate::CandidateRecord;

/// Length difference at which two durations stop being considered similar
/// at all.
const LENGTH_CAP_MS: u64 = 30_000;

/// Per-field closeness between a local file and a candidate, each part in
/// [0, 1].
pub trait FieldComparator {
    fn text(&self, a: &str, b: &str) -> f64;
    fn length(&self, a_ms: u64, b_ms: u64) -> f64;
}

/// Jaro-Winkler over diacritic-folded lowercase text; capped linear delta
/// for durations.
#[derive(Debug, Clone, Copy, Default)]
pub struct JaroWinklerComparator;

impl FieldComparator for JaroWinklerComparator {
    fn text(&self, a: &str, b: &str) -> f64 {
        jaro_winkler::jaro_winkler(&fold(a), &fold(b))
    }

    fn length(&self, a_ms: u64, b_ms: u64) -> f64 {
        let delta = a_ms.abs_diff(b_ms).min(LENGTH_CAP_MS);
        1.0 - delta as f64 / LENGTH_CAP_MS as f64
    }
}

fn fold(s: &str) -> String {
    unaccent(s).to_lowercase().trim().to_string()
}

/// Reorder candidates by descending similarity to the file's metadata.
///
/// Pure permutation of the input: nothing is added or dropped, and equal
/// scores keep their original relative order.
pub fn rank(
    local: &TrackMetadata,
    weights: &ComparisonWeights,
    comparator: &dyn FieldComparator,
    candidates: Vec<CandidateRecord>,
) -> Vec<CandidateRecord> {
    let mut scored: Vec<(f64, CandidateRecord)> = candidates
        .into_iter()
        .map(|candidate| (score(local, weights, comparator, &candidate), candidate))
        .collect();

    // Stable sort, so ties preserve input order
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    scored.into_iter().map(|(_, candidate)| candidate).collect()
}

/// Weighted similarity in [0, 1]. Fields empty on either side are left out
/// of the combination entirely rather than counted as mismatches.
pub fn score(
    local: &TrackMetadata,
    weights: &ComparisonWeights,
    comparator: &dyn FieldComparator,
    candidate: &CandidateRecord,
) -> f64 {
    let mut total = 0.0;
    let mut weight_sum = 0.0;

    for (weight, a, b) in [
        (weights.title, &local.title, &candidate.title),
        (weights.artist, &local.artist, &candidate.artist),
        (weights.album, &local.album, &candidate.release),
    ] {
        if !a.is_empty() && !b.is_empty() {
            total += weight * comparator.text(a, b);
            weight_sum += weight;
        }
    }

    if let (Some(local_ms), Some(candidate_ms)) = (local.duration_ms, candidate.length_ms) {
        total += weights.length * comparator.length(local_ms, candidate_ms);
        weight_sum += weights.length;
    }

    if weight_sum == 0.0 {
        return 0.0;
    }
    total / weight_sum
}
