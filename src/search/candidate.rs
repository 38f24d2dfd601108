use serde_json::Value;

/// Release title shown for recordings that belong to no release.
pub const STANDALONE_RECORDING_LABEL: &str = "Standalone Recording";

/// One catalog search hit, flattened into the columns the dialog shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateRecord {
    pub recording_id: String,
    /// Absent exactly when the hit is a standalone (non-album) recording.
    pub release_id: Option<String>,
    pub release_group_id: Option<String>,

    pub title: String,
    /// Pre-formatted `m:ss` length for display.
    pub length: String,
    /// Raw recording length, kept for similarity scoring.
    pub length_ms: Option<u64>,
    pub artist: String,
    pub release: String,
    pub date: String,
    pub country: String,
    pub release_type: String,

    /// Index of the originating recording node in [`ResultSet::raw_node`].
    pub source_index: usize,
}

impl CandidateRecord {
    pub fn is_standalone(&self) -> bool {
        self.release_id.is_none()
    }
}

/// Parsed candidates plus the raw recording nodes they came from.
///
/// The raw nodes outlive the table rows because committing a standalone
/// candidate hands its originating node back to the library. The whole set
/// is replaced on every search and dropped when the dialog closes.
#[derive(Debug, Default)]
pub struct ResultSet {
    pub records: Vec<CandidateRecord>,
    raw_nodes: Vec<Value>,
}

impl ResultSet {
    pub fn new(records: Vec<CandidateRecord>, raw_nodes: Vec<Value>) -> Self {
        Self { records, raw_nodes }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, row: usize) -> Option<&CandidateRecord> {
        self.records.get(row)
    }

    pub fn raw_node(&self, index: usize) -> Option<&Value> {
        self.raw_nodes.get(index)
    }
}
