pub mod candidate;
pub mod parser;
pub mod query;
pub mod ranker;
pub mod reconciler;

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::metadata::{ComparisonWeights, TrackMetadata};
use crate::ports::catalog::{CatalogClient, CatalogError};
use crate::ports::library::{LibraryOps, ReconcileError};
use crate::search::candidate::ResultSet;
use crate::search::parser::parse_recordings;
use crate::search::query::QueryTemplate;
use crate::search::ranker::{JaroWinklerComparator, rank};
use crate::search::reconciler::{ReconciliationContext, commit_selection};

/// Shown when the catalog request itself failed.
pub const FETCH_FAILED_MESSAGE: &str =
    "Unable to fetch results. Close the dialog and try again. See debug logs for more details.";

/// Shown when the catalog returned nothing usable.
pub const NO_RESULTS_MESSAGE: &str = "No results found. Please try a different search query.";

const DEFAULT_LIMIT: u32 = 25;

/// What the dialog shell should currently render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Request in flight; selection and accept stay disabled.
    InFlight,
    /// Rows available for selection.
    Results,
    NoResults { message: &'static str },
    FetchFailed { message: &'static str },
}

/// Non-widget state of one track-search dialog.
///
/// Owns the current result set, which is replaced on every search. A reply
/// that lands after a newer search was issued still renders; the last
/// writer to the result view wins.
pub struct SearchSession {
    client: Arc<dyn CatalogClient>,
    file: Option<TrackMetadata>,
    context: ReconciliationContext,
    advanced_syntax: bool,
    limit: u32,
    weights: ComparisonWeights,
    state: SessionState,
    results: Option<ResultSet>,
}

impl SearchSession {
    /// A session for a plain search with no file attached.
    pub fn new(client: Arc<dyn CatalogClient>, advanced_syntax: bool) -> Self {
        Self {
            client,
            file: None,
            context: ReconciliationContext::detached(),
            advanced_syntax,
            limit: DEFAULT_LIMIT,
            weights: ComparisonWeights::default(),
            state: SessionState::Idle,
            results: None,
        }
    }

    /// A session opened from a file: results are ranked against its
    /// metadata and a selection may move it between albums.
    pub fn for_file(
        client: Arc<dyn CatalogClient>,
        advanced_syntax: bool,
        metadata: TrackMetadata,
        context: ReconciliationContext,
    ) -> Self {
        let mut session = Self::new(client, advanced_syntax);
        session.file = Some(metadata);
        session.context = context;
        session
    }

    pub fn set_limit(&mut self, limit: u32) {
        self.limit = limit;
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn results(&self) -> Option<&ResultSet> {
        self.results.as_ref()
    }

    /// Free-text search as typed into the search box.
    pub async fn search(&mut self, text: &str) {
        self.state = SessionState::InFlight;
        self.results = None;
        debug!(query = text, limit = self.limit, "searching catalog");
        let reply = self.client.find_tracks(text, self.limit).await;
        self.handle_reply(reply);
    }

    /// Search using the file's tags as a structured field set. Every
    /// non-empty field is submitted; the advanced-syntax flag only changes
    /// the returned display query. `None` when the session has no file.
    pub async fn search_similar(&mut self) -> Option<String> {
        let template = QueryTemplate::from_metadata(self.file.as_ref()?);
        let rendered = template.render(self.advanced_syntax);

        self.state = SessionState::InFlight;
        self.results = None;
        debug!(query = %rendered, limit = self.limit, "searching catalog for similar tracks");
        let reply = self
            .client
            .find_tracks_structured(&template, self.limit)
            .await;
        self.handle_reply(reply);
        Some(rendered)
    }

    /// Route one catalog reply into the session state.
    pub fn handle_reply(&mut self, reply: Result<Value, CatalogError>) {
        let root = match reply {
            Ok(root) => root,
            Err(err) => {
                warn!(error = %err, "catalog request failed");
                self.state = SessionState::FetchFailed {
                    message: FETCH_FAILED_MESSAGE,
                };
                return;
            }
        };

        let mut set = match parse_recordings(&root) {
            Ok(set) => set,
            Err(err) => {
                debug!(error = %err, "response had no recording list");
                self.state = SessionState::NoResults {
                    message: NO_RESULTS_MESSAGE,
                };
                return;
            }
        };
        if set.is_empty() {
            self.state = SessionState::NoResults {
                message: NO_RESULTS_MESSAGE,
            };
            return;
        }

        if let Some(metadata) = &self.file {
            set.records = rank(
                metadata,
                &self.weights,
                &JaroWinklerComparator,
                std::mem::take(&mut set.records),
            );
        }

        debug!(count = set.len(), "search results ready");
        self.results = Some(set);
        self.state = SessionState::Results;
    }

    /// Commit the chosen row against the library. On failure the result
    /// set and state are left intact so another row can be picked.
    pub fn choose_row(
        &self,
        row: usize,
        library: &mut dyn LibraryOps,
    ) -> Result<(), ReconcileError> {
        let results = self.results.as_ref().ok_or(ReconcileError::NoResults)?;
        let record = results.record(row).ok_or(ReconcileError::InvalidRow(row))?;
        let raw_node = results.raw_node(record.source_index);
        commit_selection(record, raw_node, &self.context, library)
    }
}
