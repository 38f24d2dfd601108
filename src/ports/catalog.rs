use serde_json::Value;
use thiserror::Error;

use crate::search::query::QueryTemplate;

/// Errors from the remote catalog transport.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("catalog returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("catalog reported an error: {0}")]
    Service(String),
}

/// Port trait wrapping the catalog search capability used by the dialog.
///
/// Implementations live in `musicbrainz` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// Search recordings with a free-text query as typed by the user.
    /// Returns the raw response root; parsing it is the caller's job.
    async fn find_tracks(&self, query: &str, limit: u32) -> Result<Value, CatalogError>;

    /// Search recordings with a structured field set. Every non-empty
    /// field is submitted, independent of how the query is displayed.
    async fn find_tracks_structured(
        &self,
        template: &QueryTemplate,
        limit: u32,
    ) -> Result<Value, CatalogError>;
}
