use std::num::NonZeroU32;
use std::sync::{Arc, OnceLock};

use color_eyre::Result;
use color_eyre::eyre::Context;
use governor::{
    Quota, RateLimiter, clock::DefaultClock, state::InMemoryState, state::direct::NotKeyed,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::ports::catalog::{CatalogClient, CatalogError};
use crate::search::query::QueryTemplate;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

const DEFAULT_BASE_URL: &str = "https://musicbrainz.org/ws/2";

const USER_AGENT: &str = concat!("track-search/", env!("CARGO_PKG_VERSION"));

// MusicBrainz allows one request per second per client
static RATE_LIMITER: OnceLock<Arc<DirectRateLimiter>> = OnceLock::new();

fn rate_limiter() -> &'static Arc<DirectRateLimiter> {
    RATE_LIMITER.get_or_init(|| {
        let quota = Quota::per_second(NonZeroU32::new(1).unwrap());
        Arc::new(RateLimiter::direct(quota))
    })
}

/// MusicBrainz WS/2 recording search.
///
/// Returns raw JSON response roots; parsing them into candidates is the
/// search layer's job.
pub struct MusicBrainzClient {
    client: reqwest::Client,
    base_url: String,
}

impl MusicBrainzClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .wrap_err("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    async fn request(&self, query: &str, limit: u32) -> Result<Value, CatalogError> {
        rate_limiter().until_ready().await;

        let url = format!("{}/recording", self.base_url);
        debug!(%query, limit, "MusicBrainz recording search");
        let limit = limit.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[("query", query), ("limit", limit.as_str()), ("fmt", "json")])
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(%status, %body, "MusicBrainz error response");
            return Err(CatalogError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let root: Value = response.json().await?;
        if let Some(message) = root.get("error").and_then(Value::as_str) {
            warn!(message, "MusicBrainz reported an error");
            return Err(CatalogError::Service(message.to_string()));
        }
        Ok(root)
    }
}

#[async_trait::async_trait]
impl CatalogClient for MusicBrainzClient {
    async fn find_tracks(&self, query: &str, limit: u32) -> Result<Value, CatalogError> {
        self.request(query, limit).await
    }

    async fn find_tracks_structured(
        &self,
        template: &QueryTemplate,
        limit: u32,
    ) -> Result<Value, CatalogError> {
        // The search endpoint only speaks Lucene expressions, so the
        // structured field set renders to one regardless of what the
        // search box shows
        self.request(&template.render(true), limit).await
    }
}
