//! Poly metadata client
//!
//! The resolver only needs "give me the records for this item"; the HTTP
//! client below is the production implementation and tests substitute their
//! own.

use super::types::{AssetEndpoints, AssetError, PolyRecord};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Remote metadata lookup for item identifiers.
#[async_trait]
pub trait PolyLookup: Send + Sync {
    /// Fetch every record the service holds for `item_id`. Exactly one
    /// network round-trip, never retried.
    async fn fetch_poly(&self, item_id: &str) -> Result<Vec<PolyRecord>, AssetError>;
}

/// Decode a lookup body. Empty or malformed bodies are decode errors.
pub fn parse_poly_records(body: &[u8]) -> Result<Vec<PolyRecord>, AssetError> {
    serde_json::from_slice(body).map_err(|e| AssetError::Decode { reason: e.to_string() })
}

/// reqwest-backed [`PolyLookup`] with a bounded per-lookup timeout.
#[derive(Debug, Clone)]
pub struct HttpPolyClient {
    client: Client,
    endpoints: AssetEndpoints,
}

impl HttpPolyClient {
    pub fn new(endpoints: AssetEndpoints, timeout: Duration) -> Result<Self, AssetError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("thumbnail-renderer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AssetError::Transport {
                reason: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, endpoints })
    }
}

#[async_trait]
impl PolyLookup for HttpPolyClient {
    async fn fetch_poly(&self, item_id: &str) -> Result<Vec<PolyRecord>, AssetError> {
        let url = self.endpoints.poly_url(item_id);
        debug!("Fetching poly data for item {}: {}", item_id, url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("API returned non-success status for item {}: {}", item_id, status);
            return Err(AssetError::Status { status: status.as_u16() });
        }

        let body = response.bytes().await?;
        parse_poly_records(&body)
    }
}
