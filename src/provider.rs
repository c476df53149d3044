//! Yields provider client.
//!
//! The [`PoolProvider`] trait is the seam between the pipeline and the
//! remote yields service. [`LlamaProvider`] talks to a DefiLlama-style API
//! over `reqwest`; tests substitute their own implementation.
//!
//! # Endpoints
//!
//! | Call | Request | Accepted payloads |
//! |------|---------|-------------------|
//! | [`list_pools`](PoolProvider::list_pools) | `GET {base}/pools` | bare array, or `{"data": [...]}` |
//! | [`pool_history`](PoolProvider::pool_history) | `GET {base}/chart/{pool}` | `{"status": "success", "data": [...]}` |

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use lst_insight_core::models::{HistoricalPoint, PoolRecord};

use crate::config::ProviderConfig;
use crate::error::IngestError;

/// Source of pool records and pool history.
#[async_trait]
pub trait PoolProvider: Send + Sync {
    /// Every pool the provider knows about, unfiltered.
    async fn list_pools(&self) -> Result<Vec<PoolRecord>, IngestError>;

    /// Historical snapshots for one pool id.
    async fn pool_history(&self, pool_id: &str) -> Result<Vec<HistoricalPoint>, IngestError>;
}

/// `/pools` comes back either bare or wrapped in `data`. Entries are
/// decoded one by one so a single bad entry cannot sink the payload.
#[derive(Deserialize)]
#[serde(untagged)]
enum PoolsResponse {
    Bare(Vec<serde_json::Value>),
    Wrapped { data: Vec<serde_json::Value> },
}

#[derive(Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Decode a `/pools` body.
///
/// The payload shape must be valid; entries that are not pool objects or
/// carry no project are skipped.
pub fn parse_pools(body: &str) -> Result<Vec<PoolRecord>, IngestError> {
    let parsed: PoolsResponse = serde_json::from_str(body)
        .map_err(|_| IngestError::Decode("expected a pool array or {\"data\": [...]}".to_string()))?;
    let entries = match parsed {
        PoolsResponse::Bare(entries) => entries,
        PoolsResponse::Wrapped { data } => data,
    };

    let total = entries.len();
    let pools: Vec<PoolRecord> = entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<PoolRecord>(entry) {
            Ok(pool) if !pool.project.is_empty() => Some(pool),
            Ok(_) => None,
            Err(err) => {
                debug!(error = %err, "skipping malformed pool entry");
                None
            }
        })
        .collect();

    let skipped = total - pools.len();
    if skipped > 0 {
        warn!(skipped, total, "dropped unusable pool entries");
    }
    Ok(pools)
}

/// Decode a `/chart/{pool}` body.
pub fn parse_history(body: &str) -> Result<Vec<HistoricalPoint>, IngestError> {
    let parsed: HistoryResponse =
        serde_json::from_str(body).map_err(|e| IngestError::Decode(e.to_string()))?;
    if parsed.status != "success" {
        return Err(IngestError::Decode(format!(
            "history status was '{}'",
            parsed.status
        )));
    }
    if !parsed.data.is_array() {
        return Err(IngestError::Decode("history data is not an array".to_string()));
    }
    serde_json::from_value(parsed.data).map_err(|e| IngestError::Decode(e.to_string()))
}

/// HTTP client for a DefiLlama-compatible yields API.
pub struct LlamaProvider {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl LlamaProvider {
    pub fn new(config: &ProviderConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, IngestError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::Status(status.as_u16()));
        }

        response.text().await.map_err(|e| self.classify(e))
    }

    fn classify(&self, e: reqwest::Error) -> IngestError {
        if e.is_timeout() {
            IngestError::Timeout(self.timeout_secs)
        } else {
            e.into()
        }
    }
}

#[async_trait]
impl PoolProvider for LlamaProvider {
    async fn list_pools(&self) -> Result<Vec<PoolRecord>, IngestError> {
        let body = self.get_text(&format!("{}/pools", self.base_url)).await?;
        parse_pools(&body)
    }

    async fn pool_history(&self, pool_id: &str) -> Result<Vec<HistoricalPoint>, IngestError> {
        if pool_id.is_empty() {
            return Err(IngestError::Decode("empty pool id".to_string()));
        }
        let body = self
            .get_text(&format!("{}/chart/{}", self.base_url, pool_id))
            .await?;
        parse_history(&body)
    }
}
