//! TTL cache in front of the yields provider.
//!
//! Holds the last successfully fetched, allow-listed record set. Expired
//! entries are still served when the provider fails, so a transient outage
//! only means stale data.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use lst_insight_core::models::PoolRecord;

use crate::allowlist;
use crate::error::IngestError;
use crate::provider::PoolProvider;

struct Entry {
    records: Arc<Vec<PoolRecord>>,
    fetched_at: Instant,
}

/// Allow-listed pool records with time-based expiry.
///
/// The entry sits behind an async mutex that is held across the remote
/// call, so concurrent callers on an expired entry share one refresh.
pub struct IngestionCache {
    provider: Arc<dyn PoolProvider>,
    ttl: Duration,
    deadline: Duration,
    entry: Mutex<Option<Entry>>,
}

impl IngestionCache {
    pub fn new(provider: Arc<dyn PoolProvider>, ttl: Duration, deadline: Duration) -> Self {
        Self {
            provider,
            ttl,
            deadline,
            entry: Mutex::new(None),
        }
    }

    /// Current records, refreshed from the provider when expired or forced.
    ///
    /// Fails only when the provider fails and nothing was ever cached.
    pub async fn fetch(&self, force_refresh: bool) -> Result<Arc<Vec<PoolRecord>>, IngestError> {
        let mut entry = self.entry.lock().await;

        if !force_refresh {
            if let Some(e) = entry.as_ref() {
                if e.fetched_at.elapsed() < self.ttl {
                    debug!(records = e.records.len(), "serving cached pools");
                    return Ok(Arc::clone(&e.records));
                }
            }
        }

        match self.pull().await {
            Ok(records) => {
                info!(records = records.len(), forced = force_refresh, "refreshed pool cache");
                let records = Arc::new(records);
                *entry = Some(Entry {
                    records: Arc::clone(&records),
                    fetched_at: Instant::now(),
                });
                Ok(records)
            }
            Err(err) => match entry.as_ref() {
                Some(e) => {
                    warn!(error = %err, records = e.records.len(), "provider failed, serving stale pools");
                    Ok(Arc::clone(&e.records))
                }
                None => Err(IngestError::UpstreamUnavailable(err.to_string())),
            },
        }
    }

    /// Like [`fetch`](Self::fetch), but an unavailable upstream yields an
    /// empty set instead of an error.
    pub async fn fetch_or_empty(&self, force_refresh: bool) -> Arc<Vec<PoolRecord>> {
        match self.fetch(force_refresh).await {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "no pool data available");
                Arc::new(Vec::new())
            }
        }
    }

    async fn pull(&self) -> Result<Vec<PoolRecord>, IngestError> {
        let pools = tokio::time::timeout(self.deadline, self.provider.list_pools())
            .await
            .map_err(|_| IngestError::Timeout(self.deadline.as_secs()))??;
        let total = pools.len();
        let kept = allowlist::filter(pools);
        debug!(total, kept = kept.len(), "applied project allow-list");
        Ok(kept)
    }
}
