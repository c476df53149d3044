//! Historical enrichment of pool records.
//!
//! Each record's history is fetched as its own task. A failed fetch leaves
//! that record with an empty history and never affects the others.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use lst_insight_core::models::{HistoricalPoint, PoolRecord, PoolWithHistory};

use crate::provider::PoolProvider;

/// History for one record, or empty on any failure.
pub async fn enrich(
    provider: &dyn PoolProvider,
    record: &PoolRecord,
    deadline: Duration,
) -> Vec<HistoricalPoint> {
    if record.pool.is_empty() {
        debug!(project = %record.project, "record has no pool id, skipping history");
        return Vec::new();
    }

    match tokio::time::timeout(deadline, provider.pool_history(&record.pool)).await {
        Ok(Ok(history)) => history,
        Ok(Err(err)) => {
            warn!(pool = %record.pool, project = %record.project, error = %err, "history fetch failed");
            Vec::new()
        }
        Err(_) => {
            warn!(pool = %record.pool, project = %record.project, "history fetch timed out");
            Vec::new()
        }
    }
}

/// Enrich every record in parallel, at most `concurrency` fetches at once.
///
/// Output order matches input order.
pub async fn enrich_all(
    provider: Arc<dyn PoolProvider>,
    records: &[PoolRecord],
    concurrency: usize,
    deadline: Duration,
) -> Vec<PoolWithHistory> {
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));

    let handles: Vec<_> = records
        .iter()
        .cloned()
        .map(|record| {
            let provider = Arc::clone(&provider);
            let permits = Arc::clone(&permits);
            tokio::spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                let history = enrich(provider.as_ref(), &record, deadline).await;
                PoolWithHistory { record, history }
            })
        })
        .collect();

    let mut out = Vec::with_capacity(records.len());
    for (handle, record) in handles.into_iter().zip(records) {
        match handle.await {
            Ok(pool) => out.push(pool),
            Err(err) => {
                warn!(pool = %record.pool, error = %err, "history task failed");
                out.push(PoolWithHistory::without_history(record.clone()));
            }
        }
    }
    out
}
