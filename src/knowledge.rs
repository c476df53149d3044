//! Knowledge store: the indexed view of the current pool records.
//!
//! Every update builds a complete new [`Generation`] (records, document
//! index, fingerprint) off to the side and then swaps it in with a single
//! pointer write. Readers clone the current `Arc<Generation>` once per
//! request, so retrieval and the raw-record overview always come from the
//! same snapshot and never observe a half-built index.

use std::sync::{Arc, RwLock};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use lst_insight_core::context::{general_overview, render_retrieved, wants_overview};
use lst_insight_core::index::{fingerprint, index};
use lst_insight_core::models::PoolRecord;
use lst_insight_core::search::SearchHit;
use lst_insight_core::store::memory::InMemoryStore;
use lst_insight_core::store::DocumentStore;

use crate::config::ContextConfig;

/// One immutable published state of the knowledge store.
pub struct Generation {
    pub records: Arc<Vec<PoolRecord>>,
    pub store: InMemoryStore,
    pub documents: usize,
    pub fingerprint: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Generation {
    fn empty() -> Self {
        Self {
            records: Arc::new(Vec::new()),
            store: InMemoryStore::new(),
            documents: 0,
            fingerprint: fingerprint(&[]),
            updated_at: None,
        }
    }
}

/// Summary of the published generation.
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeStatus {
    pub documents: usize,
    pub records: usize,
    pub updated_at: Option<DateTime<Utc>>,
    pub fingerprint: String,
}

pub struct KnowledgeStore {
    current: RwLock<Arc<Generation>>,
    updating: Mutex<()>,
    top_k: usize,
    context: ContextConfig,
}

impl KnowledgeStore {
    pub fn new(top_k: usize, context: ContextConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(Generation::empty())),
            updating: Mutex::new(()),
            top_k,
            context,
        }
    }

    /// The currently published generation.
    pub fn snapshot(&self) -> Arc<Generation> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Rebuild the index from `records` and publish it.
    ///
    /// Returns `false` if the rebuild failed; the previous generation then
    /// keeps serving. Passing the record set that is already published is
    /// a no-op.
    pub async fn update(&self, records: Arc<Vec<PoolRecord>>) -> bool {
        let _updating = self.updating.lock().await;

        if Arc::ptr_eq(&self.snapshot().records, &records) {
            debug!("record set unchanged, keeping current index");
            return true;
        }

        match build(records).await {
            Ok(generation) => {
                info!(
                    documents = generation.documents,
                    records = generation.records.len(),
                    fingerprint = %generation.fingerprint,
                    "published knowledge generation"
                );
                let generation = Arc::new(generation);
                match self.current.write() {
                    Ok(mut guard) => *guard = generation,
                    Err(poisoned) => *poisoned.into_inner() = generation,
                }
                true
            }
            Err(err) => {
                error!(error = %err, "index rebuild failed, keeping previous generation");
                false
            }
        }
    }

    /// Context text for `query`. Never empty and never an error.
    pub async fn get_context(&self, query: &str) -> String {
        let generation = self.snapshot();
        let overview = || general_overview(&generation.records, &self.context.highlights);

        let hits = match generation.store.search(query, self.top_k).await {
            Ok(hits) => hits,
            Err(err) => {
                warn!(error = %err, "retrieval failed, falling back to overview");
                return overview();
            }
        };

        // Zero-score hits only count as retrieved when something matched.
        if hits.iter().all(|h| h.score == 0) {
            debug!(query, "no matching documents");
            return overview();
        }

        let mut context = render_retrieved(&hits);
        if wants_overview(query, &self.context.overview_triggers) {
            context.push_str(&overview());
        }
        context
    }

    /// Raw ranked hits, zero scores included.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        self.snapshot().store.search(query, k).await
    }

    /// Records whose project or display name contains `name`.
    pub fn records_for_project(&self, name: &str) -> Vec<PoolRecord> {
        self.snapshot()
            .records
            .iter()
            .filter(|r| r.mentions(name))
            .cloned()
            .collect()
    }

    pub fn status(&self) -> KnowledgeStatus {
        let generation = self.snapshot();
        KnowledgeStatus {
            documents: generation.documents,
            records: generation.records.len(),
            updated_at: generation.updated_at,
            fingerprint: generation.fingerprint.clone(),
        }
    }
}

async fn build(records: Arc<Vec<PoolRecord>>) -> Result<Generation> {
    let docs = index(&records);
    let fingerprint = fingerprint(&docs);

    let store = InMemoryStore::new();
    store.initialize().await?;
    store.clear().await?;
    store.add_documents(docs).await?;
    // Duplicate ids collapse on upsert.
    let documents = store.count().await?;

    Ok(Generation {
        records,
        store,
        documents,
        fingerprint,
        updated_at: Some(Utc::now()),
    })
}
