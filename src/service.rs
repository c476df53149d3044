//! The coordinating service.
//!
//! [`InsightService`] owns the provider, the ingestion cache and the
//! knowledge store, and exposes the operations shared by the CLI and the
//! HTTP server. Query operations lazily refresh first: a cached fetch
//! followed by an index update, which is a no-op when the cache returned
//! the record set that is already indexed.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use lst_insight_core::aggregate::aggregate;
use lst_insight_core::models::{PoolRecord, PoolWithHistory, ProtocolAggregate};
use lst_insight_core::search::SearchHit;

use crate::cache::IngestionCache;
use crate::config::Config;
use crate::enrich::enrich_all;
use crate::error::IngestError;
use crate::knowledge::KnowledgeStore;
use crate::prompt::{self, BuiltPrompt, ChatMessage};
use crate::provider::{LlamaProvider, PoolProvider};

/// Result of an explicit refresh.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub records: usize,
    pub indexed: bool,
}

pub struct InsightService {
    config: Config,
    provider: Arc<dyn PoolProvider>,
    cache: IngestionCache,
    knowledge: KnowledgeStore,
}

impl InsightService {
    pub fn new(config: Config, provider: Arc<dyn PoolProvider>) -> Self {
        let cache = IngestionCache::new(
            Arc::clone(&provider),
            Duration::from_secs(config.cache.ttl_secs),
            Duration::from_secs(config.provider.timeout_secs),
        );
        let knowledge = KnowledgeStore::new(config.retrieval.top_k, config.context.clone());
        Self {
            config,
            provider,
            cache,
            knowledge,
        }
    }

    /// Service backed by the HTTP yields provider named in `config`.
    pub fn from_config(config: Config) -> Result<Self> {
        let provider = LlamaProvider::new(&config.provider)?;
        Ok(Self::new(config, Arc::new(provider)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn knowledge(&self) -> &KnowledgeStore {
        &self.knowledge
    }

    /// Allow-listed records from the cache.
    pub async fn fetch(&self, force_refresh: bool) -> Result<Arc<Vec<PoolRecord>>, IngestError> {
        self.cache.fetch(force_refresh).await
    }

    /// Allow-listed records, or empty when the provider has never answered.
    pub async fn pools(&self, force_refresh: bool) -> Arc<Vec<PoolRecord>> {
        self.cache.fetch_or_empty(force_refresh).await
    }

    /// Fetch and re-index. Fails only when no data has ever been fetched.
    pub async fn refresh(&self, force_refresh: bool) -> Result<RefreshOutcome, IngestError> {
        let records = self.cache.fetch(force_refresh).await?;
        let count = records.len();
        let indexed = self.knowledge.update(records).await;
        info!(records = count, indexed, "refresh complete");
        Ok(RefreshOutcome {
            records: count,
            indexed,
        })
    }

    async fn sync(&self, force_refresh: bool) {
        let records = self.cache.fetch_or_empty(force_refresh).await;
        self.knowledge.update(records).await;
    }

    /// Protocol aggregates, optionally enriched with pool history.
    pub async fn protocols(&self, force_refresh: bool, with_history: bool) -> Vec<ProtocolAggregate> {
        let records = self.cache.fetch_or_empty(force_refresh).await;
        let pools = if with_history && self.config.ingest.enrich_history {
            enrich_all(
                Arc::clone(&self.provider),
                &records,
                self.config.ingest.history_concurrency,
                Duration::from_secs(self.config.provider.timeout_secs),
            )
            .await
        } else {
            records
                .iter()
                .cloned()
                .map(PoolWithHistory::without_history)
                .collect()
        };
        aggregate(&pools)
    }

    /// Raw ranked documents for `query`.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        self.sync(false).await;
        self.knowledge.search(query, k).await
    }

    /// Assembled context for `query`.
    pub async fn context(&self, query: &str) -> String {
        self.sync(false).await;
        self.knowledge.get_context(query).await
    }

    /// System prompt for a conversation, built from the context of its
    /// last user message.
    pub async fn prompt(&self, messages: Vec<ChatMessage>, force_refresh: bool) -> BuiltPrompt {
        self.sync(force_refresh).await;
        let context = self
            .knowledge
            .get_context(prompt::last_user_message(&messages))
            .await;
        prompt::build(messages, &context)
    }
}
