//! Storage abstraction for the retrieval engine.
//!
//! The [`DocumentStore`] trait defines the operations the knowledge store
//! needs from its document index, so the in-memory backend can be swapped
//! without touching context assembly.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::Document;
use crate::search::SearchHit;

/// Abstract document index.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`initialize`](DocumentStore::initialize) | Mark the store ready (idempotent) |
/// | [`add_documents`](DocumentStore::add_documents) | Upsert documents by id |
/// | [`clear`](DocumentStore::clear) | Remove every document |
/// | [`search`](DocumentStore::search) | Rank documents against a query |
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Mark the store ready. Safe to call any number of times.
    async fn initialize(&self) -> Result<()>;

    /// Insert or replace documents by id.
    ///
    /// A document whose id already exists replaces it in place; new ids are
    /// appended. Initializes the store first if needed.
    async fn add_documents(&self, docs: Vec<Document>) -> Result<()>;

    /// Remove every document.
    async fn clear(&self) -> Result<()>;

    /// Return the `k` best-scoring documents for `query`.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>>;

    /// Number of stored documents.
    async fn count(&self) -> Result<usize>;
}
