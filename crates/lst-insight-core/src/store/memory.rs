//! In-memory [`DocumentStore`] implementation.
//!
//! Documents live in a `Vec` (insertion order matters for tie-breaking)
//! with a side index from id to position, behind `std::sync::RwLock`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::Document;
use crate::search::{rank, SearchHit};

use super::DocumentStore;

#[derive(Default)]
struct Inner {
    docs: Vec<Document>,
    positions: HashMap<String, usize>,
}

/// Keyword-scored document store held entirely in memory.
#[derive(Default)]
pub struct InMemoryStore {
    initialized: AtomicBool,
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Snapshot of the stored documents in insertion order.
    pub fn documents(&self) -> Result<Vec<Document>> {
        let inner = self.inner.read().map_err(|_| anyhow!("document store lock poisoned"))?;
        Ok(inner.docs.clone())
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn initialize(&self) -> Result<()> {
        self.initialized.store(true, Ordering::Release);
        Ok(())
    }

    async fn add_documents(&self, docs: Vec<Document>) -> Result<()> {
        if !self.is_initialized() {
            self.initialize().await?;
        }
        let mut inner = self.inner.write().map_err(|_| anyhow!("document store lock poisoned"))?;
        for doc in docs {
            match inner.positions.get(&doc.id).copied() {
                Some(pos) => inner.docs[pos] = doc,
                None => {
                    let pos = inner.docs.len();
                    inner.positions.insert(doc.id.clone(), pos);
                    inner.docs.push(doc);
                }
            }
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| anyhow!("document store lock poisoned"))?;
        inner.docs.clear();
        inner.positions.clear();
        Ok(())
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        if !self.is_initialized() {
            self.initialize().await?;
        }
        let inner = self.inner.read().map_err(|_| anyhow!("document store lock poisoned"))?;
        Ok(rank(inner.docs.iter(), query, k))
    }

    async fn count(&self) -> Result<usize> {
        let inner = self.inner.read().map_err(|_| anyhow!("document store lock poisoned"))?;
        Ok(inner.docs.len())
    }
}
