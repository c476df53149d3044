//! Shared fixtures for integration tests: a scripted in-process provider.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use lst_insight::config::Config;
use lst_insight::error::IngestError;
use lst_insight::provider::PoolProvider;
use lst_insight::service::InsightService;
use lst_insight_core::models::{HistoricalPoint, PoolRecord};

/// Provider that serves a fixed pool list and counts calls.
pub struct StubProvider {
    pools: Mutex<Vec<PoolRecord>>,
    pub list_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
    failing: AtomicBool,
    failing_history: Mutex<HashSet<String>>,
    delay: Option<Duration>,
}

impl StubProvider {
    pub fn new(pools: Vec<PoolRecord>) -> Self {
        Self {
            pools: Mutex::new(pools),
            list_calls: AtomicUsize::new(0),
            history_calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            failing_history: Mutex::new(HashSet::new()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_pools(&self, pools: Vec<PoolRecord>) {
        *self.pools.lock().unwrap() = pools;
    }

    pub fn fail_history_for(&self, pool_id: &str) {
        self.failing_history
            .lock()
            .unwrap()
            .insert(pool_id.to_string());
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PoolProvider for StubProvider {
    async fn list_pools(&self) -> Result<Vec<PoolRecord>, IngestError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(IngestError::Status(503));
        }
        Ok(self.pools.lock().unwrap().clone())
    }

    async fn pool_history(&self, pool_id: &str) -> Result<Vec<HistoricalPoint>, IngestError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_history.lock().unwrap().contains(pool_id) {
            return Err(IngestError::Decode("history data is not an array".to_string()));
        }
        Ok(vec![
            point(1, 3.0),
            point(2, 3.1),
        ])
    }
}

fn point(day: u32, apy: f64) -> HistoricalPoint {
    HistoricalPoint {
        timestamp: format!("2024-01-{:02}T00:00:00.000Z", day),
        tvl_usd: 1_000.0,
        apy,
        apy_base: Some(apy),
        apy_reward: None,
        il7d: None,
        apy_base7d: None,
    }
}

pub fn pool(project: &str, chain: &str, symbol: &str, tvl: f64, apy: f64) -> PoolRecord {
    let mut record = PoolRecord::new(project, chain, symbol, tvl, apy);
    record.pool = format!("{}-{}-{}", project, chain, symbol).to_lowercase();
    record
}

/// The canonical two-record Lido fixture plus noise the allow-list drops.
pub fn lido_fixture() -> Vec<PoolRecord> {
    let mut eth = pool("lido", "Ethereum", "STETH", 1_000_000.0, 3.0);
    eth.apy_pct_1d = Some(0.3);
    let mut polygon = pool("lido", "Polygon", "STMATIC", 500_000.0, 4.0);
    polygon.apy_pct_1d = Some(-0.3);
    vec![
        eth,
        pool("uniswap-v3", "Ethereum", "USDC-WETH", 90_000_000.0, 12.0),
        polygon,
        pool("lidofinance", "Ethereum", "FAKE", 1.0, 99.0),
    ]
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.provider.timeout_secs = 1;
    config.ingest.history_concurrency = 2;
    config
}

pub fn service_with(provider: Arc<StubProvider>, config: Config) -> InsightService {
    InsightService::new(config, provider)
}
