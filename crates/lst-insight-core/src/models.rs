//! Core data models used throughout LST Insight.
//!
//! These types represent the pool records, history points, protocol
//! aggregates and retrievable documents that flow through the ingestion
//! and retrieval pipeline.

use serde::{Deserialize, Deserializer, Serialize};

/// One `(project, chain, symbol)` yield-bearing position as reported by the
/// yields provider.
///
/// Field names follow the provider's camelCase payload. Records are
/// immutable once fetched and replaced wholesale on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub chain: String,
    /// Project identifier, e.g. `"lido"` or `"rocket-pool"`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub project: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub symbol: String,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub tvl_usd: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub apy: f64,
    #[serde(default)]
    pub apy_base: Option<f64>,
    #[serde(default)]
    pub apy_reward: Option<f64>,
    #[serde(default, rename = "apyPct1D")]
    pub apy_pct_1d: Option<f64>,
    #[serde(default, rename = "apyPct7D")]
    pub apy_pct_7d: Option<f64>,
    #[serde(default, rename = "apyPct30D")]
    pub apy_pct_30d: Option<f64>,
    #[serde(default)]
    pub apy_mean_30d: Option<f64>,
    /// Volatility estimate.
    #[serde(default)]
    pub sigma: Option<f64>,
    /// Audit reference; any value counts as audited.
    #[serde(default)]
    pub audits: Option<String>,
    /// Pool id used for the history endpoint.
    #[serde(default, deserialize_with = "null_as_default")]
    pub pool: String,
    #[serde(default)]
    pub pool_meta: Option<String>,
    /// Human-readable project name, when the provider supplies one.
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stablecoin: bool,
    #[serde(default)]
    pub il_risk: Option<String>,
    #[serde(default)]
    pub exposure: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl PoolRecord {
    /// Minimal record, mostly useful for tests and fixtures.
    pub fn new(project: &str, chain: &str, symbol: &str, tvl_usd: f64, apy: f64) -> Self {
        Self {
            chain: chain.to_string(),
            project: project.to_string(),
            symbol: symbol.to_string(),
            tvl_usd,
            apy,
            apy_base: None,
            apy_reward: None,
            apy_pct_1d: None,
            apy_pct_7d: None,
            apy_pct_30d: None,
            apy_mean_30d: None,
            sigma: None,
            audits: None,
            pool: String::new(),
            pool_meta: None,
            project_name: None,
            stablecoin: false,
            il_risk: None,
            exposure: None,
            url: None,
        }
    }

    pub fn is_audited(&self) -> bool {
        self.audits.as_deref().is_some_and(|a| !a.is_empty())
    }

    /// True if the project id or display name contains `needle` (case-insensitive).
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.project.to_lowercase().contains(&needle)
            || self
                .project_name
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(&needle))
    }
}

fn null_as_zero<'de, D>(d: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(d)?.unwrap_or(0.0))
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// A past `(timestamp, TVL, APY)` snapshot of a pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPoint {
    /// Kept exactly as the provider sent it.
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub tvl_usd: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub apy: f64,
    #[serde(default)]
    pub apy_base: Option<f64>,
    #[serde(default)]
    pub apy_reward: Option<f64>,
    #[serde(default)]
    pub il7d: Option<f64>,
    #[serde(default)]
    pub apy_base7d: Option<f64>,
}

/// A pool record together with its (possibly empty) history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolWithHistory {
    pub record: PoolRecord,
    pub history: Vec<HistoricalPoint>,
}

impl PoolWithHistory {
    pub fn without_history(record: PoolRecord) -> Self {
        Self {
            record,
            history: Vec::new(),
        }
    }
}

/// One logical protocol, derived from every record sharing a project name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtocolAggregate {
    pub name: String,
    /// Summed TVL of all constituent pools.
    pub tvl: f64,
    /// TVL-weighted APY.
    pub apy: f64,
    /// TVL-weighted 1-day APY change.
    pub change_24h: f64,
    /// TVL-weighted 7-day APY change.
    pub change_7d: f64,
    /// Constituent pools in discovery order.
    pub pools: Vec<PoolWithHistory>,
}

/// The four kinds of retrievable documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Protocol,
    Category,
    Chain,
    Project,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Protocol => "protocol",
            DocumentKind::Category => "category",
            DocumentKind::Chain => "chain",
            DocumentKind::Project => "project",
        }
    }
}

/// Type tag plus the type-specific fields of a [`Document`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apy: Option<f64>,
    #[serde(rename = "tvlUsd", skip_serializing_if = "Option::is_none")]
    pub tvl_usd: Option<f64>,
}

impl DocumentMetadata {
    pub fn of_kind(kind: DocumentKind) -> Self {
        Self {
            kind,
            project: None,
            chain: None,
            symbol: None,
            category: None,
            apy: None,
            tvl_usd: None,
        }
    }
}

/// A retrievable unit: preformatted text plus metadata and match keywords.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Stable id derived from the kind and its key fields.
    pub id: String,
    pub content: String,
    pub metadata: DocumentMetadata,
    /// Lower-cased keywords used for matching.
    pub keywords: Vec<String>,
}
