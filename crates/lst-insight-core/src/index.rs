//! Document generation from pool records.
//!
//! [`index`] regenerates the full document set on every call:
//!
//! | Kind | Id | One per |
//! |------|----|---------|
//! | `protocol` | `protocol-{project}-{chain}` | record |
//! | `category` | `category-top-apy`, `category-top-tvl` | index |
//! | `chain` | `chain-{chain}` | distinct chain |
//! | `project` | `project-{project}` | distinct project |
//!
//! Ids depend only on the input records, so rebuilding from the same input
//! yields the same ids and upserts replace documents in place.

use sha2::{Digest, Sha256};

use crate::format::format_grouped;
use crate::models::{Document, DocumentKind, DocumentMetadata, PoolRecord};

/// Number of entries in each category ranking.
pub const CATEGORY_SIZE: usize = 5;

pub const TOP_APY_ID: &str = "category-top-apy";
pub const TOP_TVL_ID: &str = "category-top-tvl";

/// Build every document for `records`.
pub fn index(records: &[PoolRecord]) -> Vec<Document> {
    let mut docs: Vec<Document> = records.iter().map(protocol_document).collect();
    docs.push(top_apy_document(records));
    docs.push(top_tvl_document(records));
    docs.extend(chain_documents(records));
    docs.extend(project_documents(records));
    docs
}

/// SHA-256 over every document id and content, in order.
pub fn fingerprint(docs: &[Document]) -> String {
    let mut hasher = Sha256::new();
    for doc in docs {
        hasher.update(doc.id.as_bytes());
        hasher.update([0u8]);
        hasher.update(doc.content.as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}

pub fn protocol_document(pool: &PoolRecord) -> Document {
    let project = pool.project.to_lowercase();
    let symbol = pool.symbol.to_lowercase();
    let chain = pool.chain.to_lowercase();

    let keywords = vec![
        project.clone(),
        symbol.clone(),
        chain.clone(),
        format!("{} {}", project, chain),
        format!("{} {}", symbol, chain),
        "apy".to_string(),
        "yield".to_string(),
        "tvl".to_string(),
        "liquid staking".to_string(),
        "staking".to_string(),
    ];

    let content = format!(
        "Protocol: {}\n\
         Symbol: {}\n\
         Chain: {}\n\
         APY: {:.2}%\n\
         Base APY: {}\n\
         Reward APY: {}\n\
         TVL: ${}\n\
         1-Day APY Change: {}\n\
         7-Day APY Change: {}\n\
         30-Day APY Change: {}\n\
         30-Day Mean APY: {}\n\
         Volatility (sigma): {}\n\
         Audited: {}",
        pool.project,
        pool.symbol,
        pool.chain,
        pool.apy,
        pct_or_na(pool.apy_base),
        pct_or_na(pool.apy_reward),
        format_grouped(pool.tvl_usd),
        pct_or_na(pool.apy_pct_1d),
        pct_or_na(pool.apy_pct_7d),
        pct_or_na(pool.apy_pct_30d),
        pct_or_na(pool.apy_mean_30d),
        pool.sigma
            .map(|s| format!("{:.4}", s))
            .unwrap_or_else(|| "N/A".to_string()),
        if pool.is_audited() { "Yes" } else { "No" },
    );

    let mut metadata = DocumentMetadata::of_kind(DocumentKind::Protocol);
    metadata.project = Some(pool.project.clone());
    metadata.symbol = Some(pool.symbol.clone());
    metadata.chain = Some(pool.chain.clone());
    metadata.apy = Some(pool.apy);
    metadata.tvl_usd = Some(pool.tvl_usd);

    Document {
        id: format!("protocol-{}-{}", pool.project, pool.chain),
        content,
        metadata,
        keywords,
    }
}

fn top_apy_document(records: &[PoolRecord]) -> Document {
    let top = top_by(records, |p| p.apy);
    let lines: Vec<String> = top
        .iter()
        .map(|p| {
            format!(
                "- {} ({}): {:.2}% APY, TVL: ${}, Chain: {}",
                p.project,
                p.symbol,
                p.apy,
                format_grouped(p.tvl_usd),
                p.chain
            )
        })
        .collect();

    category_document(
        TOP_APY_ID,
        "top-apy",
        format!("Top Performing Protocols by APY:\n{}", lines.join("\n")),
        &["top", "best", "highest", "apy", "yield", "performance", "performing"],
    )
}

fn top_tvl_document(records: &[PoolRecord]) -> Document {
    let top = top_by(records, |p| p.tvl_usd);
    let lines: Vec<String> = top
        .iter()
        .map(|p| {
            format!(
                "- {} ({}): ${} TVL, APY: {:.2}%, Chain: {}",
                p.project,
                p.symbol,
                format_grouped(p.tvl_usd),
                p.apy,
                p.chain
            )
        })
        .collect();

    category_document(
        TOP_TVL_ID,
        "top-tvl",
        format!("Largest Protocols by TVL:\n{}", lines.join("\n")),
        &["top", "largest", "biggest", "tvl", "value", "locked", "size"],
    )
}

fn category_document(id: &str, category: &str, content: String, keywords: &[&str]) -> Document {
    let mut metadata = DocumentMetadata::of_kind(DocumentKind::Category);
    metadata.category = Some(category.to_string());
    Document {
        id: id.to_string(),
        content,
        metadata,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

fn chain_documents(records: &[PoolRecord]) -> Vec<Document> {
    distinct(records.iter().map(|p| p.chain.as_str()))
        .into_iter()
        .map(|chain| {
            let lines: Vec<String> = records
                .iter()
                .filter(|p| p.chain == chain)
                .map(|p| {
                    format!(
                        "- {} ({}): {:.2}% APY, TVL: ${}",
                        p.project,
                        p.symbol,
                        p.apy,
                        format_grouped(p.tvl_usd)
                    )
                })
                .collect();

            let mut metadata = DocumentMetadata::of_kind(DocumentKind::Chain);
            metadata.chain = Some(chain.to_string());

            Document {
                id: format!("chain-{}", chain),
                content: format!("Protocols on {} chain:\n{}", chain, lines.join("\n")),
                metadata,
                keywords: vec![
                    chain.to_lowercase(),
                    "chain".to_string(),
                    "network".to_string(),
                    "blockchain".to_string(),
                ],
            }
        })
        .collect()
}

fn project_documents(records: &[PoolRecord]) -> Vec<Document> {
    distinct(records.iter().map(|p| p.project.as_str()))
        .into_iter()
        .map(|project| {
            let pools: Vec<&PoolRecord> = records.iter().filter(|p| p.project == project).collect();

            let mut keywords = vec![project.to_lowercase()];
            keywords.extend(pools.iter().map(|p| p.symbol.to_lowercase()));
            keywords.push("project".to_string());
            keywords.push("protocol".to_string());

            let lines: Vec<String> = pools
                .iter()
                .map(|p| {
                    format!(
                        "- {} on {}: {:.2}% APY, TVL: ${}",
                        p.symbol,
                        p.chain,
                        p.apy,
                        format_grouped(p.tvl_usd)
                    )
                })
                .collect();

            let mut metadata = DocumentMetadata::of_kind(DocumentKind::Project);
            metadata.project = Some(project.to_string());

            Document {
                id: format!("project-{}", project),
                content: format!("{} protocols:\n{}", project, lines.join("\n")),
                metadata,
                keywords,
            }
        })
        .collect()
}

fn pct_or_na(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}%", v))
        .unwrap_or_else(|| "N/A".to_string())
}

/// The first [`CATEGORY_SIZE`] records by `key`, descending; ties keep input order.
fn top_by<F>(records: &[PoolRecord], key: F) -> Vec<&PoolRecord>
where
    F: Fn(&PoolRecord) -> f64,
{
    let mut sorted: Vec<&PoolRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        key(b)
            .partial_cmp(&key(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.truncate(CATEGORY_SIZE);
    sorted
}

/// Distinct values in first-seen order.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = std::collections::HashSet::new();
    values.filter(|v| seen.insert(*v)).collect()
}
