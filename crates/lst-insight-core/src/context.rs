//! Context text assembly.
//!
//! Turns retrieval hits into grouped markdown sections and builds the
//! general market overview used as a fallback. Both are pure functions of
//! their inputs; deciding *when* to fall back is left to the caller.

use crate::format::{format_currency, format_percentage};
use crate::models::{DocumentKind, PoolRecord};
use crate::profile::display_name;
use crate::search::SearchHit;

/// Number of entries in each overview ranking.
pub const OVERVIEW_SIZE: usize = 5;

/// Section headings, in output order.
const SECTIONS: [(DocumentKind, &str); 4] = [
    (DocumentKind::Protocol, "Protocol Details"),
    (DocumentKind::Category, "Market Overview"),
    (DocumentKind::Chain, "Chain-Specific Information"),
    (DocumentKind::Project, "Project Information"),
];

/// Group hits by document kind, one section per non-empty kind.
///
/// Each hit's content is copied verbatim. Hits keep their rank order
/// within a section.
pub fn render_retrieved(hits: &[SearchHit]) -> String {
    let mut out = String::from("## Retrieved Information\n\n");
    for (kind, heading) in SECTIONS {
        let bucket: Vec<&SearchHit> = hits
            .iter()
            .filter(|h| h.document.metadata.kind == kind)
            .collect();
        if bucket.is_empty() {
            continue;
        }
        out.push_str(&format!("### {}\n\n", heading));
        for hit in bucket {
            out.push_str(&hit.document.content);
            out.push_str("\n\n");
        }
    }
    out
}

/// True if `query` contains any trigger phrase (case-insensitive).
pub fn wants_overview(query: &str, triggers: &[String]) -> bool {
    let query = query.to_lowercase();
    triggers
        .iter()
        .any(|t| !t.is_empty() && query.contains(&t.to_lowercase()))
}

/// Top pools by APY and TVL, plus a section per highlighted identifier
/// that matches at least one record.
pub fn general_overview(records: &[PoolRecord], highlights: &[String]) -> String {
    let mut out = String::from("### Market Overview\n\n");

    if records.is_empty() {
        out.push_str("No liquid staking data is currently available.\n");
        return out;
    }

    out.push_str("Top Performing Protocols by APY:\n");
    for p in top_by(records, |p| p.apy) {
        out.push_str(&format!(
            "- {} ({}): {} APY, TVL: {}\n",
            p.project,
            p.symbol,
            format_percentage(Some(p.apy)),
            format_currency(p.tvl_usd)
        ));
    }

    out.push('\n');

    out.push_str("Largest Protocols by TVL:\n");
    for p in top_by(records, |p| p.tvl_usd) {
        out.push_str(&format!(
            "- {} ({}): {} TVL, APY: {}\n",
            p.project,
            p.symbol,
            format_currency(p.tvl_usd),
            format_percentage(Some(p.apy))
        ));
    }

    for highlight in highlights.iter().filter(|h| !h.trim().is_empty()) {
        let matching: Vec<&PoolRecord> = records.iter().filter(|p| p.mentions(highlight)).collect();
        if matching.is_empty() {
            continue;
        }
        out.push_str(&format!("\n### {} Protocols\n\n", display_name(highlight.trim())));
        for p in matching {
            out.push_str(&format!(
                "- {} ({}) on {}: {} APY, TVL: {}\n",
                p.project,
                p.symbol,
                p.chain,
                format_percentage(Some(p.apy)),
                format_currency(p.tvl_usd)
            ));
        }
    }

    out
}

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
    sorted.truncate(OVERVIEW_SIZE);
    sorted
}
