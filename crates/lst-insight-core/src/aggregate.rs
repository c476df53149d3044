//! Protocol-level aggregation of pool records.
//!
//! Pools are grouped by lower-cased project name. Each group's TVL is the
//! sum of its pools; APY and the 24h/7d changes are TVL-weighted averages.
//! A group with zero TVL has all weighted metrics at `0.0`.

use std::collections::HashMap;

use crate::models::{PoolWithHistory, ProtocolAggregate};

/// Group pools into protocols, ordered by descending TVL.
///
/// Ties keep the order in which each protocol was first seen.
pub fn aggregate(pools: &[PoolWithHistory]) -> Vec<ProtocolAggregate> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut protocols: Vec<ProtocolAggregate> = Vec::new();

    for pool in pools {
        let key = pool.record.project.to_lowercase();
        let slot = *index.entry(key).or_insert_with(|| {
            protocols.push(ProtocolAggregate {
                name: pool.record.project.clone(),
                tvl: 0.0,
                apy: 0.0,
                change_24h: 0.0,
                change_7d: 0.0,
                pools: Vec::new(),
            });
            protocols.len() - 1
        });
        let protocol = &mut protocols[slot];
        protocol.tvl += pool.record.tvl_usd;
        protocol.pools.push(pool.clone());
    }

    for protocol in &mut protocols {
        apply_weights(protocol);
    }

    protocols.sort_by(|a, b| {
        b.tvl
            .partial_cmp(&a.tvl)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    protocols
}

fn apply_weights(protocol: &mut ProtocolAggregate) {
    if protocol.tvl <= 0.0 {
        protocol.apy = 0.0;
        protocol.change_24h = 0.0;
        protocol.change_7d = 0.0;
        return;
    }

    let total = protocol.tvl;
    let (mut apy, mut change_24h, mut change_7d) = (0.0, 0.0, 0.0);
    for pool in &protocol.pools {
        let weight = pool.record.tvl_usd / total;
        apy += pool.record.apy * weight;
        change_24h += pool.record.apy_pct_1d.unwrap_or(0.0) * weight;
        change_7d += pool.record.apy_pct_7d.unwrap_or(0.0) * weight;
    }
    protocol.apy = apy;
    protocol.change_24h = change_24h;
    protocol.change_7d = change_7d;
}
