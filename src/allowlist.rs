//! Liquid staking project allow-list.
//!
//! Only records whose project identifier (or display name) equals one of
//! these entries, ignoring case, are kept after a fetch. Matching is exact:
//! `lidofinance` is not `lido`.

use lst_insight_core::models::PoolRecord;

pub const LST_PROJECTS: &[&str] = &[
    "zlot",
    "ankr",
    "lido",
    "stakehound",
    "stakewise-v2",
    "stafi",
    "sharedstake",
    "steakbank-finance",
    "marinade-liquid-staking",
    "karura-liquid-staking",
    "meta-pool-near",
    "rocket-pool",
    "geth",
    "asol",
    "stader",
    "ifpool",
    "jpool",
    "neoburger",
    "pstake-lsd",
    "benqi-staked-avax",
    "klaystation",
    "galgo-liquid-governance",
    "sicx",
    "steak",
    "thunderpokt",
    "stakeeasy",
    "linear-protocol",
    "bifrost-liquid-staking",
    "tenderize-v1",
    "argo-finance",
    "acala-liquid-staking",
    "eris-protocol",
    "acala-lcdot",
    "filet-finance",
    "algem",
    "skcs",
    "parallel-polkadot-crowdloan",
    "parallel-polkadot-liquid-staking",
    "exinpool",
    "stcelo",
    "eversol",
    "interlay-staking",
    "frax-ether",
    "stake-ly",
    "geode",
    "amulet-liquidity-staking",
    "ditto",
    "tortuga",
    "increment-liquid-staking",
    "stlos-liquid-staking",
    "yield-yak-staked-avax",
    "stride",
    "tranchess-ether",
    "kava-liquid",
    "strx-finance",
    "jito",
    "bifrost-liquid-crowdloan",
    "pepetam-swaves",
    "veno-finance",
    "stake-link-liquid",
    "nf3-ape",
    "okc-liquid-staking",
    "nucleon",
    "lockless-protocol",
    "hord",
    "trufin-legacy-vaults",
    "wynd-lsd",
    "glif",
    "starfish-liquid-staking",
    "stfil",
    "swell-liquid-staking",
    "stakehouse",
    "quicksilver-protocol",
    "sft-protocol",
    "binance-staked-eth",
    "blazestake",
    "origin-ether",
    "creth2",
    "scanto",
    "nodedao",
    "avely-staking",
    "mfil-protocol",
    "hashmix-fil",
    "liquid-collective",
    "stkd-scrt",
    "minefi",
    "swapscanner-lsd",
    "stakedicp",
    "neopin-liquid",
    "gogopool",
    "xalgo-liquid-staking",
    "collectif-dao",
    "hashking",
    "bemo",
    "meter-liquid-staking",
    "hatom-liquid-staking",
    "trustake",
    "jewelswap-liquid-staking",
];

fn is_listed(name: &str) -> bool {
    let name = name.to_lowercase();
    LST_PROJECTS.iter().any(|entry| *entry == name)
}

/// True if the record's project id or display name is on the allow-list.
pub fn is_allowed(record: &PoolRecord) -> bool {
    is_listed(&record.project) || record.project_name.as_deref().is_some_and(is_listed)
}

/// Keep only allow-listed records, preserving order.
pub fn filter(records: Vec<PoolRecord>) -> Vec<PoolRecord> {
    records.into_iter().filter(is_allowed).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_case_insensitive_match() {
        assert!(is_allowed(&PoolRecord::new("Lido", "Ethereum", "STETH", 1.0, 1.0)));
        assert!(is_allowed(&PoolRecord::new("rocket-pool", "Ethereum", "RETH", 1.0, 1.0)));
    }

    #[test]
    fn test_substring_is_not_a_match() {
        assert!(!is_allowed(&PoolRecord::new("lidofinance", "Ethereum", "X", 1.0, 1.0)));
        assert!(!is_allowed(&PoolRecord::new("lid", "Ethereum", "X", 1.0, 1.0)));
    }

    #[test]
    fn test_display_name_also_matches() {
        let mut record = PoolRecord::new("something-else", "Solana", "JITOSOL", 1.0, 1.0);
        record.project_name = Some("JITO".to_string());
        assert!(is_allowed(&record));
    }

    #[test]
    fn test_filter_preserves_order() {
        let records = vec![
            PoolRecord::new("jito", "Solana", "JITOSOL", 1.0, 1.0),
            PoolRecord::new("uniswap-v3", "Ethereum", "USDC-WETH", 1.0, 1.0),
            PoolRecord::new("lido", "Ethereum", "STETH", 1.0, 1.0),
        ];
        let kept: Vec<String> = filter(records).into_iter().map(|r| r.project).collect();
        assert_eq!(kept, vec!["jito", "lido"]);
    }

    #[test]
    fn test_entries_are_lowercase() {
        assert!(LST_PROJECTS.iter().all(|p| p.to_lowercase() == *p));
    }
}
