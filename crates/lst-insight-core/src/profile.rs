//! Derived descriptors for a pool: display name, APY trend, risk level and tags.

use serde::Serialize;

use crate::models::PoolRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendMagnitude {
    Strong,
    Moderate,
    Slight,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ApyTrend {
    pub direction: TrendDirection,
    pub magnitude: TrendMagnitude,
    /// The change the trend was derived from (30-day, falling back to 7-day).
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Everything [`profile`] derives for one pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolProfile {
    pub display_name: String,
    pub trend: ApyTrend,
    pub risk: RiskLevel,
    pub tags: Vec<String>,
}

pub fn profile(pool: &PoolRecord) -> PoolProfile {
    PoolProfile {
        display_name: display_name(&pool.project),
        trend: apy_trend(pool),
        risk: risk_level(pool),
        tags: tags(pool),
    }
}

/// `rocket-pool` → `Rocket Pool`.
pub fn display_name(project: &str) -> String {
    project
        .split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn apy_trend(pool: &PoolRecord) -> ApyTrend {
    // A zero 30-day change counts as missing.
    let change = pool
        .apy_pct_30d
        .filter(|v| *v != 0.0)
        .or(pool.apy_pct_7d)
        .unwrap_or(0.0);

    let direction = if change > 0.5 {
        TrendDirection::Up
    } else if change < -0.5 {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    };

    let magnitude = if change.abs() > 5.0 {
        TrendMagnitude::Strong
    } else if change.abs() > 2.0 {
        TrendMagnitude::Moderate
    } else {
        TrendMagnitude::Slight
    };

    ApyTrend {
        direction,
        magnitude,
        value: change,
    }
}

pub fn risk_level(pool: &PoolRecord) -> RiskLevel {
    let volatility = pool.sigma.unwrap_or(0.0);
    if volatility > 0.1 || !pool.is_audited() {
        RiskLevel::High
    } else if volatility > 0.05 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

pub fn tags(pool: &PoolRecord) -> Vec<String> {
    let mut tags = vec![pool.chain.to_lowercase()];

    let size = if pool.tvl_usd > 1_000_000_000.0 {
        "large-tvl"
    } else if pool.tvl_usd > 100_000_000.0 {
        "medium-tvl"
    } else {
        "small-tvl"
    };
    tags.push(size.to_string());

    let yield_band = if pool.apy > 10.0 {
        "high-yield"
    } else if pool.apy > 5.0 {
        "medium-yield"
    } else {
        "low-yield"
    };
    tags.push(yield_band.to_string());

    match pool.sigma {
        Some(s) if s > 0.0 && s < 0.03 => tags.push("stable".to_string()),
        Some(s) if s > 0.1 => tags.push("volatile".to_string()),
        _ => {}
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("rocket-pool"), "Rocket Pool");
        assert_eq!(display_name("lido"), "Lido");
        assert_eq!(display_name("stake-link-liquid"), "Stake Link Liquid");
    }

    #[test]
    fn test_trend_prefers_30d_then_7d() {
        let mut p = PoolRecord::new("lido", "Ethereum", "STETH", 1.0, 3.0);
        p.apy_pct_30d = Some(6.0);
        p.apy_pct_7d = Some(-1.0);
        let t = apy_trend(&p);
        assert_eq!(t.direction, TrendDirection::Up);
        assert_eq!(t.magnitude, TrendMagnitude::Strong);

        p.apy_pct_30d = None;
        let t = apy_trend(&p);
        assert_eq!(t.direction, TrendDirection::Down);
        assert_eq!(t.magnitude, TrendMagnitude::Slight);

        p.apy_pct_7d = None;
        assert_eq!(apy_trend(&p).direction, TrendDirection::Stable);
    }

    #[test]
    fn test_risk_level() {
        let mut p = PoolRecord::new("lido", "Ethereum", "STETH", 1.0, 3.0);
        assert_eq!(risk_level(&p), RiskLevel::High); // unaudited
        p.audits = Some("2".into());
        assert_eq!(risk_level(&p), RiskLevel::Low);
        p.sigma = Some(0.07);
        assert_eq!(risk_level(&p), RiskLevel::Medium);
        p.sigma = Some(0.2);
        assert_eq!(risk_level(&p), RiskLevel::High);
    }

    #[test]
    fn test_tags() {
        let mut p = PoolRecord::new("lido", "Ethereum", "STETH", 2_000_000_000.0, 6.0);
        p.sigma = Some(0.01);
        assert_eq!(tags(&p), vec!["ethereum", "large-tvl", "medium-yield", "stable"]);
    }
}
