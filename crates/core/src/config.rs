use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::venue::Venue;

/// Top-level configuration for the ledger.
///
/// Every section has a serde default so an empty or partial config file is
/// valid; only the keys that differ from the defaults need to be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub fees: FeeConfig,
    pub sizing: SizingConfig,
    pub reconciliation: ReconciliationConfig,
}

/// Per-contract taker fee rule for one venue.
///
/// All rules take the execution price in integer cents and return whole
/// cents, rounding up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeeRule {
    /// No taker fee.
    None,
    /// Constant fee regardless of price.
    Flat { cents: u32 },
    /// `ceil(rate * price)`.
    Proportional { rate: Decimal },
    /// `ceil(rate * P * (100 - P) / 100)`, Kalshi's published taker schedule.
    ///
    /// Not monotonic in price: the fee peaks at 50c and falls toward both
    /// ends. Use [`FeeRule::Proportional`] where a fee that never decreases
    /// with price is required.
    Parabolic { rate: Decimal },
}

/// Fee schedule for both venues.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeConfig {
    pub polymarket: FeeRule,
    pub kalshi: FeeRule,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            polymarket: FeeRule::None,
            kalshi: FeeRule::Parabolic {
                rate: Decimal::new(7, 2),
            },
        }
    }
}

impl FeeConfig {
    /// Returns the rule configured for `venue`.
    #[must_use]
    pub fn rule_for(&self, venue: Venue) -> FeeRule {
        match venue {
            Venue::Polymarket => self.polymarket,
            Venue::Kalshi => self.kalshi,
        }
    }

    /// Uses the same rule on both venues.
    #[must_use]
    pub fn uniform(rule: FeeRule) -> Self {
        Self {
            polymarket: rule,
            kalshi: rule,
        }
    }
}

/// Depth-walk sizing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    /// Minimum marginal profit per contract (cents, after fees) for a level
    /// to be accepted.
    pub min_edge_cents: i64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self { min_edge_cents: 1 }
    }
}

/// Balance reconciliation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconciliationConfig {
    /// Largest absolute difference (dollars) still reported as reconciled.
    pub tolerance: Decimal,
    /// Balance snapshots older than this (relative to the snapshot's `as_of`)
    /// are treated as stale.
    pub stale_after_secs: i64,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            tolerance: Decimal::new(10, 2),
            stale_after_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::default();

        assert_eq!(config.sizing.min_edge_cents, 1);
        assert_eq!(config.reconciliation.tolerance, dec!(0.10));
        assert_eq!(config.reconciliation.stale_after_secs, 60);
        assert_eq!(config.fees.polymarket, FeeRule::None);
        assert_eq!(
            config.fees.kalshi,
            FeeRule::Parabolic { rate: dec!(0.07) }
        );
    }

    #[test]
    fn test_rule_for_venue() {
        let fees = FeeConfig {
            polymarket: FeeRule::Flat { cents: 1 },
            kalshi: FeeRule::None,
        };

        assert_eq!(fees.rule_for(Venue::Polymarket), FeeRule::Flat { cents: 1 });
        assert_eq!(fees.rule_for(Venue::Kalshi), FeeRule::None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "sizing": { "min_edge_cents": 2 } }"#;
        let config: LedgerConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.sizing.min_edge_cents, 2);
        assert_eq!(config.reconciliation.tolerance, dec!(0.10));
    }

    #[test]
    fn test_fee_rule_tagged_json() {
        let json = r#"{ "kind": "flat", "cents": 3 }"#;
        let rule: FeeRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule, FeeRule::Flat { cents: 3 });
    }
}
