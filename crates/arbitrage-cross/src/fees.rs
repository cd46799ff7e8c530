//! Per-contract taker fees for both venues.
//!
//! [`FeeModel`] is the only fee implementation in the workspace. The depth
//! walker uses it to size trades and the P&L resolver uses the same instance
//! to net estimated spreads, so pre-trade and post-trade figures can never
//! disagree on the fee assumption.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use xvenue_core::{FeeConfig, FeeRule, Venue};

/// Kalshi's published taker multiplier for `rate * P * (1 - P)`.
pub const KALSHI_TAKER_RATE: Decimal = dec!(0.07);

// =============================================================================
// Fee Model
// =============================================================================

/// Deterministic fee schedule for both venues.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeModel {
    config: FeeConfig,
}

impl FeeModel {
    /// Creates a fee model with the default schedule (Kalshi parabolic,
    /// Polymarket free).
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: FeeConfig::default(),
        }
    }

    /// Creates a fee model from an explicit schedule.
    #[must_use]
    pub fn with_config(config: FeeConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &FeeConfig {
        &self.config
    }

    /// Taker fee in whole cents for one contract bought at `price_cents`.
    ///
    /// Prices outside 1-99 cannot trade and cost nothing.
    #[must_use]
    pub fn fee_cents(&self, venue: Venue, price_cents: u32) -> u32 {
        if !(1..=99).contains(&price_cents) {
            return 0;
        }
        let price = Decimal::from(price_cents);
        let raw = match self.config.rule_for(venue) {
            FeeRule::None => Decimal::ZERO,
            FeeRule::Flat { cents } => Decimal::from(cents),
            FeeRule::Proportional { rate } => rate * price,
            FeeRule::Parabolic { rate } => rate * price * (dec!(100) - price) / dec!(100),
        };
        raw.max(Decimal::ZERO).ceil().to_u32().unwrap_or(0)
    }

    /// Combined fee in cents for one contract on each venue.
    #[must_use]
    pub fn pair_fee_cents(&self, polymarket_cents: u32, kalshi_cents: u32) -> u32 {
        self.fee_cents(Venue::Polymarket, polymarket_cents)
            + self.fee_cents(Venue::Kalshi, kalshi_cents)
    }

    /// Fee in dollars for `contracts` contracts at `price_cents`.
    #[must_use]
    pub fn fee_dollars(&self, venue: Venue, price_cents: u32, contracts: u32) -> Decimal {
        Decimal::from(self.fee_cents(venue, price_cents)) * Decimal::from(contracts) / dec!(100)
    }
}

impl Default for FeeModel {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Fee Breakdown
// =============================================================================

/// Fee estimate for one contract of a paired trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairFees {
    pub polymarket_cents: u32,
    pub kalshi_cents: u32,
}

impl PairFees {
    #[must_use]
    pub fn total_cents(&self) -> u32 {
        self.polymarket_cents + self.kalshi_cents
    }
}

impl FeeModel {
    /// Per-venue fee breakdown for one contract on each leg.
    #[must_use]
    pub fn pair_fees(&self, polymarket_cents: u32, kalshi_cents: u32) -> PairFees {
        PairFees {
            polymarket_cents: self.fee_cents(Venue::Polymarket, polymarket_cents),
            kalshi_cents: self.fee_cents(Venue::Kalshi, kalshi_cents),
        }
    }
}
