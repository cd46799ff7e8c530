//! Depth-walk sizing for cross-venue arbitrage.
//!
//! Walks both venues' YES books from the best price outward and keeps adding
//! contracts while each additional contract still clears the minimum edge
//! after fees.
//!
//! # Pricing
//!
//! Selling YES on a venue is priced as buying its complementary NO contract:
//!
//! ```text
//! Buy Polymarket YES @ 45c   (ask)
//! Sell Kalshi YES    @ 48c   (bid)  ==  buy Kalshi NO @ 52c
//! Combined cost:       97c
//! Spread:               3c
//! Fees:                 1c
//! Marginal profit:      2c per contract
//! ```
//!
//! The first level that fails the edge test is recorded with `stopped = true`
//! and the walk for that direction ends there. Later levels are never
//! accepted, even when they would clear the edge on their own.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};
use xvenue_core::{SizingConfig, Venue};

use crate::fees::FeeModel;
use crate::types::{BookSide, Direction, MarketDepth, OrderBookLevel};

// =============================================================================
// Ladder Types
// =============================================================================

/// One step of a depth walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthWalkLevel {
    /// Zero-based step index within the walk.
    pub level: u32,
    /// Price paid per contract on Polymarket (venue A), cents.
    pub venue_a_price: u32,
    /// Price paid per contract on Kalshi (venue B), cents.
    pub venue_b_cost: u32,
    /// `100 - (venue_a_price + venue_b_cost)`.
    pub spread_cents: i64,
    /// Combined taker fee for one contract on both legs.
    pub fee_cents: u32,
    /// `spread_cents - fee_cents`.
    pub marginal_profit_cents: i64,
    /// Contracts available on both books at this step.
    pub contracts_at_level: u32,
    /// Contracts accepted up to and including this step.
    pub cumulative_contracts: u32,
    /// Set on the first step that failed the edge test.
    pub stopped: bool,
}

/// Result of walking a single direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionWalk {
    pub direction: Direction,
    pub ladder: Vec<DepthWalkLevel>,
    /// Contracts accepted.
    pub contracts: u32,
    /// Sum of `marginal_profit_cents * contracts_at_level` over accepted steps.
    pub net_profit_cents: i64,
}

impl DirectionWalk {
    fn empty(direction: Direction) -> Self {
        Self {
            direction,
            ladder: Vec::new(),
            contracts: 0,
            net_profit_cents: 0,
        }
    }

    /// True when this walk beats `other`: more net profit, then more size.
    #[must_use]
    pub fn is_better_than(&self, other: &Self) -> bool {
        (self.net_profit_cents, self.contracts) > (other.net_profit_cents, other.contracts)
    }
}

/// Sizing output handed to the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizingRecommendation {
    /// Direction to trade, `None` when nothing clears the edge.
    pub direction: Option<Direction>,
    /// Contracts to trade.
    pub contracts: u32,
    /// Expected net profit in cents for the whole size.
    pub expected_profit_cents: i64,
    /// Audit ladder for the chosen direction.
    pub ladder: Vec<DepthWalkLevel>,
}

impl SizingRecommendation {
    /// No trade.
    #[must_use]
    pub fn none() -> Self {
        Self {
            direction: None,
            contracts: 0,
            expected_profit_cents: 0,
            ladder: Vec::new(),
        }
    }

    /// Expected net profit in dollars.
    #[must_use]
    pub fn expected_profit(&self) -> Decimal {
        Decimal::from(self.expected_profit_cents) / dec!(100)
    }

    /// True when a trade is recommended.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        self.direction.is_some() && self.contracts > 0
    }
}

impl From<DirectionWalk> for SizingRecommendation {
    fn from(walk: DirectionWalk) -> Self {
        Self {
            direction: (walk.contracts > 0).then_some(walk.direction),
            contracts: walk.contracts,
            expected_profit_cents: walk.net_profit_cents,
            ladder: walk.ladder,
        }
    }
}

// =============================================================================
// Depth Walker
// =============================================================================

/// Sizes trades by walking order-book depth on both venues.
#[derive(Debug, Clone)]
pub struct DepthWalker {
    fees: FeeModel,
    min_edge_cents: i64,
}

impl DepthWalker {
    /// Creates a walker sharing `fees` with the rest of the ledger.
    #[must_use]
    pub fn new(fees: FeeModel, min_edge_cents: i64) -> Self {
        Self {
            fees,
            min_edge_cents,
        }
    }

    /// Creates a walker from sizing configuration.
    #[must_use]
    pub fn with_config(fees: FeeModel, config: &SizingConfig) -> Self {
        Self::new(fees, config.min_edge_cents)
    }

    /// Returns the fee model.
    #[must_use]
    pub fn fee_model(&self) -> &FeeModel {
        &self.fees
    }

    /// Returns the minimum marginal profit per contract, cents.
    #[must_use]
    pub fn min_edge_cents(&self) -> i64 {
        self.min_edge_cents
    }

    /// Walks both directions and returns the better one.
    #[must_use]
    pub fn recommend(&self, depth: &MarketDepth) -> SizingRecommendation {
        let Some((buy_a, buy_b)) = self.walk_both(depth) else {
            return SizingRecommendation::none();
        };

        let best = if buy_b.is_better_than(&buy_a) {
            buy_b
        } else {
            buy_a
        };
        let recommendation = SizingRecommendation::from(best);

        if let Some(direction) = recommendation.direction {
            info!(
                direction = %direction,
                contracts = recommendation.contracts,
                expected_profit_cents = recommendation.expected_profit_cents,
                levels = recommendation.ladder.len(),
                "Depth walk sized arbitrage"
            );
        } else {
            debug!("Depth walk found no level above minimum edge");
        }

        recommendation
    }

    /// Walks both directions independently.
    ///
    /// Returns `None` without walking when either venue's book is empty or
    /// one-sided. Otherwise returns `(buy Polymarket / sell Kalshi,
    /// buy Kalshi / sell Polymarket)`.
    #[must_use]
    pub fn walk_both(&self, depth: &MarketDepth) -> Option<(DirectionWalk, DirectionWalk)> {
        for venue in [Venue::Polymarket, Venue::Kalshi] {
            if depth.is_one_sided(venue) {
                debug!(venue = %venue, "Book empty or one-sided, skipping depth walk");
                return None;
            }
        }

        let buy_a = self.walk(
            Direction::BuyPolySellKalshi,
            depth.levels(Venue::Polymarket, BookSide::Ask),
            depth.levels(Venue::Kalshi, BookSide::Bid),
        );
        let buy_b = self.walk(
            Direction::BuyKalshiSellPoly,
            depth.levels(Venue::Kalshi, BookSide::Ask),
            depth.levels(Venue::Polymarket, BookSide::Bid),
        );
        Some((buy_a, buy_b))
    }

    /// Walks one direction: YES asks on the buy venue against YES bids on
    /// the other venue.
    fn walk(
        &self,
        direction: Direction,
        asks: &[OrderBookLevel],
        bids: &[OrderBookLevel],
    ) -> DirectionWalk {
        let mut asks: Vec<OrderBookLevel> =
            asks.iter().filter(|l| l.is_tradeable()).copied().collect();
        let mut bids: Vec<OrderBookLevel> =
            bids.iter().filter(|l| l.is_tradeable()).copied().collect();
        asks.sort_by_key(|l| l.price_cents);
        bids.sort_by(|a, b| b.price_cents.cmp(&a.price_cents));

        let mut walk = DirectionWalk::empty(direction);
        let (mut i, mut j) = (0, 0);
        let mut ask_left = asks.first().map_or(0, |l| l.size);
        let mut bid_left = bids.first().map_or(0, |l| l.size);

        while i < asks.len() && j < bids.len() {
            let buy_price = asks[i].price_cents;
            let hedge_cost = 100 - bids[j].price_cents;
            let (venue_a_price, venue_b_cost) = match direction {
                Direction::BuyPolySellKalshi => (buy_price, hedge_cost),
                Direction::BuyKalshiSellPoly => (hedge_cost, buy_price),
            };

            let spread_cents = 100 - i64::from(venue_a_price) - i64::from(venue_b_cost);
            let fee_cents = self.fees.pair_fee_cents(venue_a_price, venue_b_cost);
            let marginal_profit_cents = spread_cents - i64::from(fee_cents);
            let contracts_at_level = ask_left.min(bid_left);
            let stopped = marginal_profit_cents < self.min_edge_cents;

            if !stopped {
                walk.contracts = walk.contracts.saturating_add(contracts_at_level);
                walk.net_profit_cents = walk
                    .net_profit_cents
                    .saturating_add(marginal_profit_cents * i64::from(contracts_at_level));
            }

            walk.ladder.push(DepthWalkLevel {
                level: walk.ladder.len() as u32,
                venue_a_price,
                venue_b_cost,
                spread_cents,
                fee_cents,
                marginal_profit_cents,
                contracts_at_level,
                cumulative_contracts: walk.contracts,
                stopped,
            });

            trace!(
                direction = %direction,
                venue_a_price,
                venue_b_cost,
                marginal_profit_cents,
                contracts_at_level,
                stopped,
                "Depth walk step"
            );

            if stopped {
                break;
            }

            ask_left -= contracts_at_level;
            bid_left -= contracts_at_level;
            if ask_left == 0 {
                i += 1;
                ask_left = asks.get(i).map_or(0, |l| l.size);
            }
            if bid_left == 0 {
                j += 1;
                bid_left = bids.get(j).map_or(0, |l| l.size);
            }
        }

        walk
    }
}

impl Default for DepthWalker {
    fn default() -> Self {
        Self::with_config(FeeModel::new(), &SizingConfig::default())
    }
}
