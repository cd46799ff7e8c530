//! Shared types for cross-venue sizing and reconciliation.
//!
//! Everything here is plain data deserialized from the upstream snapshot.
//! Optional numeric fields stay `None` when absent; they mean "not yet
//! known" and are never read as zero.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use xvenue_core::Venue;

use crate::depth::DepthWalkLevel;
use crate::error::{LedgerError, Result};
use crate::lifecycle::{LifecycleEvent, TradeTier};

// =============================================================================
// Direction
// =============================================================================

/// Which venue's YES contract is bought; the other venue carries the
/// complementary (NO) leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Buy YES on Kalshi, sell YES (buy NO) on Polymarket.
    #[serde(rename = "BUY_K_SELL_PM")]
    BuyKalshiSellPoly,
    /// Buy YES on Polymarket, sell YES (buy NO) on Kalshi.
    #[serde(rename = "BUY_PM_SELL_K")]
    BuyPolySellKalshi,
}

impl Direction {
    /// Venue whose YES contract is bought.
    #[must_use]
    pub fn buy_venue(self) -> Venue {
        match self {
            Self::BuyKalshiSellPoly => Venue::Kalshi,
            Self::BuyPolySellKalshi => Venue::Polymarket,
        }
    }

    /// Sign applied to `(unwind price - fill price)` when closing a leg.
    ///
    /// `BUY_K_SELL_PM` gains when the unwind price rises above the fill
    /// price, `BUY_PM_SELL_K` gains when it falls.
    #[must_use]
    pub fn unwind_sign(self) -> i64 {
        match self {
            Self::BuyKalshiSellPoly => 1,
            Self::BuyPolySellKalshi => -1,
        }
    }

    /// Returns the wire label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BuyKalshiSellPoly => "BUY_K_SELL_PM",
            Self::BuyPolySellKalshi => "BUY_PM_SELL_K",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Order Book
// =============================================================================

/// Side of an order-book level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookSide {
    Bid,
    Ask,
}

/// One price level of a venue's YES book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookLevel {
    pub venue: Venue,
    pub side: BookSide,
    /// Price in integer cents (1-99).
    pub price_cents: u32,
    /// Contracts resting at this price.
    pub size: u32,
}

impl OrderBookLevel {
    #[must_use]
    pub fn new(venue: Venue, side: BookSide, price_cents: u32, size: u32) -> Self {
        Self {
            venue,
            side,
            price_cents,
            size,
        }
    }

    /// A level is usable when it has size and a tradeable binary price.
    #[must_use]
    pub fn is_tradeable(&self) -> bool {
        self.size > 0 && (1..=99).contains(&self.price_cents)
    }
}

/// YES-book depth for one binary market on both venues.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketDepth {
    pub polymarket_bids: Vec<OrderBookLevel>,
    pub polymarket_asks: Vec<OrderBookLevel>,
    pub kalshi_bids: Vec<OrderBookLevel>,
    pub kalshi_asks: Vec<OrderBookLevel>,
}

impl MarketDepth {
    /// Builds depth from an unordered set of rows, routing each by venue and side.
    #[must_use]
    pub fn from_levels(levels: impl IntoIterator<Item = OrderBookLevel>) -> Self {
        let mut depth = Self::default();
        for level in levels {
            match (level.venue, level.side) {
                (Venue::Polymarket, BookSide::Bid) => depth.polymarket_bids.push(level),
                (Venue::Polymarket, BookSide::Ask) => depth.polymarket_asks.push(level),
                (Venue::Kalshi, BookSide::Bid) => depth.kalshi_bids.push(level),
                (Venue::Kalshi, BookSide::Ask) => depth.kalshi_asks.push(level),
            }
        }
        depth
    }

    /// Returns the levels for a venue and side.
    #[must_use]
    pub fn levels(&self, venue: Venue, side: BookSide) -> &[OrderBookLevel] {
        match (venue, side) {
            (Venue::Polymarket, BookSide::Bid) => &self.polymarket_bids,
            (Venue::Polymarket, BookSide::Ask) => &self.polymarket_asks,
            (Venue::Kalshi, BookSide::Bid) => &self.kalshi_bids,
            (Venue::Kalshi, BookSide::Ask) => &self.kalshi_asks,
        }
    }

    /// True when the venue is missing tradeable levels on either side.
    #[must_use]
    pub fn is_one_sided(&self, venue: Venue) -> bool {
        [BookSide::Bid, BookSide::Ask]
            .iter()
            .any(|&side| !self.levels(venue, side).iter().any(OrderBookLevel::is_tradeable))
    }
}

// =============================================================================
// Trade Records
// =============================================================================

/// How the order that opened the trade was worked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPhase {
    /// Posted to the book and waited for a counterparty.
    Resting,
    /// Crossed the spread immediately (IOC/FOK).
    Immediate,
}

impl ExecutionPhase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resting => "resting",
            Self::Immediate => "immediate",
        }
    }
}

/// Fill data for one leg of a trade attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegFill {
    /// Execution price in cents, if the order reached the venue.
    pub price_cents: Option<u32>,
    /// Contracts filled on this leg.
    pub filled: u32,
    /// Fee paid on this leg in dollars.
    pub fee: Option<Decimal>,
}

impl LegFill {
    #[must_use]
    pub fn filled(price_cents: u32, filled: u32) -> Self {
        Self {
            price_cents: Some(price_cents),
            filled,
            fee: None,
        }
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.filled > 0
    }
}

/// P&L breakdown computed right after both legs filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualPnl {
    pub cost: Decimal,
    pub payout: Decimal,
    pub gross: Decimal,
    pub fees: Decimal,
    pub net: Decimal,
}

/// Sizing audit trail attached to a trade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingDetails {
    pub ladder: Vec<DepthWalkLevel>,
    pub recommended_contracts: u32,
}

/// One arbitrage attempt as reported by the executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeAttempt {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub sport: String,
    #[serde(default)]
    pub game_id: String,
    #[serde(default)]
    pub team: String,
    pub direction: Direction,

    #[serde(default)]
    pub polymarket: LegFill,
    #[serde(default)]
    pub kalshi: LegFill,

    pub contracts_intended: u32,
    #[serde(default)]
    pub contracts_filled: u32,

    #[serde(default)]
    pub tier: Option<TradeTier>,
    #[serde(default)]
    pub execution_phase: Option<ExecutionPhase>,
    /// Live money (`true`) or paper trading (`false`).
    #[serde(default = "default_live")]
    pub live: bool,

    /// Gross spread in cents at sizing time.
    #[serde(default)]
    pub spread_cents: Option<i64>,
    /// Expected net profit per contract in cents at sizing time.
    #[serde(default)]
    pub estimated_net_profit_cents: Option<Decimal>,

    /// Venue-reported settlement result, dollars.
    #[serde(default)]
    pub settlement_pnl: Option<Decimal>,
    /// Ledger-reconciled cash P&L, dollars. Freezes the record once set.
    #[serde(default)]
    pub reconciled_pnl: Option<Decimal>,
    /// Price the filled leg was closed at, cents.
    #[serde(default)]
    pub unwind_fill_price: Option<u32>,
    /// Signed unwind P&L in cents for the whole quantity.
    #[serde(default)]
    pub unwind_pnl_cents: Option<Decimal>,
    /// Legacy unwind field. Unsigned and always a loss: older writers could
    /// not record a gain, and an absent value cannot be told apart from a
    /// zero loss.
    #[serde(default)]
    pub unwind_loss_cents: Option<Decimal>,
    #[serde(default)]
    pub actual_pnl: Option<ActualPnl>,
    #[serde(default)]
    pub sizing_details: Option<SizingDetails>,
}

fn default_live() -> bool {
    true
}

impl TradeAttempt {
    /// Creates an attempt with no fills yet.
    #[must_use]
    pub fn new(id: impl Into<String>, direction: Direction, contracts_intended: u32) -> Self {
        Self {
            id: id.into(),
            timestamp: Utc::now(),
            sport: String::new(),
            game_id: String::new(),
            team: String::new(),
            direction,
            polymarket: LegFill::default(),
            kalshi: LegFill::default(),
            contracts_intended,
            contracts_filled: 0,
            tier: Some(TradeTier::Pending),
            execution_phase: None,
            live: true,
            spread_cents: None,
            estimated_net_profit_cents: None,
            settlement_pnl: None,
            reconciled_pnl: None,
            unwind_fill_price: None,
            unwind_pnl_cents: None,
            unwind_loss_cents: None,
            actual_pnl: None,
            sizing_details: None,
        }
    }

    /// Contracts the P&L is computed over: filled if any, else intended.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        if self.contracts_filled > 0 {
            self.contracts_filled
        } else {
            self.contracts_intended
        }
    }

    /// Returns the leg on `venue`.
    #[must_use]
    pub fn leg(&self, venue: Venue) -> &LegFill {
        match venue {
            Venue::Polymarket => &self.polymarket,
            Venue::Kalshi => &self.kalshi,
        }
    }

    fn leg_mut(&mut self, venue: Venue) -> &mut LegFill {
        match venue {
            Venue::Polymarket => &mut self.polymarket,
            Venue::Kalshi => &mut self.kalshi,
        }
    }

    /// The single filled leg, when exactly one leg filled.
    #[must_use]
    pub fn sole_filled_leg(&self) -> Option<(Venue, &LegFill)> {
        match (self.polymarket.is_filled(), self.kalshi.is_filled()) {
            (true, false) => Some((Venue::Polymarket, &self.polymarket)),
            (false, true) => Some((Venue::Kalshi, &self.kalshi)),
            _ => None,
        }
    }

    /// True once ledger-reconciled P&L is attached.
    #[must_use]
    pub fn is_reconciled(&self) -> bool {
        self.reconciled_pnl.is_some()
    }

    /// True when any contracts filled on `venue`.
    #[must_use]
    pub fn touches_venue(&self, venue: Venue) -> bool {
        self.leg(venue).is_filled()
    }

    /// Sum of the leg fees that were actually recorded.
    #[must_use]
    pub fn recorded_fees(&self) -> Option<Decimal> {
        match (self.polymarket.fee, self.kalshi.fee) {
            (None, None) => None,
            (a, b) => Some(a.unwrap_or_default() + b.unwrap_or_default()),
        }
    }

    /// Checks the structural invariants of the record.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::OverFilled`] or [`LedgerError::NegativeFee`].
    pub fn validate(&self) -> Result<()> {
        if self.contracts_filled > self.contracts_intended {
            return Err(LedgerError::OverFilled {
                trade_id: self.id.clone(),
                filled: self.contracts_filled,
                intended: self.contracts_intended,
            });
        }
        for venue in [Venue::Polymarket, Venue::Kalshi] {
            if self.leg(venue).fee.is_some_and(|fee| fee.is_sign_negative() && !fee.is_zero()) {
                return Err(LedgerError::NegativeFee {
                    trade_id: self.id.clone(),
                    venue,
                });
            }
        }
        Ok(())
    }

    /// Records a fill on one leg.
    ///
    /// `contracts_filled` tracks the hedged quantity when both legs filled and
    /// the single-leg quantity otherwise.
    ///
    /// # Errors
    ///
    /// Fails on a reconciled record or when the fill exceeds the intended size.
    pub fn record_fill(&mut self, venue: Venue, price_cents: u32, contracts: u32) -> Result<()> {
        self.ensure_mutable()?;
        let intended = self.contracts_intended;
        let filled = self.leg(venue).filled + contracts;
        if filled > intended {
            return Err(LedgerError::OverFilled {
                trade_id: self.id.clone(),
                filled,
                intended,
            });
        }
        let leg = self.leg_mut(venue);
        leg.filled = filled;
        leg.price_cents = Some(price_cents);

        self.contracts_filled = match (self.polymarket.filled, self.kalshi.filled) {
            (0, k) => k,
            (p, 0) => p,
            (p, k) => p.min(k),
        };
        Ok(())
    }

    /// Advances the lifecycle tier with an observed event.
    ///
    /// # Errors
    ///
    /// Fails on a reconciled record or an illegal transition.
    pub fn apply_event(&mut self, event: LifecycleEvent) -> Result<TradeTier> {
        self.ensure_mutable()?;
        let next = self.tier.unwrap_or(TradeTier::Pending).apply(event)?;
        self.tier = Some(next);
        Ok(next)
    }

    /// Attaches ledger-reconciled P&L, freezing the record.
    ///
    /// # Errors
    ///
    /// Fails if the record is already reconciled.
    pub fn reconcile(&mut self, pnl: Decimal) -> Result<()> {
        self.ensure_mutable()?;
        self.reconciled_pnl = Some(pnl);
        Ok(())
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.is_reconciled() {
            return Err(LedgerError::TerminalRecord {
                trade_id: self.id.clone(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Balances & Snapshot
// =============================================================================

/// Cash and portfolio value on one venue at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub venue: Venue,
    pub cash: Decimal,
    /// Cash plus marked value of open positions.
    pub portfolio_value: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Starting and current balances for reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Balances {
    pub starting: Vec<BalanceSnapshot>,
    pub current: Vec<BalanceSnapshot>,
}

/// One polling cycle's worth of upstream data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the upstream data was collected.
    pub as_of: DateTime<Utc>,
    #[serde(default)]
    pub order_books: Vec<OrderBookLevel>,
    #[serde(default)]
    pub trades: Vec<TradeAttempt>,
    #[serde(default)]
    pub balances: Balances,
}
