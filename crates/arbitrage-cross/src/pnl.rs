//! Realized and open P&L resolution for a single trade attempt.
//!
//! Several upstream sources can describe the same trade, and they do not
//! always agree. [`PnlResolver`] walks a fixed [`RESOLUTION_CHAIN`] from the
//! most to the least trusted source and stops at the first one present:
//!
//! 1. [`PnlSource::Reconciled`]: ledger-reconciled cash movement
//! 2. [`PnlSource::Settlement`]: venue-reported settlement
//! 3. [`PnlSource::Unwind`]: signed close-out P&L of an exited leg
//! 4. [`PnlSource::Actual`]: breakdown computed when both legs filled
//! 5. [`PnlSource::Estimate`]: sizing-time edge of a hedged or untiered
//!    record, a placeholder only
//! 6. [`PnlSource::NoFill`]: skipped attempts, which hold nothing
//!
//! Recency, averaging and magnitude never influence the choice. A record with
//! no usable source resolves as open with no number.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::fees::FeeModel;
use crate::lifecycle::TradeTier;
use crate::types::TradeAttempt;

// =============================================================================
// Sources
// =============================================================================

/// One P&L source, in trust order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PnlSource {
    Reconciled,
    Settlement,
    Unwind,
    Actual,
    Estimate,
    NoFill,
}

/// Resolution order; earlier entries always win.
pub const RESOLUTION_CHAIN: [PnlSource; 6] = [
    PnlSource::Reconciled,
    PnlSource::Settlement,
    PnlSource::Unwind,
    PnlSource::Actual,
    PnlSource::Estimate,
    PnlSource::NoFill,
];

impl PnlSource {
    /// Total P&L in dollars from this source alone, if it applies.
    #[must_use]
    pub fn total(self, trade: &TradeAttempt, fees: &FeeModel) -> Option<Decimal> {
        match self {
            Self::Reconciled => trade.reconciled_pnl,
            Self::Settlement => trade.settlement_pnl,
            Self::Unwind => unwind_total(trade),
            Self::Actual => trade.actual_pnl.as_ref().map(|a| a.net),
            Self::Estimate => estimate_total(trade, fees),
            Self::NoFill => (trade.tier == Some(TradeTier::Skipped)).then_some(Decimal::ZERO),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reconciled => "reconciled",
            Self::Settlement => "settlement",
            Self::Unwind => "unwind",
            Self::Actual => "actual",
            Self::Estimate => "estimate",
            Self::NoFill => "no_fill",
        }
    }
}

impl std::fmt::Display for PnlSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Signed close-out P&L in cents for an exited leg.
///
/// Prefers the explicit signed field, then recomputes from the lone filled
/// leg's price and the unwind price, then falls back to the legacy unsigned
/// field, which is always a loss.
#[must_use]
pub fn signed_unwind_cents(trade: &TradeAttempt) -> Option<Decimal> {
    if let Some(cents) = trade.unwind_pnl_cents {
        return Some(cents);
    }
    if let Some(cents) = recompute_unwind_cents(trade) {
        return Some(cents);
    }
    trade.unwind_loss_cents.map(|loss| -loss.abs())
}

fn recompute_unwind_cents(trade: &TradeAttempt) -> Option<Decimal> {
    let (_, leg) = trade.sole_filled_leg()?;
    let fill = i64::from(leg.price_cents?);
    let unwind = i64::from(trade.unwind_fill_price?);
    let per_contract = (unwind - fill) * trade.direction.unwind_sign();
    Some(Decimal::from(per_contract) * Decimal::from(trade.quantity()))
}

fn unwind_total(trade: &TradeAttempt) -> Option<Decimal> {
    if !trade.tier.is_some_and(TradeTier::is_unwind) {
        return None;
    }
    signed_unwind_cents(trade).map(|cents| cents / dec!(100))
}

/// Only hedged outcomes captured a spread; a failed leg never did.
fn estimate_total(trade: &TradeAttempt, fees: &FeeModel) -> Option<Decimal> {
    if !matches!(
        trade.tier,
        None | Some(TradeTier::Success | TradeTier::Recovered)
    ) {
        return None;
    }
    let per_contract_cents = match trade.estimated_net_profit_cents {
        Some(cents) => cents,
        None => {
            let spread = trade.spread_cents?;
            let fee = fees.pair_fee_cents(
                trade.polymarket.price_cents?,
                trade.kalshi.price_cents?,
            );
            Decimal::from(spread - i64::from(fee))
        }
    };
    Some(per_contract_cents * Decimal::from(trade.contracts_filled) / dec!(100))
}

// =============================================================================
// Resolution Result
// =============================================================================

/// Resolved P&L for one trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPnl {
    /// Dollars per contract, `None` when open or quantity is zero.
    pub per_contract: Option<Decimal>,
    /// Dollars for the whole quantity, `None` when open.
    pub total: Option<Decimal>,
    /// Filled contracts if any, else intended.
    pub quantity: u32,
    /// No realized figure exists yet.
    pub is_open: bool,
    /// Source that produced `total`.
    pub source: Option<PnlSource>,
}

impl ResolvedPnl {
    fn realized(total: Decimal, quantity: u32, source: PnlSource) -> Self {
        let per_contract = (quantity > 0).then(|| total / Decimal::from(quantity));
        Self {
            per_contract,
            total: Some(total),
            quantity,
            is_open: false,
            source: Some(source),
        }
    }

    fn open(quantity: u32) -> Self {
        Self {
            per_contract: None,
            total: None,
            quantity,
            is_open: true,
            source: None,
        }
    }

    /// Positive realized total.
    #[must_use]
    pub fn is_win(&self) -> bool {
        self.total.is_some_and(|t| t > Decimal::ZERO)
    }

    /// Negative realized total.
    #[must_use]
    pub fn is_loss(&self) -> bool {
        self.total.is_some_and(|t| t < Decimal::ZERO)
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Resolves trade P&L through the fixed source chain.
#[derive(Debug, Clone, Default)]
pub struct PnlResolver {
    fees: FeeModel,
}

impl PnlResolver {
    /// Creates a resolver sharing `fees` with the depth walker.
    #[must_use]
    pub fn new(fees: FeeModel) -> Self {
        Self { fees }
    }

    /// Returns the fee model.
    #[must_use]
    pub fn fee_model(&self) -> &FeeModel {
        &self.fees
    }

    /// Resolves one trade.
    #[must_use]
    pub fn resolve(&self, trade: &TradeAttempt) -> ResolvedPnl {
        let quantity = trade.quantity();

        for source in RESOLUTION_CHAIN {
            if let Some(total) = source.total(trade, &self.fees) {
                trace!(trade_id = %trade.id, source = %source, total = %total, "P&L resolved");
                return ResolvedPnl::realized(total, quantity, source);
            }
        }

        trace!(trade_id = %trade.id, tier = ?trade.tier, "P&L open");
        ResolvedPnl::open(quantity)
    }

    /// Resolves every trade independently, preserving order.
    #[must_use]
    pub fn resolve_all<'a>(
        &self,
        trades: impl IntoIterator<Item = &'a TradeAttempt>,
    ) -> Vec<(&'a TradeAttempt, ResolvedPnl)> {
        trades
            .into_iter()
            .map(|trade| (trade, self.resolve(trade)))
            .collect()
    }
}
