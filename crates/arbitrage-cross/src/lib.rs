//! Sizing and reconciliation core for Kalshi/Polymarket sports arbitrage.
//!
//! An external executor buys complementary "team wins" contracts on both
//! venues. When both legs fill for less than 100 cents combined, the
//! difference minus fees is locked in:
//!
//! ```text
//! Polymarket ask:  45c  (buy YES)
//! Kalshi bid:      48c  (sell YES, i.e. buy NO @ 52c)
//!   Combined cost:   97c
//!   Guaranteed:     100c
//!   Spread:           3c, minus fees
//! ```
//!
//! This crate answers two questions and nothing else:
//!
//! 1. How many contracts can the current depth absorb before fees erase the
//!    edge? See [`DepthWalker`].
//! 2. What actually happened to each attempt, and what did it make or lose?
//!    See [`classify`], [`PnlResolver`] and [`PortfolioAggregator`].
//!
//! # Modules
//!
//! - [`types`]: order books, trade records and balance snapshots
//! - [`fees`]: the single fee model shared by sizing and P&L
//! - [`depth`]: level-by-level depth walk
//! - [`lifecycle`]: trade tier state machine
//! - [`pnl`]: prioritized P&L resolution
//! - [`portfolio`]: roll-up and balance reconciliation
//! - [`positions`]: open exposure by game, team and venue
//!
//! Every entry point is a pure function of its inputs. Nothing here blocks,
//! locks or performs I/O.

pub mod depth;
pub mod error;
pub mod fees;
pub mod lifecycle;
pub mod pnl;
pub mod portfolio;
pub mod positions;
pub mod types;

// Re-export main types for convenience
pub use depth::{DepthWalkLevel, DepthWalker, DirectionWalk, SizingRecommendation};
pub use error::{LedgerError, Result};
pub use fees::{FeeModel, PairFees, KALSHI_TAKER_RATE};
pub use lifecycle::{classify, LegOutcome, LegOutcomes, LifecycleEvent, TradeTier};
pub use pnl::{signed_unwind_cents, PnlResolver, PnlSource, ResolvedPnl, RESOLUTION_CHAIN};
pub use portfolio::{
    CategoryTotals, FillRates, FillStats, PhaseBucket, PnlCategory, PortfolioAggregator,
    PortfolioSummary, Reconciliation, ReconciliationStatus, SpreadBucket, TradeFilter,
};
pub use positions::{derive_positions, holds_exposure, Position};
pub use types::{
    ActualPnl, BalanceSnapshot, Balances, BookSide, Direction, ExecutionPhase, LegFill,
    MarketDepth, OrderBookLevel, SizingDetails, Snapshot, TradeAttempt,
};

#[cfg(test)]
mod tests {
    use super::*;
    use xvenue_core::LedgerConfig;

    #[test]
    fn test_public_api_exports() {
        let _ = FeeModel::new();
        let _ = DepthWalker::default();
        let _ = PnlResolver::default();
        let _ = PortfolioAggregator::default();
        let _ = TradeFilter::default();
    }

    #[test]
    fn test_components_share_configured_fee_model() {
        let config = LedgerConfig::default();
        let fees = FeeModel::with_config(config.fees);
        let walker = DepthWalker::with_config(fees, &config.sizing);
        let resolver = PnlResolver::new(fees);

        assert_eq!(walker.fee_model(), resolver.fee_model());
    }
}
