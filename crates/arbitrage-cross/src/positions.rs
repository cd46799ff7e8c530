//! Open venue exposure derived from the trade log.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use xvenue_core::Venue;

use crate::lifecycle::TradeTier;
use crate::types::TradeAttempt;

/// Contracts still held on one venue for one team in one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub game_id: String,
    pub team: String,
    pub venue: Venue,
    pub contracts: u32,
    /// Contract-weighted average fill price in cents.
    pub avg_price_cents: Decimal,
    /// Contracts held as part of a two-sided hedge.
    pub hedged_contracts: u32,
}

impl Position {
    /// Contracts held without an offsetting leg.
    #[must_use]
    pub fn unhedged_contracts(&self) -> u32 {
        self.contracts.saturating_sub(self.hedged_contracts)
    }

    /// Dollars paid for the position.
    #[must_use]
    pub fn cost_basis(&self) -> Decimal {
        self.avg_price_cents * Decimal::from(self.contracts) / Decimal::ONE_HUNDRED
    }
}

/// True while a trade's filled legs are still held.
///
/// Exited, skipped, settled and reconciled trades hold nothing.
#[must_use]
pub fn holds_exposure(trade: &TradeAttempt) -> bool {
    let closed_tier = match trade.tier {
        Some(tier) => tier.is_unwind() || tier == TradeTier::Skipped,
        None => false,
    };
    !closed_tier && trade.settlement_pnl.is_none() && trade.reconciled_pnl.is_none()
}

#[derive(Default)]
struct Accumulator {
    contracts: u32,
    notional_cents: Decimal,
    hedged: u32,
}

/// Aggregates held legs by game, team and venue.
///
/// Output is ordered by `(game_id, team, venue)`.
#[must_use]
pub fn derive_positions<'a>(trades: impl IntoIterator<Item = &'a TradeAttempt>) -> Vec<Position> {
    let mut book: BTreeMap<(String, String, Venue), Accumulator> = BTreeMap::new();

    for trade in trades.into_iter().filter(|t| holds_exposure(t)) {
        let hedged = trade.tier.is_some_and(TradeTier::is_hedged);

        for venue in [Venue::Polymarket, Venue::Kalshi] {
            let leg = trade.leg(venue);
            let Some(price) = leg.price_cents.filter(|_| leg.is_filled()) else {
                continue;
            };

            let entry = book
                .entry((trade.game_id.clone(), trade.team.clone(), venue))
                .or_default();
            entry.contracts += leg.filled;
            entry.notional_cents += Decimal::from(price) * Decimal::from(leg.filled);
            if hedged {
                entry.hedged += leg.filled;
            }
        }
    }

    book.into_iter()
        .filter(|(_, acc)| acc.contracts > 0)
        .map(|((game_id, team, venue), acc)| Position {
            game_id,
            team,
            venue,
            contracts: acc.contracts,
            avg_price_cents: (acc.notional_cents / Decimal::from(acc.contracts)).normalize(),
            hedged_contracts: acc.hedged,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, LegFill};
    use rust_decimal_macros::dec;

    fn held(id: &str, tier: TradeTier, pm: Option<(u32, u32)>, k: Option<(u32, u32)>) -> TradeAttempt {
        let mut t = TradeAttempt::new(id, Direction::BuyKalshiSellPoly, 10);
        t.game_id = "NBA-LAL-BOS".to_string();
        t.team = "LAL".to_string();
        t.tier = Some(tier);
        if let Some((price, n)) = pm {
            t.polymarket = LegFill::filled(price, n);
        }
        if let Some((price, n)) = k {
            t.kalshi = LegFill::filled(price, n);
        }
        t
    }

    #[test]
    fn test_hedged_pair_creates_two_positions() {
        let trades = vec![held("a", TradeTier::Success, Some((45, 10)), Some((52, 10)))];
        let positions = derive_positions(&trades);

        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].venue, Venue::Polymarket);
        assert_eq!(positions[0].avg_price_cents, dec!(45));
        assert_eq!(positions[1].venue, Venue::Kalshi);
        assert_eq!(positions[1].hedged_contracts, 10);
        assert_eq!(positions[1].unhedged_contracts(), 0);
    }

    #[test]
    fn test_weighted_average_across_trades() {
        let trades = vec![
            held("a", TradeTier::Unhedged, None, Some((50, 10))),
            held("b", TradeTier::Tier3aHold, None, Some((56, 5))),
        ];
        let positions = derive_positions(&trades);

        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].contracts, 15);
        assert_eq!(positions[0].avg_price_cents, dec!(52));
        assert_eq!(positions[0].unhedged_contracts(), 15);
        assert_eq!(positions[0].cost_basis(), dec!(7.80));
    }

    #[test]
    fn test_closed_trades_hold_nothing() {
        let mut settled = held("s", TradeTier::Success, Some((45, 10)), Some((52, 10)));
        settled.settlement_pnl = Some(dec!(0.30));
        let trades = vec![
            held("x", TradeTier::Tier2Exit, None, Some((52, 10))),
            held("u", TradeTier::Tier3Unwind, Some((40, 4)), None),
            held("k", TradeTier::Skipped, None, None),
            settled,
        ];

        assert!(derive_positions(&trades).is_empty());
    }

    #[test]
    fn test_unfilled_leg_price_ignored() {
        let mut t = held("a", TradeTier::Unhedged, None, Some((52, 10)));
        t.polymarket.price_cents = Some(45);

        let positions = derive_positions(&[t]);
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].venue, Venue::Kalshi);
    }
}
