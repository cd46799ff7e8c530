//! Portfolio roll-up and balance reconciliation.
//!
//! [`PortfolioAggregator`] recomputes everything from scratch on each call:
//! it never caches and never mutates its inputs.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use xvenue_core::{ReconciliationConfig, Venue};

use crate::lifecycle::TradeTier;
use crate::pnl::{PnlResolver, ResolvedPnl};
use crate::positions::{derive_positions, Position};
use crate::types::{BalanceSnapshot, Balances, ExecutionPhase, TradeAttempt};

// =============================================================================
// Filtering
// =============================================================================

/// Restricts which trades enter a summary. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeFilter {
    /// Inclusive lower bound on the attempt timestamp.
    pub since: Option<DateTime<Utc>>,
    /// Exclusive upper bound on the attempt timestamp.
    pub until: Option<DateTime<Utc>>,
    /// Only trades with a fill on this venue. Also narrows balances.
    pub venue: Option<Venue>,
    /// Case-insensitive sport match.
    pub sport: Option<String>,
    /// Live (`true`) or paper (`false`) trades only.
    pub live: Option<bool>,
}

impl TradeFilter {
    #[must_use]
    pub fn matches(&self, trade: &TradeAttempt) -> bool {
        if self.since.is_some_and(|since| trade.timestamp < since) {
            return false;
        }
        if self.until.is_some_and(|until| trade.timestamp >= until) {
            return false;
        }
        if self.venue.is_some_and(|venue| !trade.touches_venue(venue)) {
            return false;
        }
        if let Some(sport) = &self.sport {
            if !trade.sport.eq_ignore_ascii_case(sport) {
                return false;
            }
        }
        if self.live.is_some_and(|live| trade.live != live) {
            return false;
        }
        true
    }
}

// =============================================================================
// Categories
// =============================================================================

/// Where a trade's P&L is booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PnlCategory {
    /// Hedged pairs, recoveries and untiered records.
    Arbitrage,
    /// Single legs closed out at market.
    Exited,
    /// Single legs still carrying directional risk.
    Directional,
}

impl PnlCategory {
    #[must_use]
    pub fn for_tier(tier: Option<TradeTier>) -> Self {
        match tier {
            None
            | Some(TradeTier::Success | TradeTier::Recovered | TradeTier::Skipped) => Self::Arbitrage,
            Some(TradeTier::Tier2Exit | TradeTier::Tier3Unwind) => Self::Exited,
            Some(
                TradeTier::Pending
                | TradeTier::Unhedged
                | TradeTier::Tier3aHold
                | TradeTier::Tier3OppositeHedge
                | TradeTier::Tier3OppositeOverweight,
            ) => Self::Directional,
        }
    }
}

/// Realized P&L per category, in dollars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub arbitrage: Decimal,
    pub exited: Decimal,
    pub directional: Decimal,
}

impl CategoryTotals {
    fn add(&mut self, category: PnlCategory, amount: Decimal) {
        match category {
            PnlCategory::Arbitrage => self.arbitrage += amount,
            PnlCategory::Exited => self.exited += amount,
            PnlCategory::Directional => self.directional += amount,
        }
    }

    /// The only definition of net P&L.
    #[must_use]
    pub fn net_total(&self) -> Decimal {
        self.arbitrage + self.exited + self.directional
    }
}

// =============================================================================
// Fill Rates
// =============================================================================

/// Spread size at sizing time, in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadBucket {
    AtMostOne,
    Two,
    ThreeToFour,
    FivePlus,
    Unknown,
}

impl SpreadBucket {
    #[must_use]
    pub fn from_spread(spread_cents: Option<i64>) -> Self {
        match spread_cents {
            None => Self::Unknown,
            Some(s) if s <= 1 => Self::AtMostOne,
            Some(2) => Self::Two,
            Some(3 | 4) => Self::ThreeToFour,
            Some(_) => Self::FivePlus,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::AtMostOne => "<=1c",
            Self::Two => "2c",
            Self::ThreeToFour => "3-4c",
            Self::FivePlus => ">=5c",
            Self::Unknown => "unknown",
        }
    }
}

/// Execution phase bucket, with a slot for records that never logged one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseBucket {
    Resting,
    Immediate,
    Unknown,
}

impl From<Option<ExecutionPhase>> for PhaseBucket {
    fn from(phase: Option<ExecutionPhase>) -> Self {
        match phase {
            Some(ExecutionPhase::Resting) => Self::Resting,
            Some(ExecutionPhase::Immediate) => Self::Immediate,
            None => Self::Unknown,
        }
    }
}

/// Leg fill outcome counts for one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillStats {
    pub attempts: u32,
    /// Both legs filled.
    pub hedged: u32,
    /// Exactly one leg filled.
    pub one_leg: u32,
    /// Neither leg filled.
    pub no_fill: u32,
}

impl FillStats {
    fn record(&mut self, trade: &TradeAttempt) {
        self.attempts += 1;
        match (trade.polymarket.is_filled(), trade.kalshi.is_filled()) {
            (true, true) => self.hedged += 1,
            (false, false) => self.no_fill += 1,
            _ => self.one_leg += 1,
        }
    }

    /// Fraction of attempts with both legs filled.
    #[must_use]
    pub fn hedged_rate(&self) -> Option<Decimal> {
        (self.attempts > 0).then(|| Decimal::from(self.hedged) / Decimal::from(self.attempts))
    }
}

/// Fill outcomes by execution phase and by spread bucket.
///
/// Pending attempts are still in flight and are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillRates {
    pub by_phase: BTreeMap<PhaseBucket, FillStats>,
    pub by_spread: BTreeMap<SpreadBucket, FillStats>,
}

impl FillRates {
    fn record(&mut self, trade: &TradeAttempt) {
        if trade.tier == Some(TradeTier::Pending) {
            return;
        }
        self.by_phase
            .entry(PhaseBucket::from(trade.execution_phase))
            .or_default()
            .record(trade);
        self.by_spread
            .entry(SpreadBucket::from_spread(trade.spread_cents))
            .or_default()
            .record(trade);
    }
}

// =============================================================================
// Reconciliation
// =============================================================================

/// Outcome of checking realized P&L against observed balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconciliationStatus {
    /// Balances agree within tolerance.
    Reconciled,
    /// Disagreement that stale or incomplete data may still explain.
    Pending,
    /// Disagreement with fresh, complete data.
    Mismatch,
}

impl std::fmt::Display for ReconciliationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Reconciled => "RECONCILED",
            Self::Pending => "PENDING",
            Self::Mismatch => "MISMATCH",
        };
        write!(f, "{s}")
    }
}

/// Balance check detail. Missing balances stay `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub starting_balance: Option<Decimal>,
    pub net_total: Decimal,
    /// `starting_balance + net_total`.
    pub expected: Option<Decimal>,
    pub current_value: Option<Decimal>,
    /// `current_value - expected`.
    pub difference: Option<Decimal>,
    pub status: ReconciliationStatus,
}

fn pick_per_venue(
    snapshots: &[BalanceSnapshot],
    venue: Option<Venue>,
    earliest: bool,
) -> BTreeMap<&'static str, &BalanceSnapshot> {
    let mut picked: BTreeMap<&'static str, &BalanceSnapshot> = BTreeMap::new();
    for snap in snapshots
        .iter()
        .filter(|s| venue.map_or(true, |v| s.venue == v))
    {
        picked
            .entry(snap.venue.as_str())
            .and_modify(|current| {
                let replace = if earliest {
                    snap.timestamp < current.timestamp
                } else {
                    snap.timestamp > current.timestamp
                };
                if replace {
                    *current = snap;
                }
            })
            .or_insert(snap);
    }
    picked
}

// =============================================================================
// Summary
// =============================================================================

/// Everything derived from one aggregation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub trade_count: usize,
    pub wins: usize,
    pub losses: usize,
    pub flat: usize,
    pub open: usize,
    /// Recorded leg fees only; unknown fees are not estimated.
    pub total_fees: Decimal,
    pub categories: CategoryTotals,
    /// Always `categories.net_total()`.
    pub net_total: Decimal,
    pub reconciliation: Reconciliation,
    pub fill_rates: FillRates,
    pub positions: Vec<Position>,
}

impl PortfolioSummary {
    /// Wins over decided trades.
    #[must_use]
    pub fn win_rate(&self) -> Option<Decimal> {
        let decided = self.wins + self.losses;
        (decided > 0).then(|| Decimal::from(self.wins) / Decimal::from(decided))
    }
}

/// Rolls resolved trades up into a [`PortfolioSummary`].
#[derive(Debug, Clone, Default)]
pub struct PortfolioAggregator {
    resolver: PnlResolver,
    config: ReconciliationConfig,
}

impl PortfolioAggregator {
    #[must_use]
    pub fn new(resolver: PnlResolver, config: ReconciliationConfig) -> Self {
        Self { resolver, config }
    }

    #[must_use]
    pub fn resolver(&self) -> &PnlResolver {
        &self.resolver
    }

    /// Aggregates the trades that pass `filter` and reconciles against
    /// `balances` as of `as_of`.
    #[must_use]
    pub fn aggregate(
        &self,
        trades: &[TradeAttempt],
        filter: &TradeFilter,
        balances: &Balances,
        as_of: DateTime<Utc>,
    ) -> PortfolioSummary {
        let selected: Vec<&TradeAttempt> = trades.iter().filter(|t| filter.matches(t)).collect();

        let mut categories = CategoryTotals::default();
        let mut fill_rates = FillRates::default();
        let mut total_fees = Decimal::ZERO;
        let (mut wins, mut losses, mut flat, mut open) = (0, 0, 0, 0);

        for (trade, resolved) in self.resolver.resolve_all(selected.iter().copied()) {
            tally(&resolved, &mut wins, &mut losses, &mut flat, &mut open);
            if let Some(total) = resolved.total {
                categories.add(PnlCategory::for_tier(trade.tier), total);
            }
            if let Some(fees) = trade.recorded_fees() {
                total_fees += fees;
            }
            fill_rates.record(trade);
        }

        let net_total = categories.net_total();
        let reconciliation = self.reconcile(net_total, balances, filter.venue, open > 0, as_of);

        debug!(
            trades = selected.len(),
            wins,
            losses,
            open,
            net_total = %net_total,
            status = %reconciliation.status,
            "Portfolio aggregated"
        );

        PortfolioSummary {
            trade_count: selected.len(),
            wins,
            losses,
            flat,
            open,
            total_fees,
            categories,
            net_total,
            reconciliation,
            fill_rates,
            positions: derive_positions(selected.iter().copied()),
        }
    }

    /// Compares `starting + net_total` with the current portfolio value.
    ///
    /// A venue-scoped check is always `Pending`: trade P&L spans both legs,
    /// so one venue's balances cannot confirm or refute it.
    #[must_use]
    pub fn reconcile(
        &self,
        net_total: Decimal,
        balances: &Balances,
        venue: Option<Venue>,
        has_open: bool,
        as_of: DateTime<Utc>,
    ) -> Reconciliation {
        let starting = pick_per_venue(&balances.starting, venue, true);
        let current = pick_per_venue(&balances.current, venue, false);

        let complete = !starting.is_empty() && starting.keys().eq(current.keys());
        let starting_balance = (!starting.is_empty())
            .then(|| starting.values().map(|s| s.portfolio_value).sum::<Decimal>());
        let current_value = (!current.is_empty())
            .then(|| current.values().map(|s| s.portfolio_value).sum::<Decimal>());

        let expected = starting_balance.map(|s| s + net_total);
        let difference = match (current_value, expected) {
            (Some(c), Some(e)) => Some(c - e),
            _ => None,
        };

        let stale_cutoff = as_of - Duration::seconds(self.config.stale_after_secs);
        let stale = current.values().any(|s| s.timestamp < stale_cutoff);

        let status = match difference {
            _ if venue.is_some() => ReconciliationStatus::Pending,
            Some(diff) if diff.abs() <= self.config.tolerance => ReconciliationStatus::Reconciled,
            Some(_) if stale || has_open || !complete => ReconciliationStatus::Pending,
            Some(diff) => {
                warn!(difference = %diff, tolerance = %self.config.tolerance, "Balance mismatch");
                ReconciliationStatus::Mismatch
            }
            None => ReconciliationStatus::Pending,
        };

        Reconciliation {
            starting_balance,
            net_total,
            expected,
            current_value,
            difference,
            status,
        }
    }
}

fn tally(
    resolved: &ResolvedPnl,
    wins: &mut usize,
    losses: &mut usize,
    flat: &mut usize,
    open: &mut usize,
) {
    if resolved.is_open {
        *open += 1;
    } else if resolved.is_win() {
        *wins += 1;
    } else if resolved.is_loss() {
        *losses += 1;
    } else {
        *flat += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, LegFill};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    // ==================== Helper Functions ====================

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 20, 0, 0).unwrap()
    }

    fn snapshot(venue: Venue, value: Decimal, age_secs: i64) -> BalanceSnapshot {
        BalanceSnapshot {
            venue,
            cash: value,
            portfolio_value: value,
            timestamp: now() - Duration::seconds(age_secs),
        }
    }

    fn balances(start: Decimal, current: Decimal) -> Balances {
        Balances {
            starting: vec![
                snapshot(Venue::Kalshi, start / dec!(2), 3600),
                snapshot(Venue::Polymarket, start / dec!(2), 3600),
            ],
            current: vec![
                snapshot(Venue::Kalshi, current / dec!(2), 5),
                snapshot(Venue::Polymarket, current / dec!(2), 5),
            ],
        }
    }

    fn settled(id: &str, tier: TradeTier, pnl: Decimal) -> TradeAttempt {
        let mut t = TradeAttempt::new(id, Direction::BuyKalshiSellPoly, 10);
        t.timestamp = now() - Duration::minutes(30);
        t.sport = "NBA".to_string();
        t.tier = Some(tier);
        t.settlement_pnl = Some(pnl);
        t
    }

    fn fifteen_thirty_two() -> Vec<TradeAttempt> {
        vec![
            settled("a", TradeTier::Success, dec!(12.00)),
            settled("b", TradeTier::Tier2Exit, dec!(-0.68)),
            settled("c", TradeTier::Tier3aHold, dec!(4.00)),
        ]
    }

    // ==================== Reconciliation Tests ====================

    #[test]
    fn test_reconciled_within_tolerance() {
        let summary = PortfolioAggregator::default().aggregate(
            &fifteen_thirty_two(),
            &TradeFilter::default(),
            &balances(dec!(900.00), dec!(915.40)),
            now(),
        );

        assert_eq!(summary.net_total, dec!(15.32));
        let rec = &summary.reconciliation;
        assert_eq!(rec.expected, Some(dec!(915.32)));
        assert_eq!(rec.difference, Some(dec!(0.08)));
        assert_eq!(rec.status, ReconciliationStatus::Reconciled);
    }

    #[test]
    fn test_mismatch_outside_tolerance() {
        let summary = PortfolioAggregator::default().aggregate(
            &fifteen_thirty_two(),
            &TradeFilter::default(),
            &balances(dec!(900.00), dec!(920.00)),
            now(),
        );

        assert_eq!(summary.reconciliation.difference, Some(dec!(4.68)));
        assert_eq!(summary.reconciliation.status, ReconciliationStatus::Mismatch);
    }

    #[test]
    fn test_pending_when_snapshots_stale() {
        let mut b = balances(dec!(900.00), dec!(920.00));
        b.current[0].timestamp = now() - Duration::seconds(600);

        let summary = PortfolioAggregator::default().aggregate(
            &fifteen_thirty_two(),
            &TradeFilter::default(),
            &b,
            now(),
        );
        assert_eq!(summary.reconciliation.status, ReconciliationStatus::Pending);
    }

    #[test]
    fn test_pending_when_open_trades_exist() {
        let mut trades = fifteen_thirty_two();
        let mut open = TradeAttempt::new("o", Direction::BuyPolySellKalshi, 5);
        open.tier = Some(TradeTier::Unhedged);
        trades.push(open);

        let summary = PortfolioAggregator::default().aggregate(
            &trades,
            &TradeFilter::default(),
            &balances(dec!(900.00), dec!(920.00)),
            now(),
        );
        assert_eq!(summary.open, 1);
        assert_eq!(summary.reconciliation.status, ReconciliationStatus::Pending);
    }

    #[test]
    fn test_pending_when_balances_missing() {
        let summary = PortfolioAggregator::default().aggregate(
            &fifteen_thirty_two(),
            &TradeFilter::default(),
            &Balances::default(),
            now(),
        );

        let rec = &summary.reconciliation;
        assert_eq!(rec.status, ReconciliationStatus::Pending);
        assert!(rec.difference.is_none());
        assert!(rec.starting_balance.is_none());
    }

    #[test]
    fn test_pending_when_venue_missing_from_current() {
        let mut b = balances(dec!(900.00), dec!(920.00));
        b.current.retain(|s| s.venue == Venue::Kalshi);

        let summary = PortfolioAggregator::default().aggregate(
            &fifteen_thirty_two(),
            &TradeFilter::default(),
            &b,
            now(),
        );
        assert_eq!(summary.reconciliation.status, ReconciliationStatus::Pending);
    }

    #[test]
    fn test_venue_scoped_reconciliation_is_pending() {
        let mut hedged = settled("h", TradeTier::Success, dec!(0.30));
        hedged.polymarket = LegFill::filled(45, 10);
        hedged.kalshi = LegFill::filled(52, 10);
        let trades = vec![hedged];
        let b = Balances {
            starting: vec![
                snapshot(Venue::Kalshi, dec!(100.00), 3600),
                snapshot(Venue::Polymarket, dec!(100.00), 3600),
            ],
            current: vec![
                snapshot(Venue::Kalshi, dec!(104.80), 5),
                snapshot(Venue::Polymarket, dec!(95.50), 5),
            ],
        };
        let aggregator = PortfolioAggregator::default();

        let whole = aggregator.aggregate(&trades, &TradeFilter::default(), &b, now());
        assert_eq!(whole.reconciliation.difference, Some(dec!(0.00)));
        assert_eq!(whole.reconciliation.status, ReconciliationStatus::Reconciled);

        let kalshi_only = TradeFilter {
            venue: Some(Venue::Kalshi),
            ..TradeFilter::default()
        };
        let scoped = aggregator.aggregate(&trades, &kalshi_only, &b, now());
        assert_eq!(scoped.trade_count, 1);
        assert_eq!(scoped.reconciliation.current_value, Some(dec!(104.80)));
        assert_eq!(scoped.reconciliation.status, ReconciliationStatus::Pending);
    }

    #[test]
    fn test_latest_current_snapshot_used() {
        let mut b = balances(dec!(900.00), dec!(900.00));
        b.current.push(snapshot(Venue::Kalshi, dec!(465.32), 1));

        let summary = PortfolioAggregator::default().aggregate(
            &fifteen_thirty_two(),
            &TradeFilter::default(),
            &b,
            now(),
        );
        assert_eq!(summary.reconciliation.current_value, Some(dec!(915.32)));
        assert_eq!(summary.reconciliation.status, ReconciliationStatus::Reconciled);
    }

    // ==================== Totals Tests ====================

    #[test]
    fn test_net_total_is_sum_of_categories() {
        let summary = PortfolioAggregator::default().aggregate(
            &fifteen_thirty_two(),
            &TradeFilter::default(),
            &Balances::default(),
            now(),
        );

        assert_eq!(summary.categories.arbitrage, dec!(12.00));
        assert_eq!(summary.categories.exited, dec!(-0.68));
        assert_eq!(summary.categories.directional, dec!(4.00));
        assert_eq!(summary.net_total, summary.categories.net_total());
        assert_eq!((summary.wins, summary.losses, summary.flat), (2, 1, 0));
        assert_eq!(summary.win_rate(), Some(dec!(2) / dec!(3)));
    }

    #[test]
    fn test_empty_input() {
        let summary = PortfolioAggregator::default().aggregate(
            &[],
            &TradeFilter::default(),
            &Balances::default(),
            now(),
        );

        assert_eq!(summary.trade_count, 0);
        assert_eq!(summary.net_total, Decimal::ZERO);
        assert_eq!(summary.net_total, summary.categories.net_total());
        assert!(summary.win_rate().is_none());
        assert!(summary.positions.is_empty());
    }

    #[test]
    fn test_total_fees_only_recorded() {
        let mut a = settled("a", TradeTier::Success, dec!(0.20));
        a.kalshi.fee = Some(dec!(0.17));
        a.polymarket.fee = Some(dec!(0.00));
        let b = settled("b", TradeTier::Success, dec!(0.20));

        let summary = PortfolioAggregator::default().aggregate(
            &[a, b],
            &TradeFilter::default(),
            &Balances::default(),
            now(),
        );
        assert_eq!(summary.total_fees, dec!(0.17));
    }

    #[test]
    fn test_category_mapping() {
        assert_eq!(PnlCategory::for_tier(None), PnlCategory::Arbitrage);
        assert_eq!(PnlCategory::for_tier(Some(TradeTier::Recovered)), PnlCategory::Arbitrage);
        assert_eq!(PnlCategory::for_tier(Some(TradeTier::Tier3Unwind)), PnlCategory::Exited);
        assert_eq!(
            PnlCategory::for_tier(Some(TradeTier::Tier3OppositeOverweight)),
            PnlCategory::Directional
        );
    }

    // ==================== Filter Tests ====================

    #[test]
    fn test_filter_by_sport_and_live() {
        let mut paper = settled("p", TradeTier::Success, dec!(1.00));
        paper.live = false;
        let mut nfl = settled("n", TradeTier::Success, dec!(2.00));
        nfl.sport = "NFL".to_string();
        let trades = vec![settled("a", TradeTier::Success, dec!(4.00)), paper, nfl];

        let filter = TradeFilter {
            sport: Some("nba".to_string()),
            live: Some(true),
            ..TradeFilter::default()
        };
        let summary =
            PortfolioAggregator::default().aggregate(&trades, &filter, &Balances::default(), now());

        assert_eq!(summary.trade_count, 1);
        assert_eq!(summary.net_total, dec!(4.00));
    }

    #[test]
    fn test_filter_by_time_window_and_venue() {
        let mut early = settled("e", TradeTier::Success, dec!(1.00));
        early.timestamp = now() - Duration::days(2);
        early.kalshi = LegFill::filled(52, 10);
        let mut late = settled("l", TradeTier::Success, dec!(2.00));
        late.kalshi = LegFill::filled(52, 10);
        let poly_only = settled("p", TradeTier::Success, dec!(3.00));

        let filter = TradeFilter {
            since: Some(now() - Duration::days(1)),
            venue: Some(Venue::Kalshi),
            ..TradeFilter::default()
        };
        assert!(!filter.matches(&early));
        assert!(filter.matches(&late));
        assert!(!filter.matches(&poly_only));
    }

    // ==================== Fill Rate Tests ====================

    #[test]
    fn test_fill_rates_by_phase_and_spread() {
        let mut hedged = settled("h", TradeTier::Success, dec!(0.20));
        hedged.polymarket = LegFill::filled(45, 10);
        hedged.kalshi = LegFill::filled(52, 10);
        hedged.execution_phase = Some(ExecutionPhase::Resting);
        hedged.spread_cents = Some(3);

        let mut missed = settled("m", TradeTier::Skipped, dec!(0));
        missed.execution_phase = Some(ExecutionPhase::Immediate);
        missed.spread_cents = Some(1);

        let mut pending = TradeAttempt::new("q", Direction::BuyKalshiSellPoly, 5);
        pending.timestamp = now();
        pending.sport = "NBA".to_string();

        let summary = PortfolioAggregator::default().aggregate(
            &[hedged, missed, pending],
            &TradeFilter::default(),
            &Balances::default(),
            now(),
        );
        let rates = &summary.fill_rates;

        let resting = rates.by_phase[&PhaseBucket::Resting];
        assert_eq!(resting.attempts, 1);
        assert_eq!(resting.hedged_rate(), Some(Decimal::ONE));

        let thin = rates.by_spread[&SpreadBucket::AtMostOne];
        assert_eq!(thin.no_fill, 1);
        assert_eq!(thin.hedged_rate(), Some(Decimal::ZERO));

        assert!(!rates.by_phase.contains_key(&PhaseBucket::Unknown));
    }

    #[test]
    fn test_spread_buckets() {
        assert_eq!(SpreadBucket::from_spread(Some(-2)), SpreadBucket::AtMostOne);
        assert_eq!(SpreadBucket::from_spread(Some(2)), SpreadBucket::Two);
        assert_eq!(SpreadBucket::from_spread(Some(4)), SpreadBucket::ThreeToFour);
        assert_eq!(SpreadBucket::from_spread(Some(9)), SpreadBucket::FivePlus);
        assert_eq!(SpreadBucket::from_spread(None), SpreadBucket::Unknown);
    }
}
