//! Portfolio summary and balance reconciliation.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use xvenue_core::Venue;
use xvenue_reconcile::{PortfolioSummary, ReconciliationStatus, Snapshot, TradeFilter};

use super::{format_dollars, load_snapshot, Ledger};

/// Arguments for the summary command.
#[derive(Args, Debug, Clone)]
pub struct SummaryArgs {
    /// Snapshot JSON file
    #[arg(short, long)]
    pub snapshot: PathBuf,

    /// Only trades at or after this time (RFC 3339)
    #[arg(long)]
    pub since: Option<DateTime<Utc>>,

    /// Only trades before this time (RFC 3339)
    #[arg(long)]
    pub until: Option<DateTime<Utc>>,

    /// Only trades with a fill on this venue (polymarket, kalshi)
    #[arg(long)]
    pub venue: Option<Venue>,

    /// Only trades for this sport
    #[arg(long)]
    pub sport: Option<String>,

    /// Only live-money trades
    #[arg(long, conflicts_with = "paper")]
    pub live: bool,

    /// Only paper trades
    #[arg(long)]
    pub paper: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl SummaryArgs {
    /// Builds the trade filter from the flags.
    #[must_use]
    pub fn filter(&self) -> TradeFilter {
        let live = match (self.live, self.paper) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        };
        TradeFilter {
            since: self.since,
            until: self.until,
            venue: self.venue,
            sport: self.sport.clone(),
            live,
        }
    }
}

/// Runs the summary command.
///
/// # Errors
/// Returns an error if the snapshot cannot be loaded.
pub async fn run_summary(args: SummaryArgs, ledger: &Ledger) -> Result<()> {
    let snapshot = load_snapshot(&args.snapshot).await?;
    let summary = summarize(&snapshot, &args.filter(), ledger);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

/// Aggregates one snapshot.
#[must_use]
pub fn summarize(snapshot: &Snapshot, filter: &TradeFilter, ledger: &Ledger) -> PortfolioSummary {
    ledger
        .aggregator
        .aggregate(&snapshot.trades, filter, &snapshot.balances, snapshot.as_of)
}

/// Prints a summary as a text report.
pub fn print_summary(summary: &PortfolioSummary) {
    println!("\n=== Portfolio Summary ===\n");
    println!(
        "Trades: {}  (wins {}, losses {}, flat {}, open {})",
        summary.trade_count, summary.wins, summary.losses, summary.flat, summary.open
    );
    if let Some(rate) = summary.win_rate() {
        println!("Win rate: {:.1}%", rate * rust_decimal::Decimal::ONE_HUNDRED);
    }
    println!("Fees paid: ${:.2}", summary.total_fees);

    println!("\nP&L by category:");
    println!("  Arbitrage:    ${:>10.2}", summary.categories.arbitrage);
    println!("  Exited:       ${:>10.2}", summary.categories.exited);
    println!("  Directional:  ${:>10.2}", summary.categories.directional);
    println!("  Net:          ${:>10.2}", summary.net_total);

    let rec = &summary.reconciliation;
    println!("\nReconciliation:");
    println!("  Starting:  {}", format_dollars(rec.starting_balance));
    println!("  Expected:  {}", format_dollars(rec.expected));
    println!("  Current:   {}", format_dollars(rec.current_value));
    println!("  Diff:      {}", format_dollars(rec.difference));
    let marker = match rec.status {
        ReconciliationStatus::Reconciled => "OK",
        ReconciliationStatus::Pending => "..",
        ReconciliationStatus::Mismatch => "!!",
    };
    println!("  Status:    [{}] {}", marker, rec.status);

    println!("\nFill rates by phase:");
    for (phase, stats) in &summary.fill_rates.by_phase {
        println!(
            "  {:<10} {:>4} attempts  {:>4} hedged  {:>4} one-leg  {:>4} none",
            format!("{phase:?}").to_lowercase(),
            stats.attempts,
            stats.hedged,
            stats.one_leg,
            stats.no_fill
        );
    }
    println!("\nFill rates by spread:");
    for (bucket, stats) in &summary.fill_rates.by_spread {
        println!(
            "  {:<10} {:>4} attempts  {:>4} hedged  {:>4} one-leg  {:>4} none",
            bucket.label(),
            stats.attempts,
            stats.hedged,
            stats.one_leg,
            stats.no_fill
        );
    }

    if !summary.positions.is_empty() {
        println!("\nOpen positions:");
        for p in &summary.positions {
            println!(
                "  {:<16} {:<8} {:<10} {:>5} @ {:>5}c  ({} unhedged)",
                p.game_id,
                p.team,
                p.venue,
                p.contracts,
                p.avg_price_cents.round_dp(1),
                p.unhedged_contracts()
            );
        }
    }
}
