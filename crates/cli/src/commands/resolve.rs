//! Per-trade P&L resolution with optional CSV export.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use xvenue_reconcile::{ResolvedPnl, TradeAttempt};

use super::{format_dollars, load_snapshot, Ledger};

/// Arguments for the resolve command.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Snapshot JSON file holding the trade records
    #[arg(short, long)]
    pub snapshot: PathBuf,

    /// Also write the resolved rows to this CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Only show trades that are still open
    #[arg(long)]
    pub open_only: bool,
}

/// One exported row.
#[derive(Debug, Serialize)]
pub struct ResolvedRow {
    pub trade_id: String,
    pub sport: String,
    pub game_id: String,
    pub direction: String,
    pub tier: Option<String>,
    pub quantity: u32,
    pub source: Option<String>,
    pub per_contract: Option<Decimal>,
    pub total: Option<Decimal>,
    pub is_open: bool,
}

impl ResolvedRow {
    #[must_use]
    pub fn new(trade: &TradeAttempt, resolved: &ResolvedPnl) -> Self {
        Self {
            trade_id: trade.id.clone(),
            sport: trade.sport.clone(),
            game_id: trade.game_id.clone(),
            direction: trade.direction.to_string(),
            tier: trade.tier.map(|t| t.as_str().to_string()),
            quantity: resolved.quantity,
            source: resolved.source.map(|s| s.as_str().to_string()),
            per_contract: resolved.per_contract,
            total: resolved.total,
            is_open: resolved.is_open,
        }
    }
}

/// Runs the resolve command.
///
/// # Errors
/// Returns an error if the snapshot cannot be loaded or the CSV cannot be written.
pub async fn run_resolve(args: ResolveArgs, ledger: &Ledger) -> Result<()> {
    let snapshot = load_snapshot(&args.snapshot).await?;

    let rows: Vec<ResolvedRow> = ledger
        .resolver()
        .resolve_all(&snapshot.trades)
        .into_iter()
        .filter(|(_, resolved)| !args.open_only || resolved.is_open)
        .map(|(trade, resolved)| ResolvedRow::new(trade, &resolved))
        .collect();

    println!("\n=== Resolved P&L ({} trades) ===\n", rows.len());
    println!(
        "{:<20}  {:<26}  {:>5}  {:<10}  {:>10}",
        "trade", "tier", "qty", "source", "total"
    );
    for row in &rows {
        println!(
            "{:<20}  {:<26}  {:>5}  {:<10}  {:>10}",
            row.trade_id,
            row.tier.as_deref().unwrap_or("-"),
            row.quantity,
            row.source.as_deref().unwrap_or("-"),
            format_dollars(row.total)
        );
    }

    if let Some(path) = &args.csv {
        write_csv(path, &rows)?;
        println!("\nWrote {} rows to {}", rows.len(), path.display());
    }

    Ok(())
}

fn write_csv(path: &Path, rows: &[ResolvedRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    for row in rows {
        writer.serialize(row).context("Failed to write CSV row")?;
    }
    writer.flush().context("Failed to flush CSV file")?;
    Ok(())
}
