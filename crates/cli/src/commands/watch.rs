//! Periodic re-aggregation of a snapshot file refreshed by the collector.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use tracing::{info, warn};
use xvenue_reconcile::{ReconciliationStatus, TradeFilter};

use super::summary::{print_summary, summarize};
use super::{format_dollars, load_snapshot, Ledger};

/// Arguments for the watch command.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Snapshot JSON file rewritten by the upstream collector
    #[arg(short, long)]
    pub snapshot: PathBuf,

    /// Seconds between reloads
    #[arg(long, default_value = "30")]
    pub interval_secs: u64,

    /// Print the full report each cycle instead of a one-line status
    #[arg(long)]
    pub verbose: bool,
}

/// Runs the watch loop until Ctrl-C.
///
/// A snapshot that fails to load is logged and skipped; the previous cycle's
/// output stands.
///
/// # Errors
/// Returns an error if the interval is zero.
pub async fn run_watch(args: WatchArgs, ledger: &Ledger) -> Result<()> {
    watch_until(args, ledger, tokio::signal::ctrl_c()).await
}

/// Runs the watch loop until `shutdown` completes.
///
/// `shutdown` is polled across cycles, so a signal that fires while a
/// snapshot is being processed stops the loop at the next wait.
///
/// # Errors
/// Returns an error if the interval is zero.
pub async fn watch_until<F>(args: WatchArgs, ledger: &Ledger, shutdown: F) -> Result<()>
where
    F: Future,
{
    if args.interval_secs == 0 {
        anyhow::bail!("--interval-secs must be positive");
    }

    info!(
        snapshot = %args.snapshot.display(),
        interval_secs = args.interval_secs,
        "Watching snapshot"
    );

    let filter = TradeFilter::default();
    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval_secs));
    let mut last_status: Option<ReconciliationStatus> = None;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Stopping watch");
                return Ok(());
            }
            _ = ticker.tick() => {}
        }

        let snapshot = match load_snapshot(&args.snapshot).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Snapshot reload failed");
                continue;
            }
        };

        let summary = summarize(&snapshot, &filter, ledger);
        let status = summary.reconciliation.status;

        if last_status.is_some_and(|prev| prev != status) {
            warn!(from = ?last_status, to = %status, "Reconciliation status changed");
        }
        last_status = Some(status);

        if args.verbose {
            print_summary(&summary);
        } else {
            println!(
                "{}  trades={} open={} net=${:.2} diff={} [{}]",
                snapshot.as_of.format("%H:%M:%S"),
                summary.trade_count,
                summary.open,
                summary.net_total,
                format_dollars(summary.reconciliation.difference),
                status
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xvenue_core::LedgerConfig;

    fn args(interval_secs: u64) -> WatchArgs {
        WatchArgs {
            snapshot: PathBuf::from("does-not-exist.json"),
            interval_secs,
            verbose: false,
        }
    }

    #[tokio::test]
    async fn test_stops_when_shutdown_already_fired() {
        let ledger = Ledger::from_config(&LedgerConfig::default());
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            watch_until(args(1), &ledger, std::future::ready(())),
        )
        .await;

        assert!(matches!(result, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_shutdown_during_wait_is_observed() {
        let ledger = Ledger::from_config(&LedgerConfig::default());
        let shutdown = tokio::time::sleep(Duration::from_millis(50));
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            watch_until(args(3600), &ledger, shutdown),
        )
        .await;

        assert!(matches!(result, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_zero_interval_rejected() {
        let ledger = Ledger::from_config(&LedgerConfig::default());
        let result = watch_until(args(0), &ledger, std::future::pending::<()>()).await;
        assert!(result.is_err());
    }
}
