//! CLI commands for the arbitrage ledger.

pub mod resolve;
pub mod size;
pub mod summary;
pub mod watch;

pub use resolve::{run_resolve, ResolveArgs};
pub use size::{run_size, SizeArgs};
pub use summary::{run_summary, SummaryArgs};
pub use watch::{run_watch, WatchArgs};

use std::path::Path;

use anyhow::{Context, Result};
use xvenue_core::{ConfigLoader, LedgerConfig};
use xvenue_reconcile::{DepthWalker, FeeModel, PnlResolver, PortfolioAggregator, Snapshot};

/// Components built once from configuration and shared by every command.
///
/// The walker and the resolver hold the same [`FeeModel`].
#[derive(Debug, Clone)]
pub struct Ledger {
    pub walker: DepthWalker,
    pub aggregator: PortfolioAggregator,
}

impl Ledger {
    #[must_use]
    pub fn from_config(config: &LedgerConfig) -> Self {
        let fees = FeeModel::with_config(config.fees);
        Self {
            walker: DepthWalker::with_config(fees, &config.sizing),
            aggregator: PortfolioAggregator::new(PnlResolver::new(fees), config.reconciliation.clone()),
        }
    }

    #[must_use]
    pub fn resolver(&self) -> &PnlResolver {
        self.aggregator.resolver()
    }
}

/// Loads configuration from an explicit file, a profile overlay, or the
/// default layered sources.
pub fn load_config(path: Option<&str>, profile: Option<&str>) -> Result<LedgerConfig> {
    let config = match (path, profile) {
        (Some(path), _) => ConfigLoader::load_from(path)
            .with_context(|| format!("Failed to load config from {path}"))?,
        (None, Some(profile)) => ConfigLoader::load_with_profile(profile)
            .with_context(|| format!("Failed to load config profile {profile}"))?,
        (None, None) => ConfigLoader::load().context("Failed to load config")?,
    };
    Ok(config)
}

/// Reads and parses a snapshot file.
pub async fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse snapshot: {}", path.display()))?;

    for trade in &snapshot.trades {
        if let Err(e) = trade.validate() {
            tracing::warn!(trade_id = %trade.id, error = %e, "Trade record violates invariants");
        }
    }

    tracing::debug!(
        trades = snapshot.trades.len(),
        levels = snapshot.order_books.len(),
        as_of = %snapshot.as_of,
        "Snapshot loaded"
    );
    Ok(snapshot)
}

/// Formats an optional dollar amount, showing `OPEN` when unknown.
#[must_use]
pub fn format_dollars(value: Option<rust_decimal::Decimal>) -> String {
    value.map_or_else(|| "OPEN".to_string(), |v| format!("${:.2}", v))
}
