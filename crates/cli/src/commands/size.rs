//! Depth-walk sizing for the order books in a snapshot.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use xvenue_reconcile::{DepthWalker, MarketDepth, SizingRecommendation};

use super::{load_snapshot, Ledger};

/// Arguments for the size command.
#[derive(Args, Debug)]
pub struct SizeArgs {
    /// Snapshot JSON file holding the order-book rows
    #[arg(short, long)]
    pub snapshot: PathBuf,

    /// Override the minimum marginal profit per contract, in cents
    #[arg(long)]
    pub min_edge_cents: Option<i64>,

    /// Print the recommendation as JSON
    #[arg(long)]
    pub json: bool,
}

/// Runs the size command.
///
/// # Errors
/// Returns an error if the snapshot cannot be read or parsed.
pub async fn run_size(args: SizeArgs, ledger: &Ledger) -> Result<()> {
    let snapshot = load_snapshot(&args.snapshot).await?;
    let depth = MarketDepth::from_levels(snapshot.order_books);

    let walker = match args.min_edge_cents {
        Some(min_edge) => DepthWalker::new(*ledger.walker.fee_model(), min_edge),
        None => ledger.walker.clone(),
    };
    let recommendation = walker.recommend(&depth);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&recommendation)?);
    } else {
        print_recommendation(&recommendation);
    }
    Ok(())
}

fn print_recommendation(rec: &SizingRecommendation) {
    println!("\n=== Depth Walk ===\n");

    if rec.ladder.is_empty() {
        println!("No two-sided book on both venues; nothing to size.");
        return;
    }

    println!(
        "{:>3}  {:>6}  {:>6}  {:>6}  {:>4}  {:>6}  {:>6}  {:>6}",
        "lvl", "A px", "B cost", "spread", "fee", "edge", "size", "cum"
    );
    for level in &rec.ladder {
        println!(
            "{:>3}  {:>5}c  {:>5}c  {:>5}c  {:>3}c  {:>5}c  {:>6}  {:>6}{}",
            level.level,
            level.venue_a_price,
            level.venue_b_cost,
            level.spread_cents,
            level.fee_cents,
            level.marginal_profit_cents,
            level.contracts_at_level,
            level.cumulative_contracts,
            if level.stopped { "  STOP" } else { "" }
        );
    }

    println!();
    match rec.direction {
        Some(direction) => println!(
            "Recommend {} x{} for ${:.2} expected",
            direction,
            rec.contracts,
            rec.expected_profit()
        ),
        None => println!("No level clears the minimum edge."),
    }
}
