use clap::{Parser, Subcommand};

mod commands;

use commands::{ResolveArgs, SizeArgs, SummaryArgs, WatchArgs};

#[derive(Parser)]
#[command(name = "xvenue")]
#[command(about = "Sizing and P&L reconciliation for Kalshi/Polymarket arbitrage", long_about = None)]
struct Cli {
    /// Config file path (defaults to the layered config/ directory)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Config profile overlay, read from config/Config.<profile>.toml
    #[arg(long, global = true, env = "XVENUE_PROFILE")]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Size an arbitrage from the snapshot's order-book depth
    Size(SizeArgs),
    /// Resolve realized or open P&L for every trade
    Resolve(ResolveArgs),
    /// Roll trades up into a portfolio summary and reconcile balances
    Summary(SummaryArgs),
    /// Re-run the summary each time the snapshot file is refreshed
    Watch(WatchArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = commands::load_config(cli.config.as_deref(), cli.profile.as_deref())?;
    let ledger = commands::Ledger::from_config(&config);

    match cli.command {
        Commands::Size(args) => commands::run_size(args, &ledger).await?,
        Commands::Resolve(args) => commands::run_resolve(args, &ledger).await?,
        Commands::Summary(args) => commands::run_summary(args, &ledger).await?,
        Commands::Watch(args) => commands::run_watch(args, &ledger).await?,
    }

    Ok(())
}
