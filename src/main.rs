use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use database::connection::{connect, run_migrations};
use database::repository::DbRepository;
use peers::PeerEngine;
use provider_client::PostgrestClient;
use rust_decimal::Decimal;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

mod pipeline;
mod quarters;

/// The main entry point for the Peerview ratio engine.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from a .env file, if one exists
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = configuration::load_config()?;

    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the appropriate command
    match cli.command {
        Commands::Compute(args) => handle_compute(args, settings).await,
        Commands::Serve(args) => handle_serve(args, settings).await,
        Commands::Peers(args) => handle_peers(args).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A CAMEL ratio engine and peer-comparison service for credit union filings.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute and store CAMEL ratios for one or more reporting periods.
    Compute(ComputeArgs),
    /// Run the HTTP query surface for identity lookups and peer comparisons.
    Serve(ServeArgs),
    /// Compare one credit union's latest ratios against an asset-size peer tier.
    Peers(PeersArgs),
}

#[derive(Parser)]
struct ComputeArgs {
    /// Explicit periods: one ("2025-Q3") or an inclusive range ("2024-Q1" "2025-Q3").
    periods: Vec<String>,

    /// Compute only the most recent period the provider holds.
    #[arg(long, conflicts_with_all = ["all", "periods"])]
    latest: bool,

    /// Compute every period the provider holds.
    #[arg(long, conflicts_with_all = ["latest", "periods"])]
    all: bool,

    /// Compute and log ratio rows without writing to the ratio store.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Parser)]
struct ServeArgs {
    /// Override the configured listen port.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Parser)]
struct PeersArgs {
    /// The credit union's charter number.
    #[arg(long)]
    cu_number: i64,

    /// Lower bound of the asset tier in dollars (inclusive).
    #[arg(long)]
    tier_min: Decimal,

    /// Upper bound of the asset tier in dollars (exclusive).
    #[arg(long)]
    tier_max: Decimal,
}

// ==============================================================================
// Compute Command Logic
// ==============================================================================

/// Handles the orchestration of a batch ratio computation run.
async fn handle_compute(
    args: ComputeArgs,
    settings: configuration::settings::Settings,
) -> anyhow::Result<()> {
    let provider = PostgrestClient::new(&settings.provider)?;

    let periods = quarters::resolve(&args.periods, args.latest, args.all, &provider).await?;
    tracing::info!(count = periods.len(), "resolved reporting periods");

    let db_pool = connect().await?;
    run_migrations(&db_pool).await?;
    let db_repo = DbRepository::new(db_pool);

    let summary = pipeline::run(&provider, &db_repo, &settings, &periods, args.dry_run).await?;

    println!(
        "Processed {} period(s) ({} skipped, {} failed); {}/{} rows written.",
        summary.periods_processed,
        summary.periods_skipped,
        summary.periods_failed,
        summary.rows_written,
        summary.rows_attempted
    );
    if summary.periods_failed > 0 {
        anyhow::bail!("{} period(s) failed; see logs", summary.periods_failed);
    }
    Ok(())
}

// ==============================================================================
// Serve Command Logic
// ==============================================================================

async fn handle_serve(
    args: ServeArgs,
    settings: configuration::settings::Settings,
) -> anyhow::Result<()> {
    let port = args.port.unwrap_or(settings.server.port);
    let addr: SocketAddr = format!("{}:{}", settings.server.host, port).parse()?;
    web_server::run_server(addr).await
}

// ==============================================================================
// Peers Command Logic
// ==============================================================================

/// Runs an on-demand peer comparison and renders it as a terminal table.
async fn handle_peers(args: PeersArgs) -> anyhow::Result<()> {
    let db_pool = connect().await?;
    run_migrations(&db_pool).await?;
    let db_repo = DbRepository::new(db_pool);

    let cu = db_repo
        .get_credit_union_by_charter(args.cu_number)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no credit union with charter {}", args.cu_number))?;
    println!(
        "Peer comparison for charter {} ({})",
        cu.cu_number,
        cu.name.as_deref().unwrap_or("unnamed")
    );

    let engine = PeerEngine::new(args.tier_min, args.tier_max)?;
    let mut results = engine.run(&db_repo, cu.cu_number).await?;
    results.sort_by(|a, b| (a.category, a.metric.as_str()).cmp(&(b.category, b.metric.as_str())));

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Category",
        "Metric",
        "Value",
        "Peer Median",
        "Peers",
        "Below",
        "Equal",
    ]);

    for result in &results {
        table.add_row(vec![
            Cell::new(result.category.to_string()),
            Cell::new(&result.metric),
            Cell::new(result.target_value.to_string()),
            Cell::new(
                result
                    .peer_median
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(result.peer_count.to_string()),
            Cell::new(result.values_below.to_string()),
            Cell::new(result.values_equal.to_string()),
        ]);
    }

    println!("{table}");
    Ok(())
}
