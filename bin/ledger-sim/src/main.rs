//! Ledger sim: replays a recorded session of VM execution events through
//! [`ledger_sim_tracer::Simulation`] and prints what the installed filters observed.

mod session;

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use eyre::{eyre, Result};
use ledger_sim_common::parse_quantity;
use ledger_sim_filters::{BlockSelector, FilterApi, FilterRegistry, LogFilter};
use ledger_sim_tracer::Simulation;
use revm_primitives::Address;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON file mapping contract addresses to their bytecode.
    #[arg(long, env = "LEDGER_SIM_CONFIG", default_value = "ledger-sim.json")]
    config: PathBuf,

    /// JSON session script to replay.
    #[arg(long)]
    session: PathBuf,

    /// Lower bound of the installed log filter.
    #[arg(long, default_value = "latest")]
    from_block: String,

    /// Upper bound of the installed log filter.
    #[arg(long, default_value = "latest")]
    to_block: String,

    /// Restricts the log filter to these emitters. May be repeated.
    #[arg(long = "address")]
    addresses: Vec<Address>,

    /// Height the registry starts at.
    #[arg(long, default_value = "0")]
    start_block: String,
}

fn main() -> Result<()> {
    // Enable backtraces unless a RUST_BACKTRACE value has already been explicitly provided.
    if std::env::var_os("RUST_BACKTRACE").is_none() {
        std::env::set_var("RUST_BACKTRACE", "1");
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let start = parse_quantity(&args.start_block)
        .ok_or_else(|| eyre!("invalid start block `{}`", args.start_block))?;
    let registry = Arc::new(FilterRegistry::with_cursor(start));
    let mut simulation = Simulation::from_config_file(&args.config, registry.clone())?;

    let filter = LogFilter::new()
        .from_block(args.from_block.parse::<BlockSelector>()?)
        .to_block(args.to_block.parse::<BlockSelector>()?);
    let filter = args.addresses.into_iter().fold(filter, LogFilter::address);

    let logs = registry.create_log_filter(filter);
    let blocks = registry.new_block_filter();
    let pending = registry.new_pending_transaction_filter();
    info!(%logs, %blocks, %pending, "Installed filters");

    let events = session::load(&args.session)?;
    info!(events = events.len(), path = %args.session.display(), "Replaying session");
    let summary = session::replay(&mut simulation, events)?;
    info!(
        steps = summary.steps,
        logs = summary.logs,
        blocks = summary.blocks,
        cursor = %registry.cursor(),
        "Session replayed"
    );

    let output = serde_json::json!({
        "logs": registry.get_filter_logs(&logs),
        "blocks": registry.get_filter_logs(&blocks),
        "pendingTransactions": registry.get_filter_logs(&pending),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
