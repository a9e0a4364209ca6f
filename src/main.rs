use anyhow::{Context, Result};
use chairs::manager::Manager;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    /// Directory holding `config.toml` and the sweep outputs.
    #[arg(long)]
    sim_dir: PathBuf,

    /// Number of worker threads (all cores by default).
    #[arg(long)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run every searcher configuration.
    Run {
        /// Seed overriding the one in the config.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Compute occupancy statistics of a finished sweep.
    Analyze,

    /// Remove the sweep outputs.
    Clean,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to build thread pool")?;
    }

    let mgr = Manager::new(&args.sim_dir).context("failed to construct mgr")?;

    match args.command {
        Command::Run { seed } => mgr.run_sweep(seed)?,
        Command::Analyze => mgr.analyze_sweep()?,
        Command::Clean => mgr.clean_sweep()?,
    }

    Ok(())
}
