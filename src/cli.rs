use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;
use crate::constants::DEFAULT_BATCH_SIZE;

#[derive(Parser)]
#[command(name = "pricevault")]
#[command(about = "Incremental partitioned price archive", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch missing history and merge it into the archive
    Pull {
        /// Override the computed start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Tickers per provider request
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },
    /// Rebuild the equity universe file from constituent sources
    Universe {
        /// Output path (defaults to config/equity_universe.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show archive extent and the next resumption point
    Status,
}

pub fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Pull { start, batch_size } => {
            commands::pull::run(start, batch_size);
        }
        Commands::Universe { output } => {
            commands::universe::run(output);
        }
        Commands::Status => {
            commands::status::run();
        }
    }
}
