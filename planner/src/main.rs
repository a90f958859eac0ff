//! CLI entry point for the allocation planner.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use allocbook::AllocationMode;
use allocbook_planner::config::Config;
use allocbook_planner::error::Error;
use allocbook_planner::plan::{self, PlanOptions};

#[derive(Parser)]
#[command(name = "allocate")]
#[command(about = "Allocation planner: percentage splits for strategy configuration")]
#[command(version)]
struct Cli {
    /// Path to allocate.toml (defaults are used if it does not exist)
    #[arg(long, default_value = "allocate.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute an allocation for a list of symbols
    Plan {
        /// Symbols to allocate across
        #[arg(required = true)]
        symbols: Vec<String>,

        /// even | proportional | majority-cash-even | majority-cash-proportional
        #[arg(long, default_value = "even")]
        mode: AllocationMode,

        /// Cash percentage (overrides the mode default)
        #[arg(long)]
        cash: Option<f64>,

        /// Quotes file for proportional modes (overrides the config)
        #[arg(long)]
        quotes: Option<PathBuf>,

        /// Write the strategy payload JSON here
        #[arg(long)]
        out: Option<PathBuf>,

        /// Overwrite --out without asking
        #[arg(long)]
        force: bool,
    },

    /// Validate a saved strategy payload
    Check {
        /// Path to payload JSON
        payload: PathBuf,
    },

    /// Replay a scripted edit session with an audit trail
    Replay {
        /// Path to script JSON
        script: PathBuf,

        /// Quotes file for proportional modes (overrides the config)
        #[arg(long)]
        quotes: Option<PathBuf>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let config = match Config::load_or_default(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Plan {
            symbols,
            mode,
            cash,
            quotes,
            out,
            force,
        } => {
            let opts = PlanOptions {
                symbols,
                mode,
                cash,
                quotes,
                out,
                force,
            };
            plan::run_plan(&config, &opts).map(|_| ())
        }
        Command::Check { payload } => plan::run_check(&config, &payload).map(|_| ()),
        Command::Replay { script, quotes } => {
            plan::run_replay(&config, &script, quotes.as_deref()).map(|_| ())
        }
    };

    if let Err(e) = result {
        match &e {
            Error::Invalid(msg) => {
                eprintln!("\nNot saveable: {msg}");
                process::exit(2);
            }
            Error::Aborted(msg) => {
                eprintln!("{msg}");
                process::exit(0);
            }
            _ => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }
}
