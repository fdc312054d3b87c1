//! fileledger binary
//!
//! - `run`: inventory a root into a new signed SQLite store
//! - `roots`: list the roots this host can inventory
//! - `verify`: recheck a store's signature

use anyhow::Result;
use clap::{Parser, Subcommand};
use fileledger_logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "fileledger", version, about = "Full-disk file inventory")]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inventory a root into a new store
    Run {
        /// Root to inventory (defaults to the first enumerable root)
        root: Option<PathBuf>,

        /// Directory inside the root; falls back to the whole root if invalid
        #[arg(long)]
        sub_path: Option<PathBuf>,

        /// Number of enrichment workers (capped at available parallelism)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Records per insert and per worker batch
        #[arg(long)]
        batch_size: Option<usize>,

        /// Directory the store is written to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Fail unless the process has raw volume access
        #[arg(long)]
        require_elevated: bool,

        /// Output the run summary as JSON
        #[arg(long)]
        json: bool,

        /// TOML configuration file
        #[arg(short, long, env = "FILELEDGER_CONFIG")]
        config: Option<PathBuf>,
    },

    /// List enumerable roots and whether raw volume access is available
    Roots {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Recompute a store's signature and compare with the recorded one
    Verify {
        /// Store file written by `run`
        store: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn command_wants_json(command: &Commands) -> bool {
    match command {
        Commands::Run { json, .. } => *json,
        Commands::Roots { json } => *json,
        Commands::Verify { json, .. } => *json,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_mode = command_wants_json(&cli.command);

    // Dropping the guard flushes the file writer, so it lives until exit.
    let _log_guard = match init_logging(LogConfig {
        app_name: "fileledger",
        verbose: cli.verbose,
        log_dir: None,
    }) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Warning: failed to initialize logging: {:#}", err);
            None
        }
    };

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if json_mode {
                cli::error::print_json_error(&err);
            } else {
                eprintln!("{:?}", err);
            }
            ExitCode::from(1)
        }
    }
}

fn run_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            root,
            sub_path,
            workers,
            batch_size,
            output_dir,
            require_elevated,
            json,
            config,
        } => cli::run::run(cli::run::RunArgs {
            root,
            sub_path,
            workers,
            batch_size,
            output_dir,
            require_elevated,
            json,
            config,
        }),
        Commands::Roots { json } => cli::roots::run(cli::roots::RootsArgs { json }),
        Commands::Verify { store, json } => {
            cli::verify::run(cli::verify::VerifyArgs { store, json })
        }
    }
}
