mod cli;
mod config;
mod display;
mod error;
mod logging;
mod models;
mod renderer;
mod state;
mod strategy;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "espa-bidder")]
#[command(about = "Battery storage offers for ESPA-Comp energy markets", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an offer for one market call and save it as offer_<STEP>.json
    Offer {
        /// Platform time step
        #[arg(allow_negative_numbers = true)]
        step: i64,

        /// Market data JSON file
        market: PathBuf,

        /// Resource data JSON file
        resource: PathBuf,

        /// Path to config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory for the offer file (overrides config)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Dry run - print a summary instead of writing the offer
        #[arg(long)]
        dry_run: bool,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// State management commands
    State {
        #[command(subcommand)]
        command: StateCommands,
    },
    /// Show commands
    Show {
        #[command(subcommand)]
        command: ShowCommands,
    },
}

#[derive(Subcommand)]
enum ShowCommands {
    /// Display the offer with the highest time step
    Latest {
        /// Path to config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory holding offer files (overrides config)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Initialize bidder.toml configuration file
    Init {
        /// Path where to create the config file
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum StateCommands {
    /// Reset persisted state (clears the saved day-ahead forecast)
    Reset {
        /// Path to the config file (defaults to bidder.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Offer {
            step,
            market,
            resource,
            config,
            output_dir,
            dry_run,
        } => cli::offer::run(step, market, resource, config, output_dir, dry_run),
        Commands::Config { command } => match command {
            ConfigCommands::Init { path } => cli::config::init(path),
        },
        Commands::State { command } => match command {
            StateCommands::Reset { config } => cli::state::reset(config),
        },
        Commands::Show { command } => match command {
            ShowCommands::Latest { config, output_dir } => cli::show::latest(config, output_dir),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
