use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxwatch::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxwatch::AppCommand {
    fn from(cmd: Commands) -> fxwatch::AppCommand {
        match cmd {
            Commands::Import { path } => fxwatch::AppCommand::Import { path },
            Commands::Catalog { filter } => fxwatch::AppCommand::Catalog { filter },
            Commands::List => fxwatch::AppCommand::List,
            Commands::Add { codes } => fxwatch::AppCommand::Add { codes },
            Commands::Remove { code } => fxwatch::AppCommand::Remove { code },
            Commands::Move { from, to } => fxwatch::AppCommand::Move { from, to },
            Commands::Clear => fxwatch::AppCommand::Clear,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Replace stored rates with a JSON object of code -> rate
    Import { path: PathBuf },
    /// Display every known currency
    Catalog {
        /// Only show codes containing this text
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Display the watchlist
    List,
    /// Add currencies to the end of the watchlist
    #[command(arg_required_else_help = true)]
    Add { codes: Vec<String> },
    /// Remove a currency from the watchlist
    Remove { code: String },
    /// Swap two watchlist positions (1-based)
    Move { from: usize, to: usize },
    /// Remove every currency from the watchlist
    Clear,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxwatch::cli::setup::setup().map(|msg| println!("{msg}")),
        Some(cmd) => fxwatch::run_command(cmd.into(), cli.config_path.as_deref()),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
