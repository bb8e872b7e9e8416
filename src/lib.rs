pub mod catalog;
pub mod cli;
pub mod core;
pub mod order_store;
pub mod selection;
pub mod store;

use crate::core::config::AppConfig;
use crate::store::KeyValueStore;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info};

pub enum AppCommand {
    Import { path: PathBuf },
    Catalog { filter: Option<String> },
    List,
    Add { codes: Vec<String> },
    Remove { code: String },
    Move { from: usize, to: usize },
    Clear,
}

pub fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxwatch starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = KeyValueStore::from_config(&config)?;
    let output = execute(command, &store, &config)?;
    println!("{output}");
    Ok(())
}

/// Runs `command` against an already opened store and returns what to print.
pub fn execute(command: AppCommand, store: &KeyValueStore, config: &AppConfig) -> Result<String> {
    match command {
        AppCommand::Import { path } => {
            let rates = store.preferences(store::RATES)?;
            let app = store.preferences(store::APP_PREFS)?;
            let count = cli::import::import_rates_from_path(&rates, &app, &path)?;
            Ok(format!("Imported {count} rates"))
        }
        AppCommand::Catalog { filter } => {
            cli::watchlist::show_catalog(store, config, filter.as_deref())
        }
        AppCommand::List => cli::watchlist::show_watchlist(store, config),
        AppCommand::Add { codes } => cli::watchlist::add(store, config, &codes),
        AppCommand::Remove { code } => cli::watchlist::remove(store, config, &code),
        AppCommand::Move { from, to } => cli::watchlist::move_currency(store, config, from, to),
        AppCommand::Clear => cli::watchlist::clear(store, config),
    }
}
