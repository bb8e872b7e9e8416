use super::ui;
use crate::core::config::AppConfig;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;
use tracing::info;

const EXAMPLE_CONFIG: &str = include_str!("../../docs/example_config.yaml");

/// Writes the example config to the platform config location.
pub fn setup() -> Result<String> {
    setup_at_path(AppConfig::default_config_path()?)
}

/// Writes the example config to `path`, refusing to overwrite an existing file.
pub fn setup_at_path<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    if path.exists() {
        bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    fs::write(path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;
    info!(path = %path.display(), "Wrote example configuration");

    Ok(format!(
        "{}\n{}",
        ui::style_text("Created configuration", ui::StyleType::Title),
        ui::style_text(&path.display().to_string(), ui::StyleType::Subtle)
    ))
}
