//! Dotfolder management — `$HOME/.folio/` with a seeded `config.toml`.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::AppConfig;

/// Dotfolder name under `$HOME`.
const DOTFOLDER: &str = ".folio";

/// Resolve the root path: `$HOME/.folio/`.
pub fn root_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(DOTFOLDER))
}

/// Resolve a path relative to the dotfolder root.
pub fn resolve(relative: &str) -> Result<PathBuf> {
    Ok(root_dir()?.join(relative))
}

/// Ensure the dotfolder exists and `config.toml` is seeded with
/// defaults. Idempotent — safe to call on every launch.
pub fn init_workspace() -> Result<()> {
    let root = root_dir()?;
    if !root.exists() {
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create directory: {}", root.display()))?;
        info!("created directory: {}", root.display());
    }

    let config_path = root.join("config.toml");
    if !config_path.exists() {
        let default_config = AppConfig::default();
        let toml_str = default_config
            .to_toml_string()
            .context("Failed to serialize default config")?;
        fs::write(&config_path, &toml_str)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        info!("created default config: {}", config_path.display());
    }

    Ok(())
}

/// Load the config from disk. If the schema drifted (missing fields),
/// regenerate defaults and persist them.
pub fn load_config() -> Result<AppConfig> {
    let config_path = resolve("config.toml")?;
    let raw = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;

    match AppConfig::from_toml_str(&raw) {
        Ok(config) => Ok(config),
        Err(_) => {
            info!("config.toml outdated, regenerating with defaults");
            let config = AppConfig::default();
            save_config(&config)?;
            Ok(config)
        }
    }
}

/// Write the config back to disk.
pub fn save_config(config: &AppConfig) -> Result<()> {
    let config_path = resolve("config.toml")?;
    let toml_str = config
        .to_toml_string()
        .context("Failed to serialize config")?;
    fs::write(&config_path, &toml_str)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(())
}
