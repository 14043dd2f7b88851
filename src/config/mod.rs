pub mod schema;

pub use schema::{GeneratorConfig, API_KEY_ENV};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Default config location (~/.toolgen/config.toml).
pub fn default_config_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".toolgen"))
        .unwrap_or_else(|| PathBuf::from(".toolgen"))
        .join("config.toml")
}

/// Expand a leading `~` in a user-supplied path.
pub fn resolve_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Load config from the given path, or return defaults.
pub fn load_config(path: &Path) -> Result<GeneratorConfig> {
    if !path.exists() {
        return Ok(GeneratorConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read toolgen config {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("Invalid toolgen config {}", path.display()))
}

/// Save config to the given path (TOML format).
pub fn save_config(config: &GeneratorConfig, path: &Path) -> Result<()> {
    let contents = toml::to_string_pretty(config).context("Failed to serialize toolgen config")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write toolgen config {}", path.display()))
}
