mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./imageforge.toml",
        "~/.config/imageforge/config.toml",
        "/etc/imageforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.generation.max_images == 0 {
        anyhow::bail!("generation.max_images must be at least 1");
    }

    for (i, style) in config.models.styles.iter().enumerate() {
        if style.name.trim().is_empty() {
            anyhow::bail!("models.styles[{}] has an empty name", i);
        }
        if !style.weights.exists() {
            // Requests naming this style fall back to the unstyled image.
            tracing::warn!(
                "Weights for style '{}' not found at {:?}",
                style.name,
                style.weights
            );
        }
    }

    let mut names: Vec<&str> = config.models.styles.iter().map(|s| s.name.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    if names.len() != config.models.styles.len() {
        anyhow::bail!("models.styles contains duplicate style names");
    }

    Ok(())
}
