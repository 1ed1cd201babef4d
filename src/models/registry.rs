//! External model runner detection.
//!
//! The [`ModelRegistry`] discovers and caches the locations of the external
//! runner executables (sd, rembg, stylize) and provides lookup methods for
//! the model implementations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ModelsConfig;
use crate::error::{Error, Result};

/// Known runner names that the registry manages.
const KNOWN_RUNNERS: &[&str] = &["sd", "rembg", "stylize"];

/// Availability information for a runner, returned by [`ModelRegistry::check_all`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Runner name.
    pub name: String,
    /// Whether the runner was found.
    pub available: bool,
    /// Version string (first line of `--version` output), if available.
    pub version: Option<String>,
    /// Resolved path to the executable.
    pub path: Option<PathBuf>,
}

/// Registry holding discovered runner executables.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    runners: HashMap<String, PathBuf>,
}

impl ModelRegistry {
    /// Discover runners by searching `PATH` (or using overrides from config).
    ///
    /// For each known runner, if the [`ModelsConfig`] supplies a custom path
    /// **and** that path exists, it is used directly. Otherwise
    /// [`which::which`] is used to locate the runner in `PATH`. Runners that
    /// are not found are silently omitted; lookups fail at call time.
    pub fn discover(models_config: &ModelsConfig) -> Self {
        let mut runners = HashMap::new();

        for &name in KNOWN_RUNNERS {
            let custom_path = match name {
                "sd" => models_config.sd_path.as_deref(),
                "rembg" => models_config.rembg_path.as_deref(),
                "stylize" => models_config.stylize_path.as_deref(),
                _ => None,
            };

            let resolved = match custom_path {
                Some(p) if p.exists() => Some(p.to_path_buf()),
                // Custom path missing or unset; fall back to PATH.
                _ => which::which(name).ok(),
            };

            if let Some(path) = resolved {
                runners.insert(name.to_string(), path);
            }
        }

        Self { runners }
    }

    /// Return the executable path for the given runner, or an
    /// [`Error::Model`] if the runner was not found during discovery.
    pub fn require(&self, name: &str) -> Result<&Path> {
        self.runners.get(name).map(PathBuf::as_path).ok_or_else(|| {
            Error::model(
                name,
                format!("{name} not found; is it installed and in PATH?"),
            )
        })
    }

    /// Check all known runners and return availability information.
    pub fn check_all(&self) -> Vec<ModelInfo> {
        KNOWN_RUNNERS
            .iter()
            .map(|&name| {
                if let Some(path) = self.runners.get(name) {
                    ModelInfo {
                        name: name.to_string(),
                        available: true,
                        version: detect_version(path),
                        path: Some(path.clone()),
                    }
                } else {
                    ModelInfo {
                        name: name.to_string(),
                        available: false,
                        version: None,
                        path: None,
                    }
                }
            })
            .collect()
    }
}

/// Run `<runner> --version` and return the first line of stdout.
fn detect_version(path: &Path) -> Option<String> {
    let output = std::process::Command::new(path)
        .arg("--version")
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|s| s.to_string())
}
