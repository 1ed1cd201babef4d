//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from TOML and carries all
//! sub-configs for the server, output locations, model runners and sampling
//! defaults. Every section defaults sensibly so an empty file is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub output: OutputConfig,
    pub models: ModelsConfig,
    pub generation: GenerationConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory served under `/static` (also holds favicon.ico and the
    /// download-all zip).
    pub static_dir: PathBuf,
    /// Base URL prepended to artifact paths in JSON API responses.
    pub public_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            static_dir: PathBuf::from("static"),
            public_base_url: "http://localhost:5000".to_string(),
        }
    }
}

/// Artifact output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory where generated and uploaded images are written.
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("static/generated"),
        }
    }
}

/// External model runner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Explicit path to the diffusion runner (`sd`). Falls back to PATH.
    pub sd_path: Option<PathBuf>,
    /// Explicit path to the background matting runner (`rembg`).
    pub rembg_path: Option<PathBuf>,
    /// Explicit path to the style transfer runner (`stylize`).
    pub stylize_path: Option<PathBuf>,
    /// Styles available for the post-generation transfer pass.
    pub styles: Vec<StyleConfig>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            sd_path: None,
            rembg_path: None,
            stylize_path: None,
            styles: vec![
                StyleConfig {
                    name: "vangogh".to_string(),
                    weights: PathBuf::from("models/vangogh_model.pth"),
                },
                StyleConfig {
                    name: "picasso".to_string(),
                    weights: PathBuf::from("models/picasso_model.pth"),
                },
            ],
        }
    }
}

/// A named style and the pretrained weights file backing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    pub name: String,
    pub weights: PathBuf,
}

impl ModelsConfig {
    /// Look up a style by name (case-insensitive).
    pub fn find_style(&self, name: &str) -> Option<&StyleConfig> {
        self.styles
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }
}

/// Diffusion sampling defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Denoising steps per sample.
    pub steps: u32,
    /// Classifier-free guidance scale.
    pub guidance_scale: f32,
    /// Upper bound on `num_images` per request.
    pub max_images: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            steps: 50,
            guidance_scale: 7.5,
            max_images: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_builtin_styles() {
        let config = Config::default();
        assert_eq!(config.models.styles.len(), 2);
        assert!(config.models.find_style("vangogh").is_some());
        assert!(config.models.find_style("VanGogh").is_some());
        assert!(config.models.find_style("cubist").is_none());
    }

    #[test]
    fn empty_toml_is_valid() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.generation.steps, 50);
        assert_eq!(config.output.dir, PathBuf::from("static/generated"));
    }

    #[test]
    fn partial_toml_overrides() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 8080

            [generation]
            max_images = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.generation.max_images, 2);
    }
}
