//! Text-to-image generation with an optional style transfer pass.

use std::path::PathBuf;

use crate::config::{GenerationConfig, ModelsConfig};
use crate::error::{Error, Result};
use crate::gallery::{stage_path, OutputStore};
use crate::models::{SampleOptions, StyleTransfer, TextToImage};

/// Parameters for one generation request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub num_images: u32,
    /// Style name, or `None`/"none" for unstyled output.
    pub style: Option<String>,
}

impl GenerateRequest {
    fn style_name(&self) -> Option<&str> {
        self.style
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("none"))
    }
}

/// Generate images for a prompt and persist them to the output store.
///
/// Each sample is saved as `generated_image_{i}.png`. When the request names
/// a configured style whose weights file exists on disk, the sample is
/// additionally run through the style model and the styled artifact
/// (`_{style}.png`) becomes the returned path. An unknown style or a missing
/// weights file leaves the sample untouched.
pub fn generate_images(
    generator: &dyn TextToImage,
    styler: &dyn StyleTransfer,
    models: &ModelsConfig,
    generation: &GenerationConfig,
    store: &OutputStore,
    request: &GenerateRequest,
) -> Result<Vec<PathBuf>> {
    let prompt = request.prompt.trim();
    if prompt.is_empty() {
        return Err(Error::Validation("Prompt is required".into()));
    }
    if request.num_images == 0 || request.num_images > generation.max_images {
        return Err(Error::Validation(format!(
            "num_images must be between 1 and {}",
            generation.max_images
        )));
    }

    let opts = SampleOptions {
        steps: generation.steps,
        guidance_scale: generation.guidance_scale,
    };

    tracing::info!(
        "Generating {} image(s), style={:?}",
        request.num_images,
        request.style_name()
    );
    let images = generator.generate(prompt, request.num_images, opts)?;

    let style = request.style_name().and_then(|name| {
        let Some(style) = models.find_style(name) else {
            tracing::warn!("Unknown style '{}' requested; skipping", name);
            return None;
        };
        if !style.weights.exists() {
            tracing::warn!(
                "Weights for style '{}' missing at {:?}; skipping",
                style.name,
                style.weights
            );
            return None;
        }
        Some(style)
    });

    let mut paths = Vec::with_capacity(images.len());
    for (i, img) in images.iter().enumerate() {
        let path = store.generated_path(i);
        img.save(&path)?;

        let final_path = match style {
            Some(style) => {
                let styled = styler.stylize(img, &style.weights)?;
                let styled_path = stage_path(&path, &format!("_{}", style.name));
                styled.save(&styled_path)?;
                styled_path
            }
            None => path,
        };
        paths.push(final_path);
    }

    Ok(paths)
}
