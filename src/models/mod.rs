//! Delegation seams for the pre-trained models.
//!
//! All heavy computation is performed by external runner processes; the
//! traits here are the boundary the rest of the crate talks to. Production
//! implementations spawn the runner with a temp-file handoff; tests swap in
//! in-process stubs.

pub mod diffusion;
pub mod matting;
pub mod registry;
pub mod style;

pub use diffusion::DiffusionRunner;
pub use matting::MattingRunner;
pub use registry::{ModelInfo, ModelRegistry};
pub use style::StyleRunner;

use std::path::Path;
use std::process::Command;

use image::DynamicImage;

use crate::error::{Error, Result};

/// Sampling parameters forwarded to the diffusion runner.
#[derive(Debug, Clone, Copy)]
pub struct SampleOptions {
    pub steps: u32,
    pub guidance_scale: f32,
}

/// Text-to-image generation.
pub trait TextToImage: Send + Sync {
    /// Produce `count` images for the given prompt.
    fn generate(&self, prompt: &str, count: u32, opts: SampleOptions)
        -> Result<Vec<DynamicImage>>;
}

/// Background removal via a segmentation model.
pub trait BackgroundMatting: Send + Sync {
    /// Return the image with its background replaced by transparency.
    fn remove(&self, image: &DynamicImage) -> Result<DynamicImage>;
}

/// Neural style transfer with a pretrained weights file.
pub trait StyleTransfer: Send + Sync {
    /// Re-render the image in the style encoded by `weights`.
    fn stylize(&self, image: &DynamicImage, weights: &Path) -> Result<DynamicImage>;
}

/// Run a runner invocation to completion, surfacing non-zero exits as
/// [`Error::Model`] with the captured stderr.
pub(crate) fn run_checked(name: &str, command: &mut Command) -> Result<()> {
    let output = command
        .output()
        .map_err(|e| Error::model(name, format!("failed to spawn: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::model(
            name,
            format!("exited with {}: {}", output.status, stderr.trim()),
        ));
    }

    Ok(())
}
