//! Text-to-image generation via the `sd` diffusion runner.

use std::process::Command;
use std::sync::Arc;

use image::DynamicImage;

use super::{run_checked, ModelRegistry, SampleOptions, TextToImage};
use crate::error::Result;

/// [`TextToImage`] implementation backed by a stable-diffusion CLI runner.
///
/// Each sample is written to a temp file by the runner and decoded back into
/// memory. The runner is resolved at call time so a missing installation
/// surfaces as a model error on the request instead of failing startup.
pub struct DiffusionRunner {
    registry: Arc<ModelRegistry>,
}

impl DiffusionRunner {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }
}

impl TextToImage for DiffusionRunner {
    fn generate(
        &self,
        prompt: &str,
        count: u32,
        opts: SampleOptions,
    ) -> Result<Vec<DynamicImage>> {
        let runner = self.registry.require("sd")?;
        let work_dir = tempfile::tempdir()?;

        let mut images = Vec::with_capacity(count as usize);
        for i in 0..count {
            let out_path = work_dir.path().join(format!("sample_{i}.png"));

            tracing::debug!("Sampling image {}/{} for prompt", i + 1, count);
            run_checked(
                "sd",
                Command::new(runner)
                    .arg("-p")
                    .arg(prompt)
                    .arg("--steps")
                    .arg(opts.steps.to_string())
                    .arg("--cfg-scale")
                    .arg(opts.guidance_scale.to_string())
                    .arg("-o")
                    .arg(&out_path),
            )?;

            images.push(image::open(&out_path)?);
        }

        Ok(images)
    }
}
