//! Neural style transfer via the `stylize` runner.

use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use image::DynamicImage;

use super::{run_checked, ModelRegistry, StyleTransfer};
use crate::error::Result;

/// [`StyleTransfer`] implementation backed by a stylization CLI runner.
///
/// The runner loads the pretrained weights file for the requested style and
/// re-renders the input. Whether a style is applied at all is decided by the
/// pipeline; this type only performs the invocation.
pub struct StyleRunner {
    registry: Arc<ModelRegistry>,
}

impl StyleRunner {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }
}

impl StyleTransfer for StyleRunner {
    fn stylize(&self, image: &DynamicImage, weights: &Path) -> Result<DynamicImage> {
        let runner = self.registry.require("stylize")?;
        let work_dir = tempfile::tempdir()?;

        let in_path = work_dir.path().join("input.png");
        let out_path = work_dir.path().join("output.png");
        image.save(&in_path)?;

        run_checked(
            "stylize",
            Command::new(runner)
                .arg("--model")
                .arg(weights)
                .arg("--input")
                .arg(&in_path)
                .arg("--output")
                .arg(&out_path),
        )?;

        Ok(image::open(&out_path)?)
    }
}
