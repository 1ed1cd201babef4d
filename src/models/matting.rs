//! Background removal via the `rembg` segmentation runner.

use std::process::Command;
use std::sync::Arc;

use image::DynamicImage;

use super::{run_checked, BackgroundMatting, ModelRegistry};
use crate::error::Result;

/// [`BackgroundMatting`] implementation backed by the `rembg` CLI.
///
/// The input image is handed to the runner through a temp file and the
/// alpha-masked result is decoded back into memory.
pub struct MattingRunner {
    registry: Arc<ModelRegistry>,
}

impl MattingRunner {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }
}

impl BackgroundMatting for MattingRunner {
    fn remove(&self, image: &DynamicImage) -> Result<DynamicImage> {
        let runner = self.registry.require("rembg")?;
        let work_dir = tempfile::tempdir()?;

        let in_path = work_dir.path().join("input.png");
        let out_path = work_dir.path().join("output.png");
        image.save(&in_path)?;

        run_checked(
            "rembg",
            Command::new(runner).arg("i").arg(&in_path).arg(&out_path),
        )?;

        Ok(image::open(&out_path)?)
    }
}
