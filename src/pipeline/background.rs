//! Background removal, replacement and resolution enhancement.

use std::path::{Path, PathBuf};

use image::imageops::FilterType;

use crate::error::{Error, Result};
use crate::gallery::stage_path;
use crate::models::BackgroundMatting;

/// Remove the background from the image at `input`, writing the
/// alpha-masked result next to it as `{stem}_no_bg.png`.
pub fn remove_background(matting: &dyn BackgroundMatting, input: &Path) -> Result<PathBuf> {
    if !input.exists() {
        return Err(Error::not_found("image", input.display()));
    }

    let image = image::open(input)?;
    let cutout = matting.remove(&image)?;

    let out_path = stage_path(input, "_no_bg");
    cutout.save(&out_path)?;
    Ok(out_path)
}

/// Composite the (alpha-masked) image at `input` over the background image
/// at `bg`, writing the result as `{stem}_with_bg.png`.
///
/// The background is resized to the foreground's dimensions first.
pub fn replace_background(input: &Path, bg: &Path) -> Result<PathBuf> {
    if !input.exists() {
        return Err(Error::not_found("image", input.display()));
    }
    if !bg.exists() {
        return Err(Error::not_found("background image", bg.display()));
    }

    let fg = image::open(input)?.to_rgba8();
    let mut canvas = image::open(bg)?
        .resize_exact(fg.width(), fg.height(), FilterType::Lanczos3)
        .to_rgba8();
    image::imageops::overlay(&mut canvas, &fg, 0, 0);

    let out_path = stage_path(input, "_with_bg");
    canvas.save(&out_path)?;
    Ok(out_path)
}

/// Upscale the image at `input` to twice its resolution with Lanczos
/// filtering, writing the result as `{stem}_enhanced.png`.
pub fn enhance_image(input: &Path) -> Result<PathBuf> {
    if !input.exists() {
        return Err(Error::not_found("image", input.display()));
    }

    let image = image::open(input)?;
    let upscaled = image.resize_exact(
        image.width() * 2,
        image.height() * 2,
        FilterType::Lanczos3,
    );

    let out_path = stage_path(input, "_enhanced");
    upscaled.save(&out_path)?;
    Ok(out_path)
}
