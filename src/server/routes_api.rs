//! JSON API endpoints and the request plumbing shared with the HTML routes.

use std::path::{Path, PathBuf};

use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::error::AppError;
use super::AppContext;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::pipeline::{self, GenerateRequest};

// ============================================================================
// Request/response types
// ============================================================================

/// Body for `POST /api/generate`.
#[derive(Debug, Deserialize)]
pub struct ApiGenerateRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default = "default_num_images")]
    pub num_images: u32,
    #[serde(default)]
    pub style: Option<String>,
}

pub(crate) fn default_num_images() -> u32 {
    1
}

/// Response for `POST /api/generate`.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub images: Vec<String>,
}

/// Response for `POST /api/remove_bg`.
#[derive(Debug, Serialize)]
pub struct RemoveBgResponse {
    pub removed_bg_image: String,
}

/// Parsed multipart body for the background removal endpoints.
pub(crate) struct RemoveBgUpload {
    /// Client filename and bytes of the image to process.
    pub image: (String, Vec<u8>),
    /// "transparent" (default) or "custom".
    pub bg_option: String,
    /// Replacement background, used when `bg_option` is "custom".
    pub custom_bg: Option<(String, Vec<u8>)>,
    /// Whether to run the 2x upscale pass on the result.
    pub enhance: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// API endpoint to generate AI images.
pub async fn api_generate(
    State(ctx): State<AppContext>,
    Json(req): Json<ApiGenerateRequest>,
) -> std::result::Result<Json<GenerateResponse>, AppError> {
    let request = GenerateRequest {
        prompt: req.prompt,
        num_images: req.num_images,
        style: req.style,
    };

    let paths = run_generate(&ctx, request).await?;
    let images = paths
        .iter()
        .map(|p| public_url(&ctx.config, p))
        .collect();

    Ok(Json(GenerateResponse { images }))
}

/// API endpoint to remove the background from an uploaded image.
pub async fn api_remove_bg(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> std::result::Result<Json<RemoveBgResponse>, AppError> {
    let upload = read_remove_bg_multipart(multipart).await?;
    let output = run_remove_bg(&ctx, upload).await?;

    Ok(Json(RemoveBgResponse {
        removed_bg_image: public_url(&ctx.config, &output),
    }))
}

// ============================================================================
// Shared plumbing
// ============================================================================

/// Run the generation pipeline off the async runtime.
pub(crate) async fn run_generate(
    ctx: &AppContext,
    request: GenerateRequest,
) -> Result<Vec<PathBuf>> {
    let generator = ctx.generator.clone();
    let styler = ctx.styler.clone();
    let store = ctx.store.clone();
    let config = ctx.config.clone();

    tokio::task::spawn_blocking(move || {
        pipeline::generate_images(
            generator.as_ref(),
            styler.as_ref(),
            &config.models,
            &config.generation,
            &store,
            &request,
        )
    })
    .await
    .map_err(|e| Error::Internal(format!("generation task failed: {e}")))?
}

/// Persist the upload, then run matting, optional background replacement and
/// optional enhancement off the async runtime.
pub(crate) async fn run_remove_bg(ctx: &AppContext, upload: RemoveBgUpload) -> Result<PathBuf> {
    let store = ctx.store.clone();
    let matting = ctx.matting.clone();

    let input = store.save_upload(&upload.image.0, &upload.image.1)?;

    let custom_bg = match (upload.bg_option.as_str(), upload.custom_bg) {
        ("custom", Some((name, data))) => Some(store.save_upload(&name, &data)?),
        _ => None,
    };

    let enhance = upload.enhance;
    tokio::task::spawn_blocking(move || {
        let mut output = pipeline::remove_background(matting.as_ref(), &input)?;
        if let Some(bg) = custom_bg {
            output = pipeline::replace_background(&output, &bg)?;
        }
        if enhance {
            output = pipeline::enhance_image(&output)?;
        }
        Ok(output)
    })
    .await
    .map_err(|e| Error::Internal(format!("background task failed: {e}")))?
}

/// Read the multipart body of a background removal request.
pub(crate) async fn read_remove_bg_multipart(mut multipart: Multipart) -> Result<RemoveBgUpload> {
    let mut image = None;
    let mut bg_option = "transparent".to_string();
    let mut custom_bg = None;
    let mut enhance = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Validation(format!("Invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("image") => {
                let name = field.file_name().unwrap_or("upload.png").to_string();
                let data = read_field_bytes(field).await?;
                image = Some((name, data));
            }
            Some("custom_bg") => {
                let name = field.file_name().unwrap_or("background.png").to_string();
                let data = read_field_bytes(field).await?;
                // Browsers submit an empty part when no file is selected.
                if !data.is_empty() {
                    custom_bg = Some((name, data));
                }
            }
            Some("bg_option") => {
                bg_option = read_field_text(field).await?;
            }
            Some("enhance") => {
                let value = read_field_text(field).await?;
                enhance = matches!(value.as_str(), "true" | "on" | "1");
            }
            _ => {}
        }
    }

    let image = image.ok_or_else(|| Error::Validation("No file uploaded".into()))?;

    Ok(RemoveBgUpload {
        image,
        bg_option,
        custom_bg,
        enhance,
    })
}

async fn read_field_bytes(field: axum::extract::multipart::Field<'_>) -> Result<Vec<u8>> {
    Ok(field
        .bytes()
        .await
        .map_err(|e| Error::Validation(format!("Failed to read upload: {e}")))?
        .to_vec())
}

async fn read_field_text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| Error::Validation(format!("Failed to read form field: {e}")))
}

/// Absolute URL for an artifact, as returned by the JSON API.
pub(crate) fn public_url(config: &Config, path: &Path) -> String {
    format!(
        "{}{}",
        config.server.public_base_url.trim_end_matches('/'),
        relative_url(path)
    )
}

/// Site-relative URL for an artifact, as used by the HTML pages.
pub(crate) fn relative_url(path: &Path) -> String {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("/static/generated/{filename}")
}
