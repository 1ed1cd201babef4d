//! Artifact download routes.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio_util::io::ReaderStream;

use super::error::AppError;
use super::AppContext;
use crate::error::Error;

/// Name of the archive produced by `GET /download-all`.
const ZIP_FILENAME: &str = "generated_images.zip";

/// Download a single image file from the output directory.
pub async fn download(
    State(ctx): State<AppContext>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let path = ctx.store.find(&filename)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(attachment_response(&path, &name).await?)
}

/// Download all generated images as a ZIP file.
pub async fn download_all(State(ctx): State<AppContext>) -> Result<Response, AppError> {
    let store = ctx.store.clone();
    let zip_path = ctx.config.server.static_dir.join(ZIP_FILENAME);

    let zip_target = zip_path.clone();
    let path = tokio::task::spawn_blocking(move || store.zip_all(&zip_target))
        .await
        .map_err(|e| Error::Internal(format!("zip task failed: {e}")))??;

    Ok(attachment_response(&path, ZIP_FILENAME).await?)
}

/// Serve the favicon.ico file, or 204 when none is installed.
pub async fn favicon(State(ctx): State<AppContext>) -> Response {
    let path = ctx.config.server.static_dir.join("favicon.ico");
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "image/vnd.microsoft.icon".to_string())],
            bytes,
        )
            .into_response(),
        Err(_) => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Stream a file back as an attachment download.
async fn attachment_response(path: &std::path::Path, name: &str) -> Result<Response, Error> {
    let file = tokio::fs::File::open(path).await?;
    let stream = ReaderStream::new(file);

    let content_type = match path.extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{name}\""),
            ),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}
