//! Server-rendered HTML pages for web users.
//!
//! The pages are small enough that they are rendered inline; there is no
//! template engine in the stack.

use axum::extract::{Multipart, State};
use axum::response::Html;
use axum::Form;
use serde::Deserialize;

use super::error::AppError;
use super::routes_api::{
    self, default_num_images, read_remove_bg_multipart, relative_url, run_generate, run_remove_bg,
};
use super::AppContext;
use crate::config::StyleConfig;
use crate::pipeline::GenerateRequest;

/// Form body for `POST /generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateForm {
    #[serde(default)]
    pub prompt: String,
    #[serde(default = "default_num_images")]
    pub num_images: u32,
    #[serde(default)]
    pub style: Option<String>,
}

/// Render the main HTML page for web users.
pub async fn index(State(ctx): State<AppContext>) -> Html<String> {
    render_index(&ctx.config.models.styles, &[])
}

/// Render HTML page for AI-generated images (for web users).
pub async fn generate(
    State(ctx): State<AppContext>,
    Form(form): Form<GenerateForm>,
) -> Result<Html<String>, AppError> {
    let request = GenerateRequest {
        prompt: form.prompt,
        num_images: form.num_images,
        style: form.style,
    };

    let paths = run_generate(&ctx, request).await?;
    let urls: Vec<String> = paths.iter().map(|p| relative_url(p)).collect();

    Ok(render_index(&ctx.config.models.styles, &urls))
}

/// Render the background removal page for web users.
pub async fn background_removal() -> Html<String> {
    render_remove_bg(None)
}

/// Render HTML page for background removal (for web users).
pub async fn remove_bg(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let upload = read_remove_bg_multipart(multipart).await?;
    let output = run_remove_bg(&ctx, upload).await?;

    Ok(render_remove_bg(Some(&routes_api::relative_url(&output))))
}

// ============================================================================
// Rendering
// ============================================================================

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title} - imageforge</title>
</head>
<body>
  <nav><a href="/">Generate</a> | <a href="/background-removal">Background removal</a></nav>
  <h1>{title}</h1>
{body}
</body>
</html>
"#
    ))
}

fn render_index(styles: &[StyleConfig], images: &[String]) -> Html<String> {
    let style_options: String = std::iter::once(r#"<option value="none">none</option>"#.to_string())
        .chain(styles.iter().map(|s| {
            format!(
                r#"<option value="{name}">{name}</option>"#,
                name = s.name
            )
        }))
        .collect();

    let gallery: String = if images.is_empty() {
        String::new()
    } else {
        let items: String = images
            .iter()
            .map(|url| {
                let filename = url.rsplit('/').next().unwrap_or_default();
                format!(
                    r#"    <li><img src="{url}" alt="generated image"> <a href="/download/{filename}">download</a></li>
"#
                )
            })
            .collect();
        format!(
            r#"  <h2>Generated images</h2>
  <ul>
{items}  </ul>
  <p><a href="/download-all">Download all as zip</a></p>
"#
        )
    };

    let body = format!(
        r#"  <form method="post" action="/generate">
    <label>Prompt <input type="text" name="prompt" required></label>
    <label>Images <input type="number" name="num_images" value="1" min="1"></label>
    <label>Style <select name="style">{style_options}</select></label>
    <button type="submit">Generate</button>
  </form>
{gallery}"#
    );

    page("AI image generation", &body)
}

fn render_remove_bg(result_url: Option<&str>) -> Html<String> {
    let result: String = match result_url {
        Some(url) => {
            let filename = url.rsplit('/').next().unwrap_or_default();
            format!(
                r#"  <h2>Result</h2>
  <img src="{url}" alt="background removed">
  <p><a href="/download/{filename}">download</a></p>
"#
            )
        }
        None => String::new(),
    };

    let body = format!(
        r#"  <form method="post" action="/remove_bg" enctype="multipart/form-data">
    <label>Image <input type="file" name="image" required></label>
    <label>Background
      <select name="bg_option">
        <option value="transparent">transparent</option>
        <option value="custom">custom</option>
      </select>
    </label>
    <label>Custom background <input type="file" name="custom_bg"></label>
    <label>Enhance resolution <input type="checkbox" name="enhance" value="true"></label>
    <button type="submit">Remove background</button>
  </form>
{result}"#
    );

    page("Background removal", &body)
}
