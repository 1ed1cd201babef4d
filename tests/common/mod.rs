//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates a temp static/output directory
//! tree, a default config and a full [`AppContext`] with in-process stub
//! models. The [`with_server`] constructor starts Axum on a random port for
//! HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, Rgba, RgbaImage};

use imageforge::config::{Config, StyleConfig};
use imageforge::gallery::OutputStore;
use imageforge::models::{BackgroundMatting, SampleOptions, StyleTransfer, TextToImage};
use imageforge::server::{create_router, AppContext};
use imageforge::Result;

/// Deterministic stand-in for the diffusion runner: solid red 32x32 samples.
struct SolidGenerator;

impl TextToImage for SolidGenerator {
    fn generate(
        &self,
        _prompt: &str,
        count: u32,
        _opts: SampleOptions,
    ) -> Result<Vec<DynamicImage>> {
        Ok((0..count)
            .map(|_| {
                let mut img = RgbaImage::new(32, 32);
                for pixel in img.pixels_mut() {
                    *pixel = Rgba([255, 0, 0, 255]);
                }
                DynamicImage::ImageRgba8(img)
            })
            .collect())
    }
}

/// Stand-in for the matting runner: clears the alpha of the top-left pixel.
struct ClearCornerMatting;

impl BackgroundMatting for ClearCornerMatting {
    fn remove(&self, image: &DynamicImage) -> Result<DynamicImage> {
        let mut img = image.to_rgba8();
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        Ok(DynamicImage::ImageRgba8(img))
    }
}

/// Stand-in for the style runner: grayscales the image.
struct GrayscaleStyler;

impl StyleTransfer for GrayscaleStyler {
    fn stylize(&self, image: &DynamicImage, _weights: &Path) -> Result<DynamicImage> {
        Ok(image.grayscale())
    }
}

/// Test harness wrapping a fully-constructed [`AppContext`] backed by a
/// temp directory tree and stub models.
pub struct TestHarness {
    pub ctx: AppContext,
    _root: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new harness with default configuration.
    ///
    /// The style "vangogh" is configured with an existing weights file, so
    /// requesting it exercises the style transfer pass; any other style name
    /// is unknown and passes through.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("failed to create temp dir");
        let static_dir = root.path().join("static");
        let output_dir = static_dir.join("generated");
        std::fs::create_dir_all(&output_dir).expect("failed to create output dir");

        let weights = root.path().join("vangogh.pth");
        std::fs::write(&weights, b"weights").expect("failed to write weights file");

        let mut config = Config::default();
        config.server.static_dir = static_dir;
        config.server.public_base_url = "http://testserver".to_string();
        config.output.dir = output_dir.clone();
        config.models.styles = vec![StyleConfig {
            name: "vangogh".to_string(),
            weights,
        }];
        config.generation.max_images = 4;

        let ctx = AppContext {
            config: Arc::new(config),
            store: Arc::new(OutputStore::new(output_dir)),
            generator: Arc::new(SolidGenerator),
            matting: Arc::new(ClearCornerMatting),
            styler: Arc::new(GrayscaleStyler),
        };

        Self { ctx, _root: root }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        let harness = Self::new();
        let app = create_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// The artifact output directory.
    pub fn output_dir(&self) -> &Path {
        self.ctx.store.base_dir()
    }

    /// The directory served under `/static`.
    pub fn static_dir(&self) -> &Path {
        &self.ctx.config.server.static_dir
    }
}

/// Encode a solid-color PNG for use as an upload body.
pub fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let mut img = RgbaImage::new(width, height);
    for pixel in img.pixels_mut() {
        *pixel = Rgba(color);
    }
    let mut buf = std::io::Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .expect("failed to encode test png");
    buf.into_inner()
}
