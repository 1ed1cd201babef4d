//! Integration tests for the background removal API.

mod common;

use common::{png_bytes, TestHarness};
use reqwest::multipart::{Form, Part};

fn image_part(width: u32, height: u32, color: [u8; 4], filename: &str) -> Part {
    Part::bytes(png_bytes(width, height, color))
        .file_name(filename.to_string())
        .mime_str("image/png")
        .unwrap()
}

#[tokio::test]
async fn api_remove_bg_returns_no_bg_artifact() {
    let (h, addr) = TestHarness::with_server().await;

    let form = Form::new().part("image", image_part(32, 32, [0, 0, 255, 255], "photo.png"));
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/remove_bg"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    let url = body["removed_bg_image"].as_str().unwrap();
    assert_eq!(url, "http://testserver/static/generated/photo_no_bg.png");

    let output = h.output_dir().join("photo_no_bg.png");
    assert!(output.is_file());

    // The stub matting clears the top-left pixel.
    let img = image::open(&output).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0[3], 0);
    assert_eq!(img.get_pixel(1, 1).0[3], 255);
}

#[tokio::test]
async fn api_remove_bg_without_image_is_rejected() {
    let (_h, addr) = TestHarness::with_server().await;

    let form = Form::new().text("bg_option", "transparent");
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/remove_bg"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"].as_str().unwrap(), "No file uploaded");
}

#[tokio::test]
async fn api_remove_bg_with_custom_background_composites() {
    let (h, addr) = TestHarness::with_server().await;

    let form = Form::new()
        .part("image", image_part(32, 32, [0, 0, 255, 255], "photo.png"))
        .text("bg_option", "custom")
        .part("custom_bg", image_part(8, 8, [0, 255, 0, 255], "scene.png"));
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/remove_bg"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    let url = body["removed_bg_image"].as_str().unwrap();
    assert!(url.ends_with("/photo_no_bg_with_bg.png"));

    let output = h.output_dir().join("photo_no_bg_with_bg.png");
    let img = image::open(&output).unwrap().to_rgba8();
    // Background is resized to the foreground dimensions.
    assert_eq!(img.dimensions(), (32, 32));
    // The cleared corner shows the green background, the rest stays blue.
    assert_eq!(img.get_pixel(0, 0).0, [0, 255, 0, 255]);
    assert_eq!(img.get_pixel(1, 1).0, [0, 0, 255, 255]);
}

#[tokio::test]
async fn api_remove_bg_ignores_custom_bg_when_transparent_selected() {
    let (_h, addr) = TestHarness::with_server().await;

    let form = Form::new()
        .part("image", image_part(32, 32, [0, 0, 255, 255], "photo.png"))
        .text("bg_option", "transparent")
        .part("custom_bg", image_part(8, 8, [0, 255, 0, 255], "scene.png"));
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/remove_bg"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    let url = body["removed_bg_image"].as_str().unwrap();
    assert!(url.ends_with("/photo_no_bg.png"));
}

#[tokio::test]
async fn api_remove_bg_with_enhance_doubles_resolution() {
    let (h, addr) = TestHarness::with_server().await;

    let form = Form::new()
        .part("image", image_part(32, 32, [0, 0, 255, 255], "photo.png"))
        .text("enhance", "true");
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/remove_bg"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    let url = body["removed_bg_image"].as_str().unwrap();
    assert!(url.ends_with("/photo_no_bg_enhanced.png"));

    let output = h.output_dir().join("photo_no_bg_enhanced.png");
    let img = image::open(&output).unwrap();
    assert_eq!(img.width(), 64);
    assert_eq!(img.height(), 64);
}

#[tokio::test]
async fn uploaded_filenames_are_reduced_to_their_final_component() {
    let (h, addr) = TestHarness::with_server().await;

    let form = Form::new().part(
        "image",
        image_part(16, 16, [0, 0, 255, 255], "../../evil.png"),
    );
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/remove_bg"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    let url = body["removed_bg_image"].as_str().unwrap();
    assert!(url.ends_with("/evil_no_bg.png"));
    assert!(h.output_dir().join("evil_no_bg.png").is_file());
}
