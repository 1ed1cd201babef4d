//! The two stateless request-to-artifact pipelines.
//!
//! Each pipeline validates its input, invokes a model, persists the output
//! to a predictable path, optionally invokes a second model on that output,
//! and returns the final artifact path.

mod background;
mod generate;

pub use background::{enhance_image, remove_background, replace_background};
pub use generate::{generate_images, GenerateRequest};
