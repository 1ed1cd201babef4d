//! Imageforge - web front end for AI image operations
//!
//! A thin orchestration layer over pre-trained models: text-to-image
//! generation (with optional style transfer) and background removal (with
//! optional replacement and enhancement). The heavy lifting is delegated to
//! external model runners; this crate handles request parsing, file-path
//! bookkeeping and sequencing.

pub mod config;
pub mod error;
pub mod gallery;
pub mod models;
pub mod pipeline;
pub mod server;

pub use error::{Error, Result};
