//! Image processing: pure Rust, in memory.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Classify input** | MIME prefix check + `infer` signature sniffing |
//! | **Decode** | `image::ImageReader` |
//! | **Resize** | `resize_exact` with a configurable filter (Lanczos3 default) |
//! | **Flatten** | white (configurable) background under transparent pixels |
//! | **Encode** | JPEG (quality), PNG, WebP (lossless), BMP |
//!
//! The module is split into:
//! - **Format**: the fixed set of encode targets and input classification
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
pub mod calculations;
pub mod error;
pub mod format;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{Dimensions, EncodedImage, ImageBackend, SourceImage};
pub use error::TransformError;
pub use format::{TargetFormat, classify_mime, sniff_mime, supported_input_extensions};
pub use operations::{TransformOutcome, is_identity, plan_render, render, transform};
pub use params::{Background, Quality, RenderParams, ResizeFilter, TargetSpec, TransformSettings};
pub use rust_backend::RustBackend;
