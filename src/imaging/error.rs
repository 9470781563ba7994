//! Error taxonomy for the transform pipeline.
//!
//! One enum covers every stage (intake, decode, plan, encode) so callers can
//! match on the failure kind and still get a readable one-line message.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    /// The input is not an image at all (wrong MIME prefix, unknown signature).
    #[error("{0}")]
    InvalidInput(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Invalid dimensions: {width}x{height} (both must be at least 1)")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Failed to decode image: {0}")]
    DecodingFailed(String),
    #[error("Failed to encode image: {0}")]
    EncodingFailed(String),
    #[error("Image too large: {pixels} pixels (limit {limit})")]
    ResourceLimit { pixels: u64, limit: u64 },
}
