//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: decode raw bytes into a [`SourceImage`], and render a source
//! according to a resolved [`RenderParams`] plan into encoded bytes.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the pure-Rust
//! `image` crate.

use super::error::TransformError;
use super::format::TargetFormat;
use super::params::RenderParams;
use image::DynamicImage;

/// Width and height of a raster, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// A decoded raster plus the MIME type it was decoded from.
///
/// Immutable once constructed; transforms borrow it and never write back.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: DynamicImage,
    mime: String,
}

impl SourceImage {
    /// Wrap a decoded raster. Empty rasters are rejected.
    pub fn new(pixels: DynamicImage, mime: impl Into<String>) -> Result<Self, TransformError> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(TransformError::InvalidDimensions {
                width: pixels.width(),
                height: pixels.height(),
            });
        }
        Ok(Self {
            pixels,
            mime: mime.into(),
        })
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.pixels.width(),
            height: self.pixels.height(),
        }
    }

    /// The source's format as an encode target, if it is one.
    pub fn format(&self) -> Option<TargetFormat> {
        TargetFormat::from_mime(&self.mime).ok()
    }

    /// Whether the pixel layout has an alpha channel, i.e. may be transparent.
    pub fn may_have_alpha(&self) -> bool {
        self.pixels.color().has_alpha()
    }
}

/// Encoded output buffer with its format and pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    bytes: Vec<u8>,
    format: TargetFormat,
    dimensions: Dimensions,
}

impl EncodedImage {
    pub fn new(bytes: Vec<u8>, format: TargetFormat, dimensions: Dimensions) -> Self {
        Self {
            bytes,
            format,
            dimensions,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn format(&self) -> TargetFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Trait for image processing backends.
///
/// Implementations must be `Sync` so the batch runner can share one across
/// rayon workers.
pub trait ImageBackend: Sync {
    /// Decode raw bytes. `mime` is a hint; backends may fall back to sniffing.
    fn decode(&self, bytes: &[u8], mime: &str) -> Result<SourceImage, TransformError>;

    /// Draw `source` onto a fresh surface as described by `params` and encode it.
    fn render(&self, source: &SourceImage, params: &RenderParams)
    -> Result<Vec<u8>, TransformError>;
}
