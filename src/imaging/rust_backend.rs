//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, WebP, BMP, TIFF) | `image::ImageReader` with the format guessed from the bytes |
//! | Resize (after any fill) | `DynamicImage::resize_exact` with the configured filter (Lanczos3 by default) |
//! | Background fill | solid `RgbaImage` + `imageops::overlay` (alpha blended) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with quality |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless only) |
//! | Encode → BMP | `image::codecs::bmp::BmpEncoder` (24-bit) |

use super::backend::{Dimensions, ImageBackend, SourceImage};
use super::calculations::check_pixel_limit;
use super::error::TransformError;
use super::format::{TargetFormat, normalize_mime};
use super::params::{Background, RenderParams};
use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ColorType, DynamicImage, ImageFormat, ImageReader, Rgba, RgbaImage, imageops};
use std::io::Cursor;

/// Pure Rust backend using the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend {
    max_pixels: u64,
}

impl RustBackend {
    pub fn new() -> Self {
        Self {
            max_pixels: super::params::TransformSettings::default().max_pixels,
        }
    }

    /// Refuse to decode sources whose header announces more than `max_pixels`.
    pub fn with_max_pixels(max_pixels: u64) -> Self {
        Self { max_pixels }
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the decoder: file signature first, declared MIME type as fallback.
fn detect_format(bytes: &[u8], mime: &str) -> Result<ImageFormat, TransformError> {
    image::guess_format(bytes)
        .ok()
        .or_else(|| ImageFormat::from_mime_type(normalize_mime(mime)))
        .ok_or_else(|| TransformError::DecodingFailed(format!("unknown image format ({mime})")))
}

/// Read width and height from the header without decoding pixels.
fn inspect_dimensions(bytes: &[u8], format: ImageFormat) -> Result<Dimensions, TransformError> {
    let (width, height) = ImageReader::with_format(Cursor::new(bytes), format)
        .into_dimensions()
        .map_err(|e| TransformError::DecodingFailed(e.to_string()))?;
    Ok(Dimensions { width, height })
}

/// Flatten onto the background at the source size if requested, then scale.
///
/// Filling before resampling keeps the colour of fully transparent pixels
/// out of the filter kernel at alpha edges.
fn draw(img: &DynamicImage, params: &RenderParams) -> DynamicImage {
    let surface = match params.background {
        Some(background) => flatten(img, background),
        None => img.clone(),
    };

    if surface.width() == params.width && surface.height() == params.height {
        surface
    } else {
        surface.resize_exact(params.width, params.height, params.filter.filter_type())
    }
}

/// Composite onto a solid background and drop the alpha channel.
fn flatten(img: &DynamicImage, background: Background) -> DynamicImage {
    let [r, g, b] = background.0;
    let mut surface = RgbaImage::from_pixel(img.width(), img.height(), Rgba([r, g, b, 255]));
    imageops::overlay(&mut surface, &img.to_rgba8(), 0, 0);
    DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(surface).to_rgb8())
}

fn encode(img: &DynamicImage, params: &RenderParams) -> Result<Vec<u8>, TransformError> {
    let mut buf = Cursor::new(Vec::new());

    let result = match params.format {
        TargetFormat::Jpeg => {
            let quality = params.quality.unwrap_or_default().to_percent();
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)
        }
        TargetFormat::Png => {
            let encoder = PngEncoder::new(&mut buf);
            match img.color() {
                ColorType::Rgb32F | ColorType::Rgba32F => {
                    DynamicImage::ImageRgba8(img.to_rgba8()).write_with_encoder(encoder)
                }
                _ => img.write_with_encoder(encoder),
            }
        }
        TargetFormat::WebP => {
            let encoder = WebPEncoder::new_lossless(&mut buf);
            if img.color().has_alpha() {
                DynamicImage::ImageRgba8(img.to_rgba8()).write_with_encoder(encoder)
            } else {
                DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)
            }
        }
        TargetFormat::Bmp => {
            let encoder = BmpEncoder::new(&mut buf);
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)
        }
    };

    result.map_err(|e| {
        TransformError::EncodingFailed(format!("{} encode failed: {e}", params.format.label()))
    })?;

    let bytes = buf.into_inner();
    if bytes.is_empty() {
        return Err(TransformError::EncodingFailed(format!(
            "{} encoder produced no data",
            params.format.label()
        )));
    }
    Ok(bytes)
}

impl ImageBackend for RustBackend {
    fn decode(&self, bytes: &[u8], mime: &str) -> Result<SourceImage, TransformError> {
        let format = detect_format(bytes, mime)?;
        let header = inspect_dimensions(bytes, format)?;
        check_pixel_limit(header, self.max_pixels)?;

        let pixels = ImageReader::with_format(Cursor::new(bytes), format)
            .decode()
            .map_err(|e| TransformError::DecodingFailed(e.to_string()))?;

        log::debug!(
            "decoded {} (declared {mime}) {}x{} {:?}",
            format.to_mime_type(),
            pixels.width(),
            pixels.height(),
            pixels.color()
        );
        SourceImage::new(pixels, format.to_mime_type())
    }

    fn render(
        &self,
        source: &SourceImage,
        params: &RenderParams,
    ) -> Result<Vec<u8>, TransformError> {
        let surface = draw(source.pixels(), params);
        let bytes = encode(&surface, params)?;
        log::debug!(
            "rendered {}x{} {} ({} bytes, background: {})",
            params.width,
            params.height,
            params.format.label(),
            bytes.len(),
            params.background.is_some()
        );
        Ok(bytes)
    }
}
