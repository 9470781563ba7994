//! Encode targets and input classification.
//!
//! The set of output formats is fixed: JPEG, PNG, WebP and BMP. Inputs are
//! accepted by MIME prefix (`image/*`) and decoded by whatever decoders the
//! `image` crate has compiled in.
//!
//! | Format | MIME | Extension | Alpha | Lossy |
//! |---|---|---|---|---|
//! | JPEG | `image/jpeg` | `jpg` | no | yes |
//! | PNG | `image/png` | `png` | yes | no |
//! | WebP | `image/webp` | `webp` | yes | no (lossless encoder) |
//! | BMP | `image/bmp` | `bmp` | no | no |

use super::error::TransformError;
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Jpeg,
    Png,
    #[serde(rename = "webp")]
    WebP,
    Bmp,
}

impl TargetFormat {
    pub const ALL: [TargetFormat; 4] = [Self::Jpeg, Self::Png, Self::WebP, Self::Bmp];

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
            Self::Bmp => "image/bmp",
        }
    }

    /// Conventional file extension, used for output file names.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Bmp => "bmp",
        }
    }

    /// Short uppercase label shown to users.
    pub fn label(self) -> &'static str {
        match self {
            Self::Jpeg => "JPG",
            Self::Png => "PNG",
            Self::WebP => "WEBP",
            Self::Bmp => "BMP",
        }
    }

    /// Whether the encoded file can carry an alpha channel.
    ///
    /// Opaque targets get transparent regions filled with the background
    /// colour before encoding.
    pub fn supports_alpha(self) -> bool {
        matches!(self, Self::Png | Self::WebP)
    }

    /// Whether the quality factor has any effect on the encoder.
    pub fn is_lossy(self) -> bool {
        matches!(self, Self::Jpeg)
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::WebP => ImageFormat::WebP,
            Self::Bmp => ImageFormat::Bmp,
        }
    }

    /// Resolve a MIME type string. Only the four encode targets are accepted.
    pub fn from_mime(mime: &str) -> Result<Self, TransformError> {
        match normalize_mime(mime).as_str() {
            "image/jpeg" => Ok(Self::Jpeg),
            "image/png" => Ok(Self::Png),
            "image/webp" => Ok(Self::WebP),
            "image/bmp" => Ok(Self::Bmp),
            _ => Err(TransformError::UnsupportedFormat(mime.to_string())),
        }
    }

    /// Parse a user-supplied format: MIME type, extension or name.
    ///
    /// `"jpg"`, `"JPEG"`, `"image/jpeg"` and `"image/jpg"` all give [`TargetFormat::Jpeg`].
    pub fn parse(input: &str) -> Result<Self, TransformError> {
        let trimmed = input.trim();
        if trimmed.contains('/') {
            return Self::from_mime(trimmed);
        }
        match trimmed.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::WebP),
            "bmp" => Ok(Self::Bmp),
            _ => Err(TransformError::UnsupportedFormat(input.to_string())),
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lowercase a MIME type, drop parameters and fold known aliases.
pub fn normalize_mime(mime: &str) -> String {
    let essence = mime
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "image/jpg" | "image/pjpeg" => "image/jpeg".to_string(),
        "image/x-ms-bmp" | "image/x-bmp" => "image/bmp".to_string(),
        _ => essence,
    }
}

/// Accept an input by its declared MIME type.
///
/// Anything outside the `image/` family is rejected with the message shown
/// to users on a bad upload.
pub fn classify_mime(mime: &str) -> Result<String, TransformError> {
    let normalized = normalize_mime(mime);
    if normalized.starts_with("image/") {
        Ok(normalized)
    } else {
        Err(TransformError::InvalidInput(
            "Please upload an image file".to_string(),
        ))
    }
}

/// Infer a MIME type from the file signature.
pub fn sniff_mime(bytes: &[u8]) -> Result<String, TransformError> {
    let kind = infer::get(bytes).ok_or_else(|| {
        TransformError::InvalidInput("Unrecognized file signature".to_string())
    })?;
    if kind.matcher_type() != infer::MatcherType::Image {
        return Err(TransformError::InvalidInput(format!(
            "Not an image file: {}",
            kind.mime_type()
        )));
    }
    classify_mime(kind.mime_type())
}

/// Extensions of input files the compiled-in decoders can read.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &["jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff"]
}

pub fn is_supported_input(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}
