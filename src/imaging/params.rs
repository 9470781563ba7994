//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which plans a transform) and the [`backend`](super::backend) (which does
//! the actual pixel work). Swapping the backend for a mock in tests leaves
//! the planning logic untouched.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality in `[0, 1]` (default 0.9). Clamped on construction.
//! - [`TargetSpec`]: What the caller asked for: format, optional size, optional quality.
//! - [`ResizeFilter`]: Resampling filter used when dimensions change.
//! - [`Background`]: Fill colour behind transparent pixels for opaque targets.
//! - [`TransformSettings`]: Config-driven knobs shared by every transform.
//! - [`RenderParams`]: Fully resolved plan handed to the backend.

use super::format::TargetFormat;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Quality factor for lossy encoding, in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quality(f32);

impl Quality {
    /// Clamp into `[0, 1]`. NaN falls back to the default.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Map onto the 1–100 scale the JPEG encoder takes.
    pub fn to_percent(self) -> u8 {
        ((self.0 * 100.0).round() as u8).clamp(1, 100)
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.9)
    }
}

/// A requested transform.
///
/// Omitted axes fall back to the source's own dimension, so a spec with only
/// a format is a pure conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSpec {
    pub format: TargetFormat,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quality: Option<Quality>,
}

impl TargetSpec {
    pub fn new(format: TargetFormat) -> Self {
        Self {
            format,
            width: None,
            height: None,
            quality: None,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = Some(quality);
        self
    }
}

/// Resampling filter, named as in `config.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl ResizeFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Opaque RGB fill colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Background(pub [u8; 3]);

impl Background {
    pub const WHITE: Background = Background([255, 255, 255]);

    /// Parse `#rrggbb` or `#rgb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().strip_prefix('#')?;
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return None,
        };
        let channel = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
        Some(Self([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Knobs that apply to every transform, usually loaded from config.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformSettings {
    pub filter: ResizeFilter,
    pub background: Background,
    /// Upper bound on source and output pixel counts.
    pub max_pixels: u64,
    /// Quality used for lossy targets when the `TargetSpec` has none.
    pub default_quality: Quality,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            filter: ResizeFilter::default(),
            background: Background::default(),
            max_pixels: 100_000_000,
            default_quality: Quality::default(),
        }
    }
}

/// Resolved plan for one render: surface size, fill, filter and encoder input.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    pub width: u32,
    pub height: u32,
    pub format: TargetFormat,
    /// `None` for lossless targets.
    pub quality: Option<Quality>,
    /// Set when transparent pixels must be flattened onto a solid colour.
    pub background: Option<Background>,
    pub filter: ResizeFilter,
}
