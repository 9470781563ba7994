//! Tool configuration module.
//!
//! Handles loading, validating and merging `config.toml`. Stock defaults are
//! the base layer; a user file (passed with `--config`, or `image-press.toml`
//! in the working directory) is merged on top of them.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! format = "jpeg"           # Default target for convert/batch: jpeg | png | webp | bmp
//! quality = 0.9             # Lossy encoding quality (0.0-1.0)
//!
//! [resize]
//! filter = "lanczos3"       # nearest | triangle | catmullrom | gaussian | lanczos3
//! aspect_lock = true        # Derive the missing axis from the source ratio
//!
//! [background]
//! color = "#ffffff"         # Fill behind transparent pixels for JPEG/BMP output
//!
//! [limits]
//! max_pixels = 100000000    # Refuse sources or outputs larger than this
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::imaging::{Background, Quality, ResizeFilter, TargetFormat, TransformSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "image-press.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `config.toml`.
///
/// All fields have defaults; user files only specify overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Output format and quality defaults.
    pub output: OutputConfig,
    /// Resampling settings.
    pub resize: ResizeConfig,
    /// Background fill for opaque targets.
    pub background: BackgroundConfig,
    /// Resource limits.
    pub limits: LimitsConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl ToolConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 0.0-1.0".into(),
            ));
        }
        if Background::from_hex(&self.background.color).is_none() {
            return Err(ConfigError::Validation(format!(
                "background.color must be #rgb or #rrggbb, got {:?}",
                self.background.color
            )));
        }
        if self.limits.max_pixels == 0 {
            return Err(ConfigError::Validation(
                "limits.max_pixels must be non-zero".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Transform knobs derived from this config.
    pub fn transform_settings(&self) -> TransformSettings {
        TransformSettings {
            filter: self.resize.filter,
            background: Background::from_hex(&self.background.color).unwrap_or_default(),
            max_pixels: self.limits.max_pixels,
            default_quality: Quality::new(self.output.quality),
        }
    }
}

/// Output defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Target format when a command does not name one.
    pub format: TargetFormat,
    /// Lossy encoding quality (0.0 = smallest, 1.0 = best).
    pub quality: f32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: TargetFormat::Jpeg,
            quality: 0.9,
        }
    }
}

/// Resampling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    pub filter: ResizeFilter,
    /// When only one axis is given, derive the other from the source ratio.
    pub aspect_lock: bool,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            filter: ResizeFilter::Lanczos3,
            aspect_lock: true,
        }
    }
}

/// Background fill settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackgroundConfig {
    /// CSS-style hex colour.
    pub color: String,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            color: "#ffffff".to_string(),
        }
    }
}

/// Resource limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    pub max_pixels: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_pixels: 100_000_000,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel batch workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// Base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(ToolConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ToolConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ToolConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, merged over stock defaults.
///
/// A missing file yields the defaults; an explicitly requested file that is
/// missing is an error (see [`load_explicit_config`]).
pub fn load_config(path: &Path) -> Result<ToolConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Load a config file the user named explicitly; it must exist.
pub fn load_explicit_config(path: &Path) -> Result<ToolConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("config file not found: {}", path.display()),
        )));
    }
    load_config(path)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# image-press configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Save as image-press.toml in the working directory, or pass --config FILE.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output defaults
# ---------------------------------------------------------------------------
[output]
# Target format when `convert`/`batch` are not given --to.
# One of: jpeg, png, webp, bmp.
format = "jpeg"

# Lossy encoding quality, 0.0 (smallest) to 1.0 (best).
# Only JPEG is lossy; PNG, WebP and BMP ignore it.
quality = 0.9

# ---------------------------------------------------------------------------
# Resizing
# ---------------------------------------------------------------------------
[resize]
# Resampling filter: nearest, triangle, catmullrom, gaussian, lanczos3.
filter = "lanczos3"

# When only --width or --height is given, derive the other axis from the
# source aspect ratio. Set to false to keep the source's other axis as-is.
aspect_lock = true

# ---------------------------------------------------------------------------
# Background
# ---------------------------------------------------------------------------
[background]
# Colour painted under transparent pixels when the target cannot store
# alpha (JPEG, BMP).
color = "#ffffff"

# ---------------------------------------------------------------------------
# Limits
# ---------------------------------------------------------------------------
[limits]
# Largest accepted source or output, in pixels (width x height).
max_pixels = 100000000

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for `batch`.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
