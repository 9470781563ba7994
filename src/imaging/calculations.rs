//! Pure dimension math: no I/O, no pixels.
//!
//! Covers the resize controls (aspect-locked width/height edits and
//! percentage scaling) and the resolution of a [`TargetSpec`] against a
//! source size. Every computed axis is clamped to at least one pixel, the
//! same rule the size inputs apply to empty or zero entries.

use super::backend::Dimensions;
use super::error::TransformError;
use super::params::TargetSpec;

/// Largest percentage the resize controls accept.
pub const MAX_PERCENT: u32 = 200;

fn round_axis(value: f64) -> u32 {
    (value.round() as u32).max(1)
}

/// Aspect-locked width edit: derive the height from the original ratio.
pub fn lock_to_width(original: Dimensions, new_width: u32) -> Dimensions {
    let width = new_width.max(1);
    let aspect = original.width as f64 / original.height as f64;
    Dimensions {
        width,
        height: round_axis(width as f64 / aspect),
    }
}

/// Aspect-locked height edit: derive the width from the original ratio.
pub fn lock_to_height(original: Dimensions, new_height: u32) -> Dimensions {
    let height = new_height.max(1);
    let aspect = original.width as f64 / original.height as f64;
    Dimensions {
        width: round_axis(height as f64 * aspect),
        height,
    }
}

/// Scale both axes by a percentage of the original size, within `1..=MAX_PERCENT`.
pub fn scale_by_percent(original: Dimensions, percent: u32) -> Dimensions {
    let percent = percent.clamp(1, MAX_PERCENT) as f64;
    Dimensions {
        width: round_axis(original.width as f64 * percent / 100.0),
        height: round_axis(original.height as f64 * percent / 100.0),
    }
}

/// Percentage `new_axis` represents of `original_axis`.
pub fn percent_of(original_axis: u32, new_axis: u32) -> f64 {
    new_axis as f64 / original_axis as f64 * 100.0
}

/// Resolve the output size of a transform.
///
/// Each omitted axis keeps the source's value. Requested axes must be at
/// least 1.
pub fn resolve_dimensions(
    source: Dimensions,
    spec: &TargetSpec,
) -> Result<Dimensions, TransformError> {
    let width = spec.width.unwrap_or(source.width);
    let height = spec.height.unwrap_or(source.height);
    if width == 0 || height == 0 {
        return Err(TransformError::InvalidDimensions { width, height });
    }
    Ok(Dimensions { width, height })
}

/// Fill in the missing axis of a one-sided resize from the source ratio.
///
/// Specs with both axes, or neither, come back unchanged.
pub fn apply_aspect_lock(source: Dimensions, spec: &TargetSpec) -> TargetSpec {
    let mut locked = spec.clone();
    match (spec.width, spec.height) {
        (Some(width), None) if width > 0 => {
            locked.height = Some(lock_to_width(source, width).height);
        }
        (None, Some(height)) if height > 0 => {
            locked.width = Some(lock_to_height(source, height).width);
        }
        _ => {}
    }
    locked
}

/// Reject pixel counts above `limit`.
pub fn check_pixel_limit(dims: Dimensions, limit: u64) -> Result<(), TransformError> {
    let pixels = dims.pixel_count();
    if pixels > limit {
        return Err(TransformError::ResourceLimit { pixels, limit });
    }
    Ok(())
}
