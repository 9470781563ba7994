//! High-level image operations.
//!
//! These functions combine calculations with backend execution: they take a
//! source, a [`TargetSpec`] and the shared [`TransformSettings`], compute a
//! [`RenderParams`] plan and hand it to the backend.

use super::backend::{Dimensions, EncodedImage, ImageBackend, SourceImage};
use super::calculations::{check_pixel_limit, resolve_dimensions};
use super::error::TransformError;
use super::params::{RenderParams, TargetSpec, TransformSettings};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, TransformError>;

/// What a transform produced.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformOutcome {
    Encoded(EncodedImage),
    /// Same format, same size, no lossy recompression requested: nothing to do.
    Skipped,
}

impl TransformOutcome {
    pub fn encoded(&self) -> Option<&EncodedImage> {
        match self {
            Self::Encoded(image) => Some(image),
            Self::Skipped => None,
        }
    }

    pub fn into_encoded(self) -> Option<EncodedImage> {
        match self {
            Self::Encoded(image) => Some(image),
            Self::Skipped => None,
        }
    }
}

/// Whether `spec` would leave `source` unchanged.
///
/// True when the source is already in the target format and no resize is
/// requested (or the requested size equals the source size). An explicit
/// quality only counts for lossy targets; lossless targets ignore it.
pub fn is_identity(source: &SourceImage, spec: &TargetSpec) -> bool {
    let same_format = source.format() == Some(spec.format);
    let same_size = resolve_dimensions(source.dimensions(), spec)
        .is_ok_and(|dims| dims == source.dimensions());
    let recompress = spec.quality.is_some() && spec.format.is_lossy();
    same_format && same_size && !recompress
}

/// Plan a render without executing it.
///
/// Resolves the output size, decides whether transparent pixels need a
/// background fill and picks the quality for lossy targets.
pub fn plan_render(
    source: &SourceImage,
    spec: &TargetSpec,
    settings: &TransformSettings,
) -> Result<RenderParams> {
    let dims = resolve_dimensions(source.dimensions(), spec)?;
    check_pixel_limit(dims, settings.max_pixels)?;

    let background = (!spec.format.supports_alpha() && source.may_have_alpha())
        .then_some(settings.background);
    let quality = spec
        .format
        .is_lossy()
        .then(|| spec.quality.unwrap_or(settings.default_quality));

    Ok(RenderParams {
        width: dims.width,
        height: dims.height,
        format: spec.format,
        quality,
        background,
        filter: settings.filter,
    })
}

/// Render `source` as described by `spec`, even when nothing would change.
///
/// Explicit resizes use this so they always produce an artifact.
pub fn render(
    backend: &impl ImageBackend,
    source: &SourceImage,
    spec: &TargetSpec,
    settings: &TransformSettings,
) -> Result<EncodedImage> {
    let params = plan_render(source, spec, settings)?;
    let bytes = backend.render(source, &params)?;
    if bytes.is_empty() {
        return Err(TransformError::EncodingFailed(format!(
            "{} encoder returned no data",
            spec.format.label()
        )));
    }

    Ok(EncodedImage::new(
        bytes,
        spec.format,
        Dimensions {
            width: params.width,
            height: params.height,
        },
    ))
}

/// Resize and/or re-encode `source` as described by `spec`.
///
/// Returns [`TransformOutcome::Skipped`] for the identity case instead of
/// re-encoding. The source is never modified.
pub fn transform(
    backend: &impl ImageBackend,
    source: &SourceImage,
    spec: &TargetSpec,
    settings: &TransformSettings,
) -> Result<TransformOutcome> {
    if is_identity(source, spec) {
        log::info!(
            "skipping transform: source is already {} at {}x{}",
            spec.format.label(),
            source.dimensions().width,
            source.dimensions().height
        );
        return Ok(TransformOutcome::Skipped);
    }

    render(backend, source, spec, settings).map(TransformOutcome::Encoded)
}
