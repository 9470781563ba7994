//! Interactive session state.
//!
//! A [`Session`] owns at most one loaded source image and at most one live
//! output artifact. Loading a new image drops both the previous source and
//! its artifact; every successful transform replaces the artifact. Failed
//! operations leave the session exactly as it was.
//!
//! The resize controls mirror a width/height/percentage form: editing one
//! field with the aspect lock on recomputes the others, and each edit
//! re-renders the artifact.

use crate::imaging::calculations::{
    MAX_PERCENT, lock_to_height, lock_to_width, percent_of, scale_by_percent,
};
use crate::imaging::{
    Dimensions, EncodedImage, ImageBackend, RustBackend, SourceImage, TargetFormat, TargetSpec,
    TransformError, TransformOutcome, TransformSettings, classify_mime, render, sniff_mime,
    transform,
};
use crate::naming::{ArtifactKind, artifact_file_name};

/// Width/height/percentage form state with an aspect lock.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeControls {
    original: Dimensions,
    current: Dimensions,
    aspect_locked: bool,
    percentage: f64,
}

impl ResizeControls {
    pub fn new(original: Dimensions) -> Self {
        Self {
            original,
            current: original,
            aspect_locked: true,
            percentage: 100.0,
        }
    }

    pub fn original(&self) -> Dimensions {
        self.original
    }

    pub fn current(&self) -> Dimensions {
        self.current
    }

    pub fn aspect_locked(&self) -> bool {
        self.aspect_locked
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    /// Edit the width. With the lock on, height and percentage follow.
    pub fn set_width(&mut self, width: u32) -> Dimensions {
        if self.aspect_locked {
            self.current = lock_to_width(self.original, width);
            self.percentage = percent_of(self.original.width, self.current.width);
        } else {
            self.current.width = width.max(1);
        }
        self.current
    }

    /// Edit the height. With the lock on, width and percentage follow.
    pub fn set_height(&mut self, height: u32) -> Dimensions {
        if self.aspect_locked {
            self.current = lock_to_height(self.original, height);
            self.percentage = percent_of(self.original.height, self.current.height);
        } else {
            self.current.height = height.max(1);
        }
        self.current
    }

    /// Scale both axes from the original size, regardless of the lock.
    ///
    /// The percentage is clamped to `1..=MAX_PERCENT`.
    pub fn set_percentage(&mut self, percent: u32) -> Dimensions {
        let percent = percent.clamp(1, MAX_PERCENT);
        self.percentage = percent as f64;
        self.current = scale_by_percent(self.original, percent);
        self.current
    }

    pub fn toggle_aspect_lock(&mut self) -> bool {
        self.aspect_locked = !self.aspect_locked;
        self.aspect_locked
    }
}

/// The single live output of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub image: EncodedImage,
    pub kind: ArtifactKind,
    /// Suggested download name, e.g. `converted-image.jpg`.
    pub file_name: String,
}

/// User-facing result of a session operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Loaded {
        dimensions: Dimensions,
        mime: String,
    },
    Resized {
        dimensions: Dimensions,
    },
    Converted {
        /// Source format, or `None` if the source is not itself an encode target (GIF, TIFF).
        from: Option<TargetFormat>,
        to: TargetFormat,
    },
    /// Conversion requested into the format the source already has.
    SameFormat,
}

/// Explicit session context: loaded image, resize controls, live artifact.
pub struct Session<B: ImageBackend = RustBackend> {
    backend: B,
    settings: TransformSettings,
    source: Option<SourceImage>,
    controls: Option<ResizeControls>,
    artifact: Option<Artifact>,
}

impl Session<RustBackend> {
    pub fn new(settings: TransformSettings) -> Self {
        let backend = RustBackend::with_max_pixels(settings.max_pixels);
        Self::with_backend(backend, settings)
    }
}

impl<B: ImageBackend> Session<B> {
    pub fn with_backend(backend: B, settings: TransformSettings) -> Self {
        Self {
            backend,
            settings,
            source: None,
            controls: None,
            artifact: None,
        }
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn controls(&self) -> Option<&ResizeControls> {
        self.controls.as_ref()
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    /// Take the artifact out of the session, e.g. to write it to disk.
    pub fn take_artifact(&mut self) -> Option<Artifact> {
        self.artifact.take()
    }

    /// Load raw bytes as the session's image.
    ///
    /// A declared MIME type must be in the `image/` family; without one the
    /// type is sniffed from the file signature.
    pub fn load(
        &mut self,
        bytes: &[u8],
        declared_mime: Option<&str>,
    ) -> Result<Notice, TransformError> {
        let mime = match declared_mime {
            Some(mime) => classify_mime(mime)?,
            None => sniff_mime(bytes)?,
        };
        let source = self.backend.decode(bytes, &mime)?;
        let dimensions = source.dimensions();
        let mime = source.mime().to_string();

        log::info!(
            "loaded {} image {}x{}",
            mime,
            dimensions.width,
            dimensions.height
        );
        self.controls = Some(ResizeControls::new(dimensions));
        self.source = Some(source);
        self.artifact = None;
        Ok(Notice::Loaded { dimensions, mime })
    }

    fn loaded(&self) -> Result<&SourceImage, TransformError> {
        self.source.as_ref().ok_or_else(no_image)
    }

    /// Render a PNG at exactly `width` x `height`.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<Notice, TransformError> {
        let source = self.loaded()?;
        let spec = TargetSpec::new(TargetFormat::Png).with_size(width, height);
        let image = render(&self.backend, source, &spec, &self.settings)?;
        let dimensions = image.dimensions();

        self.artifact = Some(Artifact {
            file_name: artifact_file_name(ArtifactKind::Resized, image.format()),
            kind: ArtifactKind::Resized,
            image,
        });
        Ok(Notice::Resized { dimensions })
    }

    /// Convert to `format` at the source size.
    ///
    /// Converting into the source's own format is a no-op reported as
    /// [`Notice::SameFormat`]; the current artifact is kept.
    pub fn convert(&mut self, format: TargetFormat) -> Result<Notice, TransformError> {
        self.apply(&TargetSpec::new(format))
    }

    /// Convert to a format named by MIME type (`image/webp`).
    pub fn convert_mime(&mut self, mime: &str) -> Result<Notice, TransformError> {
        let format = TargetFormat::from_mime(mime)?;
        self.convert(format)
    }

    /// Apply a full target spec (format, optional size and quality).
    pub fn apply(&mut self, spec: &TargetSpec) -> Result<Notice, TransformError> {
        let source = self.loaded()?;
        let from = source.format();

        match transform(&self.backend, source, spec, &self.settings)? {
            TransformOutcome::Skipped => Ok(Notice::SameFormat),
            TransformOutcome::Encoded(image) => {
                self.artifact = Some(Artifact {
                    file_name: artifact_file_name(ArtifactKind::Converted, image.format()),
                    kind: ArtifactKind::Converted,
                    image,
                });
                Ok(Notice::Converted {
                    from,
                    to: spec.format,
                })
            }
        }
    }

    pub fn set_width(&mut self, width: u32) -> Result<Notice, TransformError> {
        self.edit_controls(|c| c.set_width(width))
    }

    pub fn set_height(&mut self, height: u32) -> Result<Notice, TransformError> {
        self.edit_controls(|c| c.set_height(height))
    }

    pub fn set_percentage(&mut self, percent: u32) -> Result<Notice, TransformError> {
        self.edit_controls(|c| c.set_percentage(percent))
    }

    /// Apply a control edit and re-render; the edit is kept only if the render succeeds.
    fn edit_controls(
        &mut self,
        edit: impl FnOnce(&mut ResizeControls) -> Dimensions,
    ) -> Result<Notice, TransformError> {
        let mut controls = self.controls.clone().ok_or_else(no_image)?;
        let dims = edit(&mut controls);
        let notice = self.resize(dims.width, dims.height)?;
        self.controls = Some(controls);
        Ok(notice)
    }

    /// Flip the aspect lock. Returns the new state, or `None` with no image.
    pub fn toggle_aspect_lock(&mut self) -> Option<bool> {
        self.controls.as_mut().map(ResizeControls::toggle_aspect_lock)
    }

    /// Drop the source, controls and artifact.
    pub fn reset(&mut self) {
        self.source = None;
        self.controls = None;
        self.artifact = None;
    }
}

fn no_image() -> TransformError {
    TransformError::InvalidInput("No image loaded".to_string())
}
