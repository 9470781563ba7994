//! Output file naming.
//!
//! Single-image artifacts follow the download names users already know:
//! - a resize produces `resized-image.png`
//! - a conversion produces `converted-image.<ext>` (`converted-image.jpg`, ...)
//!
//! Batch outputs keep the source stem and swap the extension:
//! `photos/001-dawn.png` → `<out>/001-dawn.jpg`.

use crate::imaging::TargetFormat;
use std::path::{Path, PathBuf};

/// Which operation produced an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Resized,
    Converted,
}

impl ArtifactKind {
    fn stem(self) -> &'static str {
        match self {
            Self::Resized => "resized-image",
            Self::Converted => "converted-image",
        }
    }
}

/// Download file name for a single artifact.
pub fn artifact_file_name(kind: ArtifactKind, format: TargetFormat) -> String {
    format!("{}.{}", kind.stem(), format.extension())
}

/// Output path for one batch input.
///
/// Inputs without a usable stem fall back to `image`.
pub fn batch_output_path(source: &Path, out_dir: &Path, format: TargetFormat) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "image".to_string());
    out_dir.join(format!("{}.{}", stem, format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resized_artifact_name() {
        assert_eq!(
            artifact_file_name(ArtifactKind::Resized, TargetFormat::Png),
            "resized-image.png"
        );
    }

    #[test]
    fn converted_artifact_names_use_extension() {
        let names: Vec<String> = TargetFormat::ALL
            .iter()
            .map(|f| artifact_file_name(ArtifactKind::Converted, *f))
            .collect();
        assert_eq!(
            names,
            vec![
                "converted-image.jpg",
                "converted-image.png",
                "converted-image.webp",
                "converted-image.bmp",
            ]
        );
    }

    #[test]
    fn batch_path_swaps_extension() {
        let out = batch_output_path(
            Path::new("photos/001-dawn.png"),
            Path::new("/out"),
            TargetFormat::Jpeg,
        );
        assert_eq!(out, PathBuf::from("/out/001-dawn.jpg"));
    }

    #[test]
    fn batch_path_keeps_inner_dots() {
        let out = batch_output_path(
            Path::new("a/scan.v2.tiff"),
            Path::new("out"),
            TargetFormat::WebP,
        );
        assert_eq!(out, PathBuf::from("out/scan.v2.webp"));
    }

    #[test]
    fn batch_path_without_stem() {
        let out = batch_output_path(Path::new("/"), Path::new("out"), TargetFormat::Bmp);
        assert_eq!(out, PathBuf::from("out/image.bmp"));
    }
}
