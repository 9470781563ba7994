//! CLI output formatting for every command.
//!
//! # Notice-First Display
//!
//! Every single-image command ends with exactly one notice line: what
//! happened, then the file it produced. Failures use the same one-line shape
//! with the action that failed as a prefix, so a failed conversion reads the
//! way a failed upload does.
//!
//! # Output Format
//!
//! ## Convert / Resize
//!
//! ```text
//! Loaded image/png 500x500
//! Converted PNG → JPG
//! Saved converted-image.jpg (500x500, 41.2 KB)
//! ```
//!
//! ## Batch
//!
//! ```text
//! Converting 3 images → JPG
//! 001 dawn.png → out/dawn.jpg (800x600, 95.1 KB)
//! 002 dusk.jpg: already in target format, skipped
//! 003 notes.png: failed
//!     Unrecognized file signature
//! Converted 1, skipped 1, failed 1
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `String` or `Vec<String>`)
//! for testability and a `print_*` wrapper that writes to stdout or stderr.
//! Format functions are pure: no I/O, no side effects.

use crate::batch::{BatchEvent, BatchReport};
use crate::imaging::{Dimensions, TargetFormat};
use crate::session::Notice;
use std::fmt::Display;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn format_dims(dims: Dimensions) -> String {
    format!("{}x{}", dims.width, dims.height)
}

/// Human-readable byte size: `512 B`, `41.2 KB`, `3.0 MB`.
fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

/// File name only, falling back to the full path.
fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Single-image notices
// ============================================================================

/// One-line summary of a session operation.
pub fn format_notice(notice: &Notice) -> String {
    match notice {
        Notice::Loaded { dimensions, mime } => {
            format!("Loaded {} {}", mime, format_dims(*dimensions))
        }
        Notice::Resized { dimensions } => format!("Resized to {}", format_dims(*dimensions)),
        Notice::Converted { from, to } => match from {
            Some(from) => format!("Converted {} \u{2192} {}", from, to),
            None => format!("Converted to {}", to),
        },
        Notice::SameFormat => "Image is already in this format".to_string(),
    }
}

/// Where an artifact was written.
pub fn format_saved(path: &Path, dimensions: Dimensions, bytes: usize) -> String {
    format!(
        "Saved {} ({}, {})",
        path.display(),
        format_dims(dimensions),
        format_size(bytes)
    )
}

/// One-line failure notice: `Error converting image format: ...`.
pub fn format_error(action: &str, error: &dyn Display) -> String {
    format!("Error {}: {}", action, error)
}

pub fn print_notice(notice: &Notice) {
    println!("{}", format_notice(notice));
}

pub fn print_saved(path: &Path, dimensions: Dimensions, bytes: usize) {
    println!("{}", format_saved(path, dimensions, bytes));
}

pub fn print_error(action: &str, error: &dyn Display) {
    eprintln!("{}", format_error(action, error));
}

// ============================================================================
// Formats table
// ============================================================================

/// Table of encode targets for the `formats` command.
///
/// ```text
/// Format  MIME        Ext   Alpha  Quality
/// JPG     image/jpeg  jpg   no     yes
/// ```
pub fn format_formats_table(input_extensions: &[&str]) -> Vec<String> {
    let mut lines = vec![format!(
        "{:<7} {:<11} {:<5} {:<6} {}",
        "Format", "MIME", "Ext", "Alpha", "Quality"
    )];
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    for format in TargetFormat::ALL {
        lines.push(format!(
            "{:<7} {:<11} {:<5} {:<6} {}",
            format.label(),
            format.mime_type(),
            format.extension(),
            yes_no(format.supports_alpha()),
            yes_no(format.is_lossy())
        ));
    }
    lines.push(String::new());
    lines.push(format!("Readable inputs: {}", input_extensions.join(", ")));
    lines
}

pub fn print_formats_table(input_extensions: &[&str]) {
    for line in format_formats_table(input_extensions) {
        println!("{}", line);
    }
}

// ============================================================================
// Batch output
// ============================================================================

/// Format a single batch progress event.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { total, format } => {
            let noun = if *total == 1 { "image" } else { "images" };
            vec![format!("Converting {} {} \u{2192} {}", total, noun, format)]
        }
        BatchEvent::Converted {
            index,
            source,
            output,
            width,
            height,
            bytes,
        } => vec![format!(
            "{} {} \u{2192} {} ({}x{}, {})",
            format_index(*index),
            file_name(source),
            output.display(),
            width,
            height,
            format_size(*bytes)
        )],
        BatchEvent::Skipped { index, source } => vec![format!(
            "{} {}: already in target format, skipped",
            format_index(*index),
            file_name(source)
        )],
        BatchEvent::Failed {
            index,
            source,
            error,
        } => vec![
            format!("{} {}: failed", format_index(*index), file_name(source)),
            format!("    {}", error),
        ],
    }
}

/// Closing line of a batch run.
pub fn format_batch_summary(report: &BatchReport) -> String {
    format!(
        "Converted {}, skipped {}, failed {}",
        report.converted, report.skipped, report.failed
    )
}

pub fn print_batch_summary(report: &BatchReport) {
    println!("{}", format_batch_summary(report));
}

// ============================================================================
// Tests
// ============================================================================
