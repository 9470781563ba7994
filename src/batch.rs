//! Batch conversion of many files at once.
//!
//! Inputs are files or directories (walked recursively). Every supported
//! image is transformed independently and written to the output directory as
//! `<stem>.<ext>`; a failure on one file is recorded and the rest continue.
//!
//! ## Output Structure
//!
//! ```text
//! out/
//! ├── 001-dawn.jpg
//! ├── 002-mountains.jpg
//! └── report.json      # only with --report
//! ```
//!
//! ## Parallel Processing
//!
//! Files are processed in parallel using [rayon](https://docs.rs/rayon). Each
//! worker sends a [`BatchEvent`] as it finishes so the caller can print
//! progress while the batch is still running.

use crate::imaging::calculations::apply_aspect_lock;
use crate::imaging::format::is_supported_input;
use crate::imaging::{
    ImageBackend, RustBackend, TargetFormat, TargetSpec, TransformError, TransformOutcome,
    TransformSettings, sniff_mime, transform,
};
use crate::naming::batch_output_path;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error("No supported images found in the given inputs")]
    NoInputs,
    #[error("Output path {0} is already used by another input")]
    OutputCollision(PathBuf),
}

/// What to do with every input file.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub out_dir: PathBuf,
    pub spec: TargetSpec,
    /// Derive a missing width or height from each source's own ratio.
    pub aspect_lock: bool,
}

/// Progress events emitted during a batch.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started {
        total: usize,
        format: TargetFormat,
    },
    Converted {
        index: usize,
        source: PathBuf,
        output: PathBuf,
        width: u32,
        height: u32,
        bytes: usize,
    },
    Skipped {
        index: usize,
        source: PathBuf,
    },
    Failed {
        index: usize,
        source: PathBuf,
        error: String,
    },
}

/// Final per-file results, in input order.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub format: TargetFormat,
    pub out_dir: PathBuf,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub entries: Vec<BatchEntry>,
}

#[derive(Debug, Serialize)]
pub struct BatchEntry {
    pub source: PathBuf,
    #[serde(flatten)]
    pub status: EntryStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EntryStatus {
    Converted {
        output: PathBuf,
        width: u32,
        height: u32,
        bytes: usize,
    },
    /// Already in the target format and size; nothing written.
    Skipped,
    Failed {
        error: String,
    },
}

impl BatchReport {
    fn from_entries(job: &BatchJob, entries: Vec<BatchEntry>) -> Self {
        let count = |pred: fn(&EntryStatus) -> bool| {
            entries.iter().filter(|e| pred(&e.status)).count()
        };
        Self {
            format: job.spec.format,
            out_dir: job.out_dir.clone(),
            converted: count(|s| matches!(s, EntryStatus::Converted { .. })),
            skipped: count(|s| matches!(s, EntryStatus::Skipped)),
            failed: count(|s| matches!(s, EntryStatus::Failed { .. })),
            entries,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Expand files and directories into a sorted, de-duplicated input list.
///
/// Directories are walked recursively and filtered by extension. Files named
/// explicitly are kept even with an unknown extension; decoding decides.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>, BatchError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        for entry in WalkDir::new(path).follow_links(true) {
            let entry = entry?;
            if entry.file_type().is_file() && is_supported_input(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

pub fn run_batch(
    inputs: &[PathBuf],
    job: &BatchJob,
    settings: &TransformSettings,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchReport, BatchError> {
    let backend = RustBackend::with_max_pixels(settings.max_pixels);
    run_batch_with_backend(&backend, inputs, job, settings, events)
}

/// Run a batch with a specific backend (allows testing with mock).
pub fn run_batch_with_backend(
    backend: &impl ImageBackend,
    inputs: &[PathBuf],
    job: &BatchJob,
    settings: &TransformSettings,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchReport, BatchError> {
    let files = collect_inputs(inputs)?;
    if files.is_empty() {
        return Err(BatchError::NoInputs);
    }
    std::fs::create_dir_all(&job.out_dir)?;

    let targets = assign_outputs(&files, job);
    if let Some(tx) = &events {
        tx.send(BatchEvent::Started {
            total: files.len(),
            format: job.spec.format,
        })
        .ok();
    }
    log::info!(
        "batch: {} inputs -> {} in {}",
        files.len(),
        job.spec.format,
        job.out_dir.display()
    );

    let entries: Vec<BatchEntry> = files
        .par_iter()
        .zip(targets.par_iter())
        .enumerate()
        .map(|(i, (source, target))| {
            let status = target
                .as_ref()
                .map_err(|collision| BatchError::OutputCollision(collision.clone()))
                .and_then(|output| process_file(backend, source, output, job, settings))
                .unwrap_or_else(|e| {
                    log::warn!("{}: {}", source.display(), e);
                    EntryStatus::Failed {
                        error: e.to_string(),
                    }
                });

            if let Some(tx) = &events {
                tx.send(event_for(i + 1, source, &status)).ok();
            }
            BatchEntry {
                source: source.clone(),
                status,
            }
        })
        .collect();

    Ok(BatchReport::from_entries(job, entries))
}

/// Compute output paths up front; the second input claiming a path gets an error.
fn assign_outputs(files: &[PathBuf], job: &BatchJob) -> Vec<Result<PathBuf, PathBuf>> {
    let mut claimed = HashSet::new();
    files
        .iter()
        .map(|file| {
            let output = batch_output_path(file, &job.out_dir, job.spec.format);
            if claimed.insert(output.clone()) {
                Ok(output)
            } else {
                Err(output)
            }
        })
        .collect()
}

fn process_file(
    backend: &impl ImageBackend,
    source_path: &Path,
    output: &Path,
    job: &BatchJob,
    settings: &TransformSettings,
) -> Result<EntryStatus, BatchError> {
    let bytes = std::fs::read(source_path)?;
    let mime = sniff_mime(&bytes)?;
    let source = backend.decode(&bytes, &mime)?;

    let spec = if job.aspect_lock {
        apply_aspect_lock(source.dimensions(), &job.spec)
    } else {
        job.spec.clone()
    };

    match transform(backend, &source, &spec, settings)? {
        TransformOutcome::Skipped => Ok(EntryStatus::Skipped),
        TransformOutcome::Encoded(image) => {
            std::fs::write(output, image.bytes())?;
            log::debug!("wrote {} ({} bytes)", output.display(), image.len());
            Ok(EntryStatus::Converted {
                output: output.to_path_buf(),
                width: image.dimensions().width,
                height: image.dimensions().height,
                bytes: image.len(),
            })
        }
    }
}

fn event_for(index: usize, source: &Path, status: &EntryStatus) -> BatchEvent {
    let source = source.to_path_buf();
    match status {
        EntryStatus::Converted {
            output,
            width,
            height,
            bytes,
        } => BatchEvent::Converted {
            index,
            source,
            output: output.clone(),
            width: *width,
            height: *height,
            bytes: *bytes,
        },
        EntryStatus::Skipped => BatchEvent::Skipped { index, source },
        EntryStatus::Failed { error } => BatchEvent::Failed {
            index,
            source,
            error: error.clone(),
        },
    }
}

/// Write the report as pretty-printed JSON.
pub fn write_report(report: &BatchReport, path: &Path) -> Result<(), BatchError> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}
