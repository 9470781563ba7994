//! # Image Press
//!
//! Resize, convert and compress raster images. One decoded image goes in, one
//! encoded buffer comes out:
//!
//! ```text
//! bytes ─ classify ─ decode ─ plan ─ draw (resize + flatten) ─ encode ─ artifact
//! ```
//!
//! Every step is synchronous and runs to completion; the source raster is
//! never modified, so the same source can feed any number of transforms.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Pure-Rust transform pipeline: formats, dimension math, decode, resize, encode |
//! | [`session`] | Explicit session state: loaded image, resize controls, the live artifact |
//! | [`batch`] | Parallel conversion of many files into an output directory |
//! | [`config`] | `image-press.toml` loading, merging over stock defaults, validation |
//! | [`naming`] | Artifact and batch output file names |
//! | [`output`] | CLI output formatting: notices, failures, batch progress |
//!
//! # Design Decisions
//!
//! ## A Fixed Set of Encode Targets
//!
//! Output is JPEG, PNG, WebP or BMP; nothing else. Inputs are broader: anything
//! the compiled-in decoders read (GIF and TIFF included). A GIF source can be
//! converted to PNG, but `image/gif` as a target is
//! [`UnsupportedFormat`](imaging::TransformError::UnsupportedFormat).
//!
//! ## White Under Transparency
//!
//! JPEG and BMP have no alpha channel. Sources that carry one are composited
//! over an opaque background (white unless `[background] color` says
//! otherwise) before encoding, so transparent regions never turn black.
//!
//! ## Same Format Is a No-Op
//!
//! Converting an image into the format it already has, at the same size and
//! with no explicit quality, returns
//! [`TransformOutcome::Skipped`](imaging::TransformOutcome::Skipped) rather than
//! re-encoding. Explicit resizes always render.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate for decoding, resampling and
//! every encoder. There are no system libraries to install; the binary is
//! self-contained.
//!
//! ## State Is a Value
//!
//! What a browser page would keep in globals (current image, current output,
//! form fields) lives in a [`session::Session`]. Each operation either
//! replaces state wholesale or fails without touching it.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;
