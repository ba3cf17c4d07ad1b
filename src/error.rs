//! Error type for the annot2md library.
//!
//! Every failure in this crate is fatal to the run: there are no retries and
//! no partial-success results. Unknown annotation kinds and missing optional
//! fields are *not* errors; they render nothing (see
//! [`crate::annotation::Annotation::Ignored`]).
//!
//! Image relocation is a one-shot move. If [`AnnotMdError::ImageMoveFailed`]
//! is returned the source image may or may not still exist; callers must not
//! re-run the same annotation batch expecting the move to succeed.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the annot2md library.
#[derive(Debug, Error)]
pub enum AnnotMdError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The annotation payload is not a JSON array of annotation records.
    #[error("Annotation data is not a valid JSON array: {source}")]
    InvalidAnnotations {
        #[source]
        source: serde_json::Error,
    },

    // ── Image relocation errors ───────────────────────────────────────────
    /// The extracted image named by an `image` annotation does not exist.
    #[error("Extracted image not found: '{path}'\nWas this annotation batch already exported?")]
    ImageNotFound { path: PathBuf },

    /// The image output directory does not exist or is not a directory.
    #[error("Image output directory does not exist: '{path}'\nCreate it before exporting.")]
    ImageDirMissing { path: PathBuf },

    /// The rename itself failed (permissions, cross-device move, ...).
    #[error("Failed to move image '{from}' to '{to}': {source}")]
    ImageMoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or append to the target Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// The config file exists but could not be read.
    #[error("Failed to read config file '{path}': {source}")]
    ConfigReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder or job validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The process working directory could not be determined.
    #[error("Cannot determine the current working directory: {source}")]
    WorkingDirUnavailable {
        #[source]
        source: std::io::Error,
    },
}
