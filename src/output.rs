//! Export results.
//!
//! Everything here is `Serialize` so the CLI can print a run as JSON.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Rendered document for one annotation batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportOutput {
    /// Concatenated fragments in input order. This is what gets appended.
    pub markdown: String,
    /// Non-empty fragments, in input order.
    pub fragments: Vec<RenderedFragment>,
    pub stats: ExportStats,
}

/// Markdown produced by one annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedFragment {
    /// 0-indexed position in the input batch.
    pub index: usize,
    pub kind: String,
    pub markdown: String,
    /// Destination of the relocated image, for `image` annotations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,
}

/// Counters for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportStats {
    pub total_annotations: usize,
    pub highlights: usize,
    pub notes: usize,
    pub images: usize,
    /// Annotations of unknown kind.
    pub ignored: usize,
    /// Known-kind annotations that had nothing to render.
    pub empty: usize,
    /// Byte length of the rendered document.
    pub markdown_bytes: usize,
}

/// Outcome of [`crate::export::export`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReport {
    pub page: u32,
    /// File the document was appended to.
    pub output_path: PathBuf,
    /// False when the batch was empty and nothing was written.
    pub appended: bool,
    pub output: ExportOutput,
}
