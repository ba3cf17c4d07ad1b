//! Progress-callback trait for per-annotation export events.
//!
//! Inject an [`Arc<dyn ExportProgressCallback>`] via
//! [`crate::config::ExportConfigBuilder::progress_callback`] to receive
//! events as the assembler walks the annotation batch.
//!
//! # Example
//!
//! ```rust
//! use annot2md::{ExportConfig, ExportProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct ImageCounter {
//!     moved: AtomicUsize,
//! }
//!
//! impl ExportProgressCallback for ImageCounter {
//!     fn on_image_relocated(&self, _from: &std::path::Path, to: &std::path::Path) {
//!         self.moved.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("moved image to {}", to.display());
//!     }
//! }
//!
//! let config = ExportConfig::builder()
//!     .progress_callback(Arc::new(ImageCounter { moved: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the assembler as it processes each annotation.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive in annotation order on the calling
/// thread.
pub trait ExportProgressCallback: Send + Sync {
    /// Called once before the first annotation is rendered.
    ///
    /// Not called for an empty batch.
    fn on_export_start(&self, total_annotations: usize) {
        let _ = total_annotations;
    }

    /// Called after an annotation produced a fragment.
    ///
    /// # Arguments
    /// * `index`: 0-indexed position in the batch
    /// * `total`: batch size
    /// * `kind`: annotation kind as it appeared in the input
    /// * `fragment_len`: byte length of the rendered fragment
    fn on_annotation_rendered(&self, index: usize, total: usize, kind: &str, fragment_len: usize) {
        let _ = (index, total, kind, fragment_len);
    }

    /// Called when an annotation contributed nothing (ignored kind or
    /// nothing to render).
    fn on_annotation_skipped(&self, index: usize, total: usize, kind: &str) {
        let _ = (index, total, kind);
    }

    /// Called after an extracted image has been moved into the output directory.
    fn on_image_relocated(&self, from: &Path, to: &Path) {
        let _ = (from, to);
    }

    /// Called once after the fragment has been appended to the target file.
    fn on_export_complete(&self, output_path: &Path, appended_bytes: usize) {
        let _ = (output_path, appended_bytes);
    }
}

/// Type alias for a shared, dynamically-dispatched progress callback.
pub type ProgressCallback = Arc<dyn ExportProgressCallback>;

/// No-op callback used when the caller did not supply one.
pub(crate) struct NoopProgressCallback;

impl ExportProgressCallback for NoopProgressCallback {}
