//! Placeholder link resolution: `[](lnk)` → `[p3](paper.pdf#page=3)`.
//!
//! Readers type the placeholder into a comment to get a back-reference to
//! the page they annotated. The target path is relative to the working
//! directory the export runs in.

use crate::paths::{absolutize, normalize, relative_to, to_slash};
use std::path::Path;

/// The reserved inline-link placeholder.
pub const PLACEHOLDER: &str = "[](lnk)";

/// A page-anchored link back to the source PDF, computed once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    page: u32,
    target: String,
}

impl PageLink {
    /// Build the link for `page` of `pdf_path`, relative to `working_dir`.
    pub fn new(page: u32, pdf_path: &Path, working_dir: &Path) -> Self {
        let base = normalize(working_dir);
        let pdf = absolutize(pdf_path, &base);
        let rel = relative_to(&pdf, &base);
        Self {
            page,
            target: format!("{}#page={}", to_slash(&rel), page),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Link target, e.g. `docs/paper.pdf#page=5`.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Markdown link text, e.g. `[p5](docs/paper.pdf#page=5)`.
    pub fn markdown(&self) -> String {
        format!("[p{}]({})", self.page, self.target)
    }

    /// Replace the first placeholder in `text`.
    ///
    /// Only one occurrence is replaced per call; a second `[](lnk)` in the
    /// same string survives.
    pub fn resolve(&self, text: &str) -> String {
        if text.contains(PLACEHOLDER) {
            text.replacen(PLACEHOLDER, &self.markdown(), 1)
        } else {
            text.to_string()
        }
    }
}

/// One-off form of [`PageLink::resolve`].
pub fn resolve_page_link(text: &str, page: u32, pdf_path: &Path, working_dir: &Path) -> String {
    PageLink::new(page, pdf_path, working_dir).resolve(text)
}
