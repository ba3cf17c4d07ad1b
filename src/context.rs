//! Per-run inputs: what to export ([`ExportJob`]) and the derived, read-only
//! state the renderers share ([`RenderContext`]).
//!
//! The image counter lives on the context and is advanced explicitly by the
//! assembler after each relocated image, so no renderer holds hidden state
//! between calls.

use crate::config::{ExportConfig, LinkStyle};
use crate::error::AnnotMdError;
use crate::paths::{absolutize, normalize};
use crate::pipeline::link::PageLink;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One export invocation: a batch of annotations from one page of one PDF.
///
/// # Example
/// ```rust
/// use annot2md::ExportJob;
/// use std::path::Path;
///
/// let job = ExportJob::new("library/paper.pdf", 3);
/// assert_eq!(job.output_path(), Path::new("library/paper.md"));
/// assert_eq!(job.image_dir(), Path::new("library"));
/// assert_eq!(job.final_output_path(), Path::new("library/paper.md"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportJob {
    pdf_path: PathBuf,
    page: u32,
    output_path: PathBuf,
    image_dir: Option<PathBuf>,
    final_output_path: Option<PathBuf>,
}

impl ExportJob {
    /// Job for `page` of `pdf_path`, writing to `{pdf_dir}/{pdf_stem}.md`.
    pub fn new(pdf_path: impl Into<PathBuf>, page: u32) -> Self {
        let pdf_path = pdf_path.into();
        let output_path = default_output_path(&pdf_path);
        Self {
            pdf_path,
            page,
            output_path,
            image_dir: None,
            final_output_path: None,
        }
    }

    /// Markdown file the fragment is appended to.
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Directory relocated images are moved into. Must already exist.
    pub fn with_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_dir = Some(dir.into());
        self
    }

    /// Markdown file that image links are made relative to, when the output
    /// file is a staging file that will be merged elsewhere later.
    pub fn with_final_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.final_output_path = Some(path.into());
        self
    }

    pub fn pdf_path(&self) -> &Path {
        &self.pdf_path
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Image directory; defaults to the output file's directory.
    pub fn image_dir(&self) -> &Path {
        match &self.image_dir {
            Some(dir) => dir.as_path(),
            None => parent_dir(&self.output_path),
        }
    }

    /// Final Markdown path; defaults to the output path.
    pub fn final_output_path(&self) -> &Path {
        self.final_output_path.as_deref().unwrap_or(&self.output_path)
    }

    /// Reject jobs that cannot produce meaningful links.
    pub fn validate(&self) -> Result<(), AnnotMdError> {
        if self.page == 0 {
            return Err(AnnotMdError::InvalidConfig(
                "Page numbers are 1-indexed, got 0".into(),
            ));
        }
        if self.pdf_path.as_os_str().is_empty() {
            return Err(AnnotMdError::InvalidConfig("PDF path is empty".into()));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(AnnotMdError::InvalidConfig("Output path is empty".into()));
        }
        Ok(())
    }
}

fn default_output_path(pdf_path: &Path) -> PathBuf {
    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    parent_dir(pdf_path).join(format!("{stem}.md"))
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Derived, read-only state for one run, plus the explicit image counter.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pdf_path: PathBuf,
    page: u32,
    image_dir: PathBuf,
    final_markdown_path: PathBuf,
    working_dir: PathBuf,
    link_style: LinkStyle,
    image_captions: bool,
    page_link: PageLink,
    image_counter: u32,
}

impl RenderContext {
    /// Build the context for `job`, resolving relative paths against
    /// `working_dir`.
    pub fn new(job: &ExportJob, config: &ExportConfig, working_dir: &Path) -> Self {
        let working_dir = normalize(working_dir);
        Self {
            pdf_path: job.pdf_path().to_path_buf(),
            page: job.page(),
            image_dir: absolutize(job.image_dir(), &working_dir),
            final_markdown_path: absolutize(job.final_output_path(), &working_dir),
            link_style: config.link_style,
            image_captions: config.image_captions,
            page_link: PageLink::new(job.page(), job.pdf_path(), &working_dir),
            image_counter: 1,
            working_dir,
        }
    }

    pub fn pdf_path(&self) -> &Path {
        &self.pdf_path
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Absolute image output directory.
    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// Absolute path of the Markdown file links are relative to.
    pub fn final_markdown_path(&self) -> &Path {
        &self.final_markdown_path
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn link_style(&self) -> LinkStyle {
        self.link_style
    }

    pub fn image_captions(&self) -> bool {
        self.image_captions
    }

    pub fn page_link(&self) -> &PageLink {
        &self.page_link
    }

    /// Index the next relocated image will be named with. Starts at 1.
    pub fn image_counter(&self) -> u32 {
        self.image_counter
    }

    /// Move to the next image index. Called once per rendered image.
    pub fn advance_image_counter(&mut self) -> u32 {
        self.image_counter += 1;
        self.image_counter
    }
}
