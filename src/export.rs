//! Markdown assembly: render a batch of annotations and append it to disk.
//!
//! Annotations are processed strictly in input order, synchronously, one at
//! a time. Highlights and notes go to [`crate::pipeline::text`], images to
//! [`crate::pipeline::image`], and anything else is skipped. The
//! concatenated fragments are appended to the target file in a single write
//! once every annotation has rendered; if an image move fails midway
//! nothing is appended, but images moved before the failure stay moved.

use crate::annotation::{parse_annotations, Annotation};
use crate::config::ExportConfig;
use crate::context::{ExportJob, RenderContext};
use crate::error::AnnotMdError;
use crate::output::{ExportOutput, ExportReport, RenderedFragment};
use crate::paths::absolutize;
use crate::pipeline::{image, text};
use crate::progress::{ExportProgressCallback, NoopProgressCallback};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// Render `annotations` into one Markdown document.
///
/// Relocates every image annotation as a side effect and advances the
/// context's image counter once per relocated image. Nothing is written to
/// the target Markdown file.
pub fn render_annotations(
    annotations: &[Annotation],
    ctx: &mut RenderContext,
    config: &ExportConfig,
) -> Result<ExportOutput, AnnotMdError> {
    let noop = NoopProgressCallback;
    let cb: &dyn ExportProgressCallback = match config.progress_callback.as_deref() {
        Some(cb) => cb,
        None => &noop,
    };

    let total = annotations.len();
    let mut output = ExportOutput::default();
    output.stats.total_annotations = total;

    for (index, annotation) in annotations.iter().enumerate() {
        let kind = annotation.kind();
        let (markdown, image) = match annotation {
            Annotation::Highlight { .. } => {
                output.stats.highlights += 1;
                (text::render_text(annotation, ctx.page_link()), None)
            }
            Annotation::Text { .. } => {
                output.stats.notes += 1;
                (text::render_text(annotation, ctx.page_link()), None)
            }
            Annotation::Image {
                image_path: Some(path),
                comment,
            } => {
                let relocated = image::render_image(path, comment.as_deref(), ctx)?;
                cb.on_image_relocated(&relocated.source, &relocated.destination);
                ctx.advance_image_counter();
                output.stats.images += 1;
                (relocated.markdown, Some(relocated.destination))
            }
            Annotation::Image {
                image_path: None, ..
            } => {
                warn!("Image annotation #{} has no imagePath, skipping", index);
                (String::new(), None)
            }
            Annotation::Ignored { kind } => {
                debug!("Ignoring annotation #{} of kind '{}'", index, kind);
                output.stats.ignored += 1;
                cb.on_annotation_skipped(index, total, kind);
                continue;
            }
        };

        if markdown.is_empty() {
            output.stats.empty += 1;
            cb.on_annotation_skipped(index, total, kind);
            continue;
        }

        debug!("Annotation #{} ({}): {} bytes", index, kind, markdown.len());
        cb.on_annotation_rendered(index, total, kind, markdown.len());
        output.markdown.push_str(&markdown);
        output.fragments.push(RenderedFragment {
            index,
            kind: kind.to_string(),
            markdown,
            image,
        });
    }

    output.stats.markdown_bytes = output.markdown.len();
    Ok(output)
}

/// Append `markdown` to `path`, creating the file if absent.
///
/// Returns the number of bytes written. Prior content is never truncated.
pub fn append_markdown(
    path: &Path,
    markdown: &str,
    create_dirs: bool,
) -> Result<usize, AnnotMdError> {
    let write_err = |source| AnnotMdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if create_dirs {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(write_err)?;
    file.write_all(markdown.as_bytes()).map_err(write_err)?;
    Ok(markdown.len())
}

/// Export a batch against the process working directory.
///
/// This is the primary entry point for the library.
///
/// An empty batch is a successful no-op: nothing is moved, nothing is
/// written, and the report has `appended == false`. The job is only
/// validated once there is something to export.
pub fn export(
    job: &ExportJob,
    annotations: &[Annotation],
    config: &ExportConfig,
) -> Result<ExportReport, AnnotMdError> {
    let cwd = std::env::current_dir()
        .map_err(|source| AnnotMdError::WorkingDirUnavailable { source })?;
    export_in(&cwd, job, annotations, config)
}

/// Like [`export`], resolving relative paths and page links against
/// `working_dir` instead of the process working directory.
pub fn export_in(
    working_dir: &Path,
    job: &ExportJob,
    annotations: &[Annotation],
    config: &ExportConfig,
) -> Result<ExportReport, AnnotMdError> {
    info!("Received page number: {}", job.page());
    let output_path = job.output_path().to_path_buf();

    if annotations.is_empty() {
        let name = job
            .pdf_path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("No annotations found in '{}'. Nothing to export.", name);
        return Ok(ExportReport {
            page: job.page(),
            output_path,
            appended: false,
            output: ExportOutput::default(),
        });
    }

    job.validate()?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_export_start(annotations.len());
    }

    let mut ctx = RenderContext::new(job, config, working_dir);
    let output = render_annotations(annotations, &mut ctx, config)?;

    // Relative output paths are relative to the working directory too.
    let target = absolutize(&output_path, working_dir);
    let written = append_markdown(&target, &output.markdown, config.create_output_dirs)?;
    info!("Output saved to: {}", output_path.display());

    if let Some(ref cb) = config.progress_callback {
        cb.on_export_complete(&output_path, written);
    }

    Ok(ExportReport {
        page: job.page(),
        output_path,
        appended: true,
        output,
    })
}

/// Parse a JSON annotation array and [`export`] it.
///
/// Malformed JSON fails before any image is moved or anything is written.
pub fn export_json(
    job: &ExportJob,
    json: &str,
    config: &ExportConfig,
) -> Result<ExportReport, AnnotMdError> {
    let annotations = parse_annotations(json)?;
    export(job, &annotations, config)
}
