//! Image relocation and linking.
//!
//! The viewer extracts each image annotation to a scratch file. Exporting it
//! *moves* that file into the image output directory under a deterministic
//! name, `{pdf_stem}{page}p{index}{ext}`, then links it from the Markdown.
//!
//! ## One-shot move
//!
//! [`relocate_image`] is a rename, not a copy. Preconditions: the source
//! exists and the destination directory exists. Postcondition: the source
//! is gone and the destination holds its bytes. Running the same batch twice
//! fails on the second run with [`AnnotMdError::ImageNotFound`]; that is
//! expected, and the move is never retried.
//!
//! ## Link styles
//!
//! | Style      | Output                          |
//! |------------|---------------------------------|
//! | `markdown` | `![img](../assets/notes2p1.png)` |
//! | `obsidian` | `![[notes2p1.png]]`             |
//!
//! Markdown paths are relative to the directory of the *final* Markdown
//! file, which differs from the file being appended to when output is staged.

use crate::config::LinkStyle;
use crate::context::RenderContext;
use crate::error::AnnotMdError;
use crate::paths::{absolutize, relative_to, to_slash};
use crate::pipeline::text::finish_fragment;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Result of rendering one image annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocatedImage {
    /// Where the image was before the move (absolute).
    pub source: PathBuf,
    /// Where the image lives now (absolute).
    pub destination: PathBuf,
    /// Markdown fragment, ending with a blank-line separator.
    pub markdown: String,
}

/// Deterministic file name: `{pdf_stem}{page}p{index}{ext}`.
///
/// The extension is taken from the source image, dot included; a source
/// without one yields a name without one.
pub fn image_file_name(pdf_path: &Path, page: u32, index: u32, source: &Path) -> String {
    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    format!("{stem}{page}p{index}{ext}")
}

/// Move `source` to `destination`, consuming the source.
pub fn relocate_image(source: &Path, destination: &Path) -> Result<(), AnnotMdError> {
    if !source.exists() {
        return Err(AnnotMdError::ImageNotFound {
            path: source.to_path_buf(),
        });
    }
    let dir = destination.parent().unwrap_or(destination);
    if !dir.is_dir() {
        return Err(AnnotMdError::ImageDirMissing {
            path: dir.to_path_buf(),
        });
    }
    std::fs::rename(source, destination).map_err(|e| AnnotMdError::ImageMoveFailed {
        from: source.to_path_buf(),
        to: destination.to_path_buf(),
        source: e,
    })
}

/// Link to `destination` from the Markdown file at `final_markdown_path`.
///
/// Both paths must be absolute.
pub fn image_link(destination: &Path, final_markdown_path: &Path, style: LinkStyle) -> String {
    match style {
        LinkStyle::Obsidian => {
            let name = destination
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            format!("![[{name}]]")
        }
        LinkStyle::Markdown => {
            let markdown_dir = final_markdown_path.parent().unwrap_or(final_markdown_path);
            let rel = relative_to(destination, markdown_dir);
            format!("![img]({})", to_slash(&rel))
        }
    }
}

/// Relocate the image named by an `image` annotation and render its link.
///
/// Uses the context's current image counter; the caller advances it.
/// With captions enabled, a non-empty `comment` is rendered on the line
/// below the link.
pub fn render_image(
    image_path: &Path,
    comment: Option<&str>,
    ctx: &RenderContext,
) -> Result<RelocatedImage, AnnotMdError> {
    let source = absolutize(image_path, ctx.working_dir());
    let file_name = image_file_name(ctx.pdf_path(), ctx.page(), ctx.image_counter(), &source);
    let destination = ctx.image_dir().join(file_name);

    relocate_image(&source, &destination)?;
    debug!(
        "Moved image {} -> {}",
        source.display(),
        destination.display()
    );

    let link = image_link(&destination, ctx.final_markdown_path(), ctx.link_style());
    debug!(
        "Image link relative to {}: {}",
        ctx.final_markdown_path().display(),
        link
    );

    let caption = match comment {
        Some(c) if ctx.image_captions() => finish_fragment(c, ctx.page_link()),
        _ => String::new(),
    };
    let markdown = if caption.is_empty() {
        format!("{link}\n\n")
    } else {
        format!("{link}\n{caption}")
    };

    Ok(RelocatedImage {
        source,
        destination,
        markdown,
    })
}
