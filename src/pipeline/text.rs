//! Highlight and free-text note fragments.
//!
//! ## Hashtag-only comments
//!
//! A highlight whose comment is nothing but `#` characters (after trimming)
//! is promoted to a heading of that level: `"##"` on "Results" renders
//! `## Results`. The comment itself is dropped in that case. Any other
//! comment is appended below the highlighted text as its own paragraph.
//!
//! Free-text notes never get this treatment; they have no highlighted text
//! to prefix.

use crate::annotation::Annotation;
use crate::pipeline::link::PageLink;
use crate::pipeline::sanitize::{convert_line_breaks, sanitize};

/// Render a `highlight` or `text` annotation.
///
/// Returns an empty string for any other kind or when there is nothing to
/// render. A non-empty result always ends with a blank-line separator.
pub fn render_text(annotation: &Annotation, link: &PageLink) -> String {
    let text = match annotation {
        Annotation::Highlight {
            annotated_text,
            comment,
        } => merge_highlight(
            annotated_text.as_deref().unwrap_or_default(),
            comment.as_deref(),
            link,
        ),
        Annotation::Text { comment } => comment.clone().unwrap_or_default(),
        Annotation::Image { .. } | Annotation::Ignored { .. } => return String::new(),
    };
    finish_fragment(&text, link)
}

/// Heading level encoded by a comment, if it consists only of `#`.
pub fn heading_level(comment: &str) -> Option<usize> {
    let trimmed = comment.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c == '#') {
        Some(trimmed.len())
    } else {
        None
    }
}

/// Combine highlighted text and comment before normalisation.
fn merge_highlight(annotated_text: &str, comment: Option<&str>, link: &PageLink) -> String {
    let Some(comment) = comment.filter(|c| !c.is_empty()) else {
        return annotated_text.to_string();
    };
    let comment = link.resolve(comment);

    match heading_level(&comment) {
        // A heading marker with nothing to head renders nothing.
        Some(_) if annotated_text.is_empty() => String::new(),
        Some(level) => format!("{} {}", "#".repeat(level), annotated_text),
        None if annotated_text.is_empty() => comment,
        None => format!("{annotated_text}\n\n{comment}"),
    }
}

/// Resolve, sanitise and terminate a fragment body.
///
/// Shared with image captions.
pub(crate) fn finish_fragment(text: &str, link: &PageLink) -> String {
    if text.is_empty() {
        return String::new();
    }
    let text = convert_line_breaks(&sanitize(&link.resolve(text)));
    if text.is_empty() {
        return String::new();
    }
    format!("{text}\n\n")
}
