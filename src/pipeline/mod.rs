//! Rendering stages for annotation-to-Markdown export.
//!
//! Each submodule implements one transformation step and is independently
//! testable. Only [`image`] touches the filesystem.
//!
//! ## Data Flow
//!
//! ```text
//!            ┌─▶ text ──▶ link ──▶ sanitize ─┐
//! annotation─┤                               ├─▶ fragment
//!            └─▶ image (move + link) ────────┘
//! ```
//!
//! 1. [`sanitize`]: strip exotic code points, turn `\\` into `<br>`
//! 2. [`link`]: replace the `[](lnk)` placeholder with a page link
//! 3. [`text`]: highlight/note fragments, hashtag-only comments as headings
//! 4. [`image`]: one-shot move of an extracted image, then an embed or
//!    inline-image link relative to the final Markdown file

pub mod image;
pub mod link;
pub mod sanitize;
pub mod text;
