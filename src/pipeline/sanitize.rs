//! Text sanitising: drop exotic code points and expand escaped newlines.
//!
//! Annotation text copied out of PDFs carries ligatures, smart punctuation,
//! dingbats and private-use glyphs that render as tofu in most Markdown
//! viewers. Everything in the Basic Multilingual Plane above Latin-1 is
//! removed; ASCII and Latin-1 pass through.

use std::ops::RangeInclusive;

/// Code points removed by [`sanitize`].
pub const STRIPPED_RANGE: RangeInclusive<char> = '\u{0100}'..='\u{FFFF}';

/// Two-character marker the annotation source uses for a hard line break.
pub const ESCAPED_NEWLINE: &str = r"\\";

/// Markup emitted in place of [`ESCAPED_NEWLINE`].
pub const LINE_BREAK: &str = "<br>";

/// Remove every character in [`STRIPPED_RANGE`].
///
/// Total and idempotent: `sanitize(&sanitize(x)) == sanitize(x)`.
pub fn sanitize(input: &str) -> String {
    input
        .chars()
        .filter(|c| !STRIPPED_RANGE.contains(c))
        .collect()
}

/// Replace each `\\` marker with `<br>`.
pub fn convert_line_breaks(input: &str) -> String {
    input.replace(ESCAPED_NEWLINE, LINE_BREAK)
}
