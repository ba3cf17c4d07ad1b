//! # annot2md
//!
//! Turn PDF-viewer annotations into Markdown notes.
//!
//! A viewer exports one page's annotations as a JSON array of highlights,
//! free-text notes and extracted images. This crate renders them, in order,
//! into Markdown fragments and appends the result to a notes file. Extracted
//! images are moved into an asset directory and linked either as inline
//! Markdown images or as Obsidian-style embeds.
//!
//! ## Pipeline Overview
//!
//! ```text
//! JSON annotations + page + PDF path
//!  │
//!  ├─ 1. Parse     tagged variants; unknown kinds are ignored
//!  ├─ 2. Render    highlight/text → sanitised fragment
//!  │               image          → one-shot move + link
//!  ├─ 3. Assemble  concatenate fragments in input order
//!  └─ 4. Append    to the target Markdown file (never truncated)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use annot2md::{export_json, ExportConfig, ExportJob, LinkStyle};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let job = ExportJob::new("library/paper.pdf", 3)
//!         .with_output_path("vault/paper.md")
//!         .with_image_dir("vault/assets");
//!     let config = ExportConfig::builder()
//!         .link_style(LinkStyle::Obsidian)
//!         .build()?;
//!     let json = r####"[{"type": "highlight", "annotatedText": "Key idea", "comment": "###"}]"####;
//!     let report = export_json(&job, json, &config)?;
//!     eprintln!("appended {} bytes", report.output.stats.markdown_bytes);
//!     Ok(())
//! }
//! ```
//!
//! ## Annotation rules
//!
//! | Input | Output |
//! |-------|--------|
//! | highlight + comment `###` | `### {text}` |
//! | highlight + other comment | `{text}\n\n{comment}` |
//! | text note | `{comment}` |
//! | `[](lnk)` anywhere | `[p{page}]({pdf}#page={page})` (first occurrence) |
//! | `\\` | `<br>` |
//! | image | `![img](rel/path)` or `![[file]]` |
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `annot2md` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod annotation;
pub mod config;
pub mod context;
pub mod error;
pub mod export;
pub mod output;
pub mod paths;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use annotation::{parse_annotations, Annotation};
pub use config::{load_config_file, ConfigOverrides, ExportConfig, ExportConfigBuilder, LinkStyle};
pub use context::{ExportJob, RenderContext};
pub use error::AnnotMdError;
pub use export::{append_markdown, export, export_in, export_json, render_annotations};
pub use output::{ExportOutput, ExportReport, ExportStats, RenderedFragment};
pub use progress::{ExportProgressCallback, ProgressCallback};
