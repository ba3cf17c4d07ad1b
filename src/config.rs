//! Export configuration and the key-value config file loader.
//!
//! Run-wide options live in [`ExportConfig`], built via
//! [`ExportConfigBuilder`]. A config file can override the values the caller
//! supplied directly: [`load_config_file`] reads it into [`ConfigOverrides`]
//! and [`ConfigOverrides::apply`] layers it on top of an existing config.
//!
//! # Config file format
//!
//! ```text
//! # annot2md settings
//! link_style = obsidian
//! image_captions = yes
//! ```
//!
//! One `key = value` pair per line. Lines starting with `#` or `;` are
//! comments. The value is the leading run of word characters after `=`.
//! When a key appears more than once the first occurrence wins.

use crate::error::AnnotMdError;
use crate::progress::ProgressCallback;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// Configuration for an annotation export run.
///
/// Built via [`ExportConfig::builder()`] or using [`ExportConfig::default()`].
///
/// # Example
/// ```rust
/// use annot2md::{ExportConfig, LinkStyle};
///
/// let config = ExportConfig::builder()
///     .link_style(LinkStyle::Obsidian)
///     .image_captions(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.link_style, LinkStyle::Obsidian);
/// ```
#[derive(Clone)]
pub struct ExportConfig {
    /// How relocated images are linked from the Markdown. Default: [`LinkStyle::Markdown`].
    pub link_style: LinkStyle,

    /// Render an image annotation's comment as a caption line under the
    /// image link. Default: false.
    pub image_captions: bool,

    /// Create the target Markdown file's parent directory when missing.
    /// Default: true.
    ///
    /// The image output directory is never created; it must already exist.
    pub create_output_dirs: bool,

    /// Optional per-annotation progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            link_style: LinkStyle::default(),
            image_captions: false,
            create_output_dirs: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportConfig")
            .field("link_style", &self.link_style)
            .field("image_captions", &self.image_captions)
            .field("create_output_dirs", &self.create_output_dirs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ExportProgressCallback>"),
            )
            .finish()
    }
}

impl ExportConfig {
    /// Create a new builder for `ExportConfig`.
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExportConfig`].
#[derive(Debug)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    pub fn link_style(mut self, style: LinkStyle) -> Self {
        self.config.link_style = style;
        self
    }

    pub fn image_captions(mut self, v: bool) -> Self {
        self.config.image_captions = v;
        self
    }

    pub fn create_output_dirs(mut self, v: bool) -> Self {
        self.config.create_output_dirs = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Apply config-file overrides on top of the values set so far.
    pub fn overrides(mut self, overrides: &ConfigOverrides) -> Self {
        self.config = overrides.apply(self.config);
        self
    }

    pub fn build(self) -> Result<ExportConfig, AnnotMdError> {
        Ok(self.config)
    }
}

// ── Link style ───────────────────────────────────────────────────────────

/// Output format for relocated image references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStyle {
    /// Inline image link with a relative path: `![img](assets/x.png)`. (default)
    #[default]
    Markdown,
    /// Wiki-style embed by file name only: `![[x.png]]`.
    Obsidian,
}

impl LinkStyle {
    /// Parse a style name, case-insensitively. Returns `None` for anything
    /// other than `markdown` or `obsidian`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Some(LinkStyle::Markdown),
            "obsidian" => Some(LinkStyle::Obsidian),
            _ => None,
        }
    }
}

impl fmt::Display for LinkStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LinkStyle::Markdown => "markdown",
            LinkStyle::Obsidian => "obsidian",
        })
    }
}

// ── Config file ──────────────────────────────────────────────────────────

/// Values read from a config file. `None` means "not set in the file".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub link_style: Option<LinkStyle>,
    pub image_captions: Option<bool>,
}

impl ConfigOverrides {
    /// Layer these overrides on top of `config`.
    pub fn apply(&self, mut config: ExportConfig) -> ExportConfig {
        if let Some(style) = self.link_style {
            config.link_style = style;
        }
        if let Some(v) = self.image_captions {
            config.image_captions = v;
        }
        config
    }

    pub fn is_empty(&self) -> bool {
        self.link_style.is_none() && self.image_captions.is_none()
    }
}

static RE_CONFIG_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(\w+)").unwrap());

/// Read overrides from the config file at `path`.
///
/// A missing file yields empty overrides. A file that exists but cannot be
/// read is an error.
pub fn load_config_file(path: &Path) -> Result<ConfigOverrides, AnnotMdError> {
    if !path.exists() {
        debug!("No config file at {}", path.display());
        return Ok(ConfigOverrides::default());
    }
    let content =
        std::fs::read_to_string(path).map_err(|source| AnnotMdError::ConfigReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(parse_config(&content))
}

/// Parse config file content into overrides.
pub fn parse_config(content: &str) -> ConfigOverrides {
    let mut overrides = ConfigOverrides::default();

    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }
        let Some(caps) = RE_CONFIG_LINE.captures(line) else {
            continue;
        };
        let (key, value) = (&caps[1], &caps[2]);

        match key {
            "link_style" if overrides.link_style.is_none() => {
                // Anything that isn't obsidian renders markdown links.
                let style = LinkStyle::parse(value).unwrap_or_else(|| {
                    warn!("Unrecognised link_style '{}', using markdown", value);
                    LinkStyle::Markdown
                });
                overrides.link_style = Some(style);
            }
            "image_captions" if overrides.image_captions.is_none() => {
                match parse_bool(value) {
                    Some(v) => overrides.image_captions = Some(v),
                    None => warn!("Unrecognised image_captions '{}', ignoring", value),
                }
            }
            "link_style" | "image_captions" => {
                debug!("Duplicate config key '{}' ignored", key);
            }
            other => debug!("Unknown config key '{}' ignored", other),
        }
    }

    overrides
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
