//! Annotation records as delivered by the PDF viewer's extractor.
//!
//! The extractor emits a JSON array of flat objects:
//!
//! ```json
//! [
//!   {"type": "highlight", "annotatedText": "Key idea", "comment": "###"},
//!   {"type": "text", "comment": "See [](lnk) for context"},
//!   {"type": "image", "imagePath": "/tmp/img0.png"}
//! ]
//! ```
//!
//! Each record is decoded into the [`Annotation`] variant named by its
//! `type` (or `kind`) field. Fields that do not belong to that variant are
//! dropped, and unknown kinds become [`Annotation::Ignored`] so that newer
//! extractors can add kinds without breaking older exporters.

use crate::error::AnnotMdError;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

/// One extracted unit of user markup from a PDF page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawAnnotation")]
pub enum Annotation {
    /// Highlighted passage, optionally with a reader comment.
    Highlight {
        annotated_text: Option<String>,
        comment: Option<String>,
    },
    /// Free-text note.
    Text { comment: Option<String> },
    /// Image already extracted to disk by the viewer.
    Image {
        image_path: Option<PathBuf>,
        comment: Option<String>,
    },
    /// Any kind this exporter does not know. Renders nothing.
    Ignored { kind: String },
}

impl Annotation {
    /// Kind name as it appears in the input.
    pub fn kind(&self) -> &str {
        match self {
            Annotation::Highlight { .. } => "highlight",
            Annotation::Text { .. } => "text",
            Annotation::Image { .. } => "image",
            Annotation::Ignored { kind } => kind.as_str(),
        }
    }

    pub fn highlight(annotated_text: impl Into<String>, comment: Option<&str>) -> Self {
        Annotation::Highlight {
            annotated_text: Some(annotated_text.into()),
            comment: comment.map(str::to_string),
        }
    }

    pub fn text(comment: impl Into<String>) -> Self {
        Annotation::Text {
            comment: Some(comment.into()),
        }
    }

    pub fn image(image_path: impl Into<PathBuf>) -> Self {
        Annotation::Image {
            image_path: Some(image_path.into()),
            comment: None,
        }
    }
}

/// Wire shape of one record before dispatch on `type`.
///
/// Fields are held as raw JSON values so that a field of the wrong type
/// only matters to the kind that reads it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnnotation {
    #[serde(rename = "type", default)]
    type_: Option<Value>,
    #[serde(default)]
    kind: Option<Value>,
    #[serde(default)]
    annotated_text: Option<Value>,
    #[serde(default)]
    comment: Option<Value>,
    #[serde(default)]
    image_path: Option<Value>,
}

impl RawAnnotation {
    /// `type` wins over `kind` when both are strings.
    fn kind_name(&self) -> Option<String> {
        match (&self.type_, &self.kind) {
            (Some(Value::String(t)), _) => Some(t.clone()),
            (_, Some(Value::String(k))) => Some(k.clone()),
            (Some(other), _) | (None, Some(other)) => Some(other.to_string()),
            (None, None) => None,
        }
    }
}

/// String payload of a field; any other JSON type counts as absent.
fn text_field(name: &str, value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Null) | None => None,
        Some(other) => {
            debug!("Ignoring non-string '{}' field: {}", name, other);
            None
        }
    }
}

impl From<RawAnnotation> for Annotation {
    fn from(raw: RawAnnotation) -> Self {
        let kind = raw.kind_name();
        match kind.as_deref() {
            Some("highlight") => Annotation::Highlight {
                annotated_text: text_field("annotatedText", raw.annotated_text),
                comment: text_field("comment", raw.comment),
            },
            Some("text") => Annotation::Text {
                comment: text_field("comment", raw.comment),
            },
            Some("image") => Annotation::Image {
                image_path: text_field("imagePath", raw.image_path).map(PathBuf::from),
                comment: text_field("comment", raw.comment),
            },
            _ => Annotation::Ignored {
                kind: kind.unwrap_or_default(),
            },
        }
    }
}

/// Decode a JSON array of annotation records.
///
/// Anything other than an array of objects is rejected with
/// [`AnnotMdError::InvalidAnnotations`]; no partial list is returned.
pub fn parse_annotations(json: &str) -> Result<Vec<Annotation>, AnnotMdError> {
    serde_json::from_str(json).map_err(|source| AnnotMdError::InvalidAnnotations { source })
}
