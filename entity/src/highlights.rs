//! Highlight value types stored as a JSONB sub-document on a recording.

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Category of a highlighted moment.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HighlightKind {
    KeyPoint,
    Decision,
    ActionItem,
    Question,
    Objection,
}

impl HighlightKind {
    /// Lossy parse for model-produced type strings. Unrecognized values
    /// degrade to KeyPoint rather than rejecting the highlight.
    pub fn parse_lossy(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "decision" => HighlightKind::Decision,
            "action_item" | "action item" => HighlightKind::ActionItem,
            "question" => HighlightKind::Question,
            "objection" => HighlightKind::Objection,
            _ => HighlightKind::KeyPoint,
        }
    }
}

impl std::fmt::Display for HighlightKind {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HighlightKind::KeyPoint => write!(fmt, "key_point"),
            HighlightKind::Decision => write!(fmt, "decision"),
            HighlightKind::ActionItem => write!(fmt, "action_item"),
            HighlightKind::Question => write!(fmt, "question"),
            HighlightKind::Objection => write!(fmt, "objection"),
        }
    }
}

/// A notable moment in the call, anchored to a transcript timestamp.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Highlight {
    pub timestamp_seconds: f64,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: HighlightKind,
}

/// Ordered highlight list, serialized as a plain JSON array.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct Highlights(pub Vec<Highlight>);

impl Highlights {
    pub fn as_slice(&self) -> &[Highlight] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
