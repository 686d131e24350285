use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A follow-up task surfaced by analysis.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ActionItem {
    pub text: String,
    pub assignee: Option<String>,
    /// Kept as free text; model-produced dates are not reliably ISO formatted
    pub due_date: Option<String>,
}

/// Ordered action item list, serialized as a plain JSON array.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct ActionItems(pub Vec<ActionItem>);

impl ActionItems {
    pub fn as_slice(&self) -> &[ActionItem] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
