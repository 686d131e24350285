//! Meeting attendees captured from calendar metadata. Written by the capture
//! collaborator before the pipeline runs; the pipeline only reads them.

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Attendee {
    pub email: String,
    pub name: Option<String>,
    pub is_organizer: Option<bool>,
}

impl Attendee {
    /// Display label for prompt rendering and HITL candidate lists.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// Attendee list in calendar order, serialized as a plain JSON array.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct Attendees(pub Vec<Attendee>);

impl Attendees {
    pub fn as_slice(&self) -> &[Attendee] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
