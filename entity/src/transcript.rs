//! Transcript value types stored as a JSONB sub-document on a recording.
//! Utterances are kept in provider order (sorted by start_seconds) and are
//! only ever read or written as a unit with their parent row.

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One contiguous speech segment attributed to a single diarized speaker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Utterance {
    /// Dense zero-based speaker index assigned by the provider adapter
    pub speaker_index: i32,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub text: String,
    /// Provider confidence for this segment (0.0 - 1.0), when reported
    pub confidence: Option<f64>,
}

/// Ordered utterance list, serialized as a plain JSON array.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct Transcript(pub Vec<Utterance>);

impl Transcript {
    pub fn as_slice(&self) -> &[Utterance] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
