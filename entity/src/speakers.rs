//! Derived speaker attribution, recomputed on every pipeline run.

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How a diarized speaker index was tied to a real attendee.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IdentificationMethod {
    /// Positional attendee correspondence, keyed off the attendee email
    EmailMatch,
    AiInference,
    /// Confirmed by a human through the HITL surface
    Manual,
    Unknown,
}

impl std::fmt::Display for IdentificationMethod {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentificationMethod::EmailMatch => write!(fmt, "email_match"),
            IdentificationMethod::AiInference => write!(fmt, "ai_inference"),
            IdentificationMethod::Manual => write!(fmt, "manual"),
            IdentificationMethod::Unknown => write!(fmt, "unknown"),
        }
    }
}

/// Attribution and talk-time stats for one diarized speaker index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SpeakerInfo {
    pub speaker_index: i32,
    pub email: Option<String>,
    pub name: Option<String>,
    /// Whether the matched attendee belongs to the organization's own domain
    pub is_internal: bool,
    pub identification_method: IdentificationMethod,
    /// Match confidence in [0, 1]; positional matches are fixed at 0.5
    pub confidence: f64,
    pub talk_time_seconds: f64,
    pub talk_time_percent: f64,
}

/// Speaker map keyed by index, stored as an ordered JSON array.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct SpeakerList(pub Vec<SpeakerInfo>);

impl SpeakerList {
    pub fn as_slice(&self) -> &[SpeakerInfo] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
