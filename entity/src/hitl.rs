//! Human-in-the-loop flag payload persisted when speaker attribution needs
//! manual confirmation before it can be treated as ground truth.

use crate::attendees::Attendee;
use crate::speakers::SpeakerInfo;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The only HITL flow this pipeline raises.
pub const HITL_TYPE_SPEAKER_CONFIRMATION: &str = "speaker_confirmation";

/// Everything a reviewer needs to resolve low-confidence speakers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct HitlData {
    /// Speakers that were unmatched or matched below the confidence threshold
    pub unresolved_speakers: Vec<SpeakerInfo>,
    /// Attendees the reviewer can assign to those speakers
    pub candidates: Vec<Attendee>,
}
