//! SeaORM Entity for the recordings table.
//! One row per captured meeting, carrying both raw pipeline inputs and every
//! derived intelligence field.

use crate::action_items::ActionItems;
use crate::attendees::Attendees;
use crate::highlights::Highlights;
use crate::hitl::HitlData;
use crate::recording_status::RecordingStatus;
use crate::speakers::SpeakerList;
use crate::talk_time_judgement::TalkTimeJudgement;
use crate::transcript::Transcript;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::recordings::Model)]
#[sea_orm(schema_name = "callscope", table_name = "recordings")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    pub organization_id: Id,

    pub user_id: Id,

    /// Capture-agent bot ID for this recording
    pub bot_id: Option<String>,

    /// External meeting identifier from the capture collaborator
    pub meeting_id: Option<String>,

    /// CRM contact associated with the meeting, when known
    pub contact_id: Option<String>,

    pub title: Option<String>,

    /// Current status of the recording through the pipeline
    pub status: RecordingStatus,

    /// Ephemeral provider-hosted media URL resolved for transcription
    pub source_media_url: Option<String>,

    /// Durable object key, set by the storage collaborator
    pub storage_key: Option<String>,

    /// Durable object URL, set by the storage collaborator
    pub storage_url: Option<String>,

    /// Calendar attendees, written by the capture collaborator
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub attendees: Option<Attendees>,

    /// Diarized utterances in start order
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub transcript: Option<Transcript>,

    /// Rendered speaker-labeled transcript text
    #[sea_orm(column_type = "Text", nullable)]
    pub transcript_text: Option<String>,

    pub language_code: Option<String>,

    /// last utterance end minus first utterance start, rounded to seconds
    pub duration_seconds: Option<i32>,

    pub word_count: Option<i32>,

    pub speaker_count: Option<i32>,

    /// AI-generated summary of the call
    #[sea_orm(column_type = "Text", nullable)]
    pub summary: Option<String>,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub highlights: Option<Highlights>,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub action_items: Option<ActionItems>,

    /// Overall call sentiment in [-1, 1]
    pub sentiment_score: Option<f64>,

    pub talk_time_rep_pct: Option<f64>,

    pub talk_time_customer_pct: Option<f64>,

    pub talk_time_judgement: Option<TalkTimeJudgement>,

    /// Coaching rating from 1 to 10
    pub coach_rating: Option<i32>,

    #[sea_orm(column_type = "Text", nullable)]
    pub coach_summary: Option<String>,

    /// Speaker attribution map, recomputed each run
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub speakers: Option<SpeakerList>,

    /// Whether a human must confirm speaker attribution
    pub hitl_required: bool,

    pub hitl_type: Option<String>,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub hitl_data: Option<HitlData>,

    /// Error message if the pipeline failed
    pub error_message: Option<String>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
