use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status of a recording through the intelligence pipeline.
#[derive(
    Debug, Clone, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "recording_status")]
pub enum RecordingStatus {
    /// Created by the capture collaborator, waiting for a pipeline run
    #[sea_orm(string_value = "queued")]
    #[default]
    Queued,
    /// A pipeline run is in flight
    #[sea_orm(string_value = "processing")]
    Processing,
    /// All stages succeeded and derived fields are persisted
    #[sea_orm(string_value = "ready")]
    Ready,
    /// A terminal stage error occurred; see error_message
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl std::fmt::Display for RecordingStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordingStatus::Queued => write!(fmt, "queued"),
            RecordingStatus::Processing => write!(fmt, "processing"),
            RecordingStatus::Ready => write!(fmt, "ready"),
            RecordingStatus::Failed => write!(fmt, "failed"),
        }
    }
}
