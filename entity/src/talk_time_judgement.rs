use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Coarse classification of how much of a call the rep side dominated.
#[derive(Debug, Clone, Eq, PartialEq, EnumIter, Deserialize, Serialize, DeriveActiveEnum)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "talk_time_judgement")]
pub enum TalkTimeJudgement {
    /// Rep spoke less than 40% of the time
    #[sea_orm(string_value = "low")]
    Low,
    /// Rep spoke between 40% and 60% inclusive
    #[sea_orm(string_value = "good")]
    Good,
    /// Rep spoke more than 60% of the time
    #[sea_orm(string_value = "high")]
    High,
}

impl std::fmt::Display for TalkTimeJudgement {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TalkTimeJudgement::Low => write!(fmt, "low"),
            TalkTimeJudgement::Good => write!(fmt, "good"),
            TalkTimeJudgement::High => write!(fmt, "high"),
        }
    }
}
