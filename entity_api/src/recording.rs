//! CRUD operations for the recordings table.

use super::error::Error;
use entity::recording_status::RecordingStatus;
use entity::recordings::{ActiveModel, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, IntoActiveModel, TryIntoModel,
};

/// Creates a new recording row from capture-collaborator metadata.
/// The row always starts queued with no derived fields set.
pub async fn create(db: &DatabaseConnection, model: Model) -> Result<Model, Error> {
    debug!(
        "Creating new recording for organization: {}",
        model.organization_id
    );

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        organization_id: Set(model.organization_id),
        user_id: Set(model.user_id),
        bot_id: Set(model.bot_id),
        meeting_id: Set(model.meeting_id),
        contact_id: Set(model.contact_id),
        title: Set(model.title),
        attendees: Set(model.attendees),
        storage_key: Set(model.storage_key),
        storage_url: Set(model.storage_url),
        status: Set(RecordingStatus::Queued),
        hitl_required: Set(false),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

/// Overwrites every derived field in one update. Identity and ownership
/// columns are never touched; repeated pipeline runs converge instead of
/// duplicating rows.
pub async fn update(db: &DatabaseConnection, id: Id, model: Model) -> Result<Model, Error> {
    let result = Entity::find_by_id(id).one(db).await?;

    match result {
        Some(existing) => {
            debug!("Updating recording: {id}");

            let active_model = ActiveModel {
                id: Unchanged(existing.id),
                organization_id: Unchanged(existing.organization_id),
                user_id: Unchanged(existing.user_id),
                bot_id: Set(model.bot_id),
                meeting_id: Set(model.meeting_id),
                contact_id: Set(model.contact_id),
                title: Set(model.title),
                status: Set(model.status),
                source_media_url: Set(model.source_media_url),
                storage_key: Set(model.storage_key),
                storage_url: Set(model.storage_url),
                attendees: Set(model.attendees),
                transcript: Set(model.transcript),
                transcript_text: Set(model.transcript_text),
                language_code: Set(model.language_code),
                duration_seconds: Set(model.duration_seconds),
                word_count: Set(model.word_count),
                speaker_count: Set(model.speaker_count),
                summary: Set(model.summary),
                highlights: Set(model.highlights),
                action_items: Set(model.action_items),
                sentiment_score: Set(model.sentiment_score),
                talk_time_rep_pct: Set(model.talk_time_rep_pct),
                talk_time_customer_pct: Set(model.talk_time_customer_pct),
                talk_time_judgement: Set(model.talk_time_judgement),
                coach_rating: Set(model.coach_rating),
                coach_summary: Set(model.coach_summary),
                speakers: Set(model.speakers),
                hitl_required: Set(model.hitl_required),
                hitl_type: Set(model.hitl_type),
                hitl_data: Set(model.hitl_data),
                error_message: Set(model.error_message),
                created_at: Unchanged(existing.created_at),
                updated_at: Set(chrono::Utc::now().into()),
            };

            Ok(active_model.update(db).await?.try_into_model()?)
        }
        None => {
            debug!("Recording with id {id} not found");
            Err(Error::record_not_found())
        }
    }
}

/// Updates just the lifecycle status of a recording.
pub async fn update_status(
    db: &DatabaseConnection,
    id: Id,
    status: RecordingStatus,
    error_message: Option<String>,
) -> Result<Model, Error> {
    let result = Entity::find_by_id(id).one(db).await?;

    match result {
        Some(existing) => {
            debug!("Updating recording status to {status}: {id}");

            let mut active_model = existing.into_active_model();
            active_model.status = Set(status);
            active_model.error_message = Set(error_message);
            active_model.updated_at = Set(chrono::Utc::now().into());

            Ok(active_model.update(db).await?.try_into_model()?)
        }
        None => Err(Error::record_not_found()),
    }
}

/// Finds a recording by ID
pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::record_not_found)
}

/// Finds a recording by capture-agent bot ID
pub async fn find_by_bot_id(db: &DatabaseConnection, bot_id: &str) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(entity::recordings::Column::BotId.eq(bot_id))
        .one(db)
        .await?)
}
