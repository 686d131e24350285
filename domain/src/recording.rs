//! Recording persistence operations exposed at the domain boundary.

use crate::error::Error;
use entity::recording_status::RecordingStatus;
use entity::recordings::Model;
use entity::Id;
use sea_orm::DatabaseConnection;

pub async fn create(db: &DatabaseConnection, model: Model) -> Result<Model, Error> {
    Ok(entity_api::recording::create(db, model).await?)
}

pub async fn update(db: &DatabaseConnection, id: Id, model: Model) -> Result<Model, Error> {
    Ok(entity_api::recording::update(db, id, model).await?)
}

pub async fn update_status(
    db: &DatabaseConnection,
    id: Id,
    status: RecordingStatus,
    error_message: Option<String>,
) -> Result<Model, Error> {
    Ok(entity_api::recording::update_status(db, id, status, error_message).await?)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Ok(entity_api::recording::find_by_id(db, id).await?)
}

pub async fn find_by_bot_id(
    db: &DatabaseConnection,
    bot_id: &str,
) -> Result<Option<Model>, Error> {
    Ok(entity_api::recording::find_by_bot_id(db, bot_id).await?)
}
