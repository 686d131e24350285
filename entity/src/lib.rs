use uuid::Uuid;

pub mod action_items;
pub mod attendees;
pub mod highlights;
pub mod hitl;
pub mod recording_status;
pub mod recordings;
pub mod speakers;
pub mod talk_time_judgement;
pub mod transcript;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
