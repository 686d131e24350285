//! Provider-agnostic data types exchanged with call AI services.

pub mod media;
pub mod transcript;
