pub use entity::{recordings, Id};

pub mod error;
pub mod recording;
