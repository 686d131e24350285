//! This module re-exports various items from the `entity_api` crate.
//!
//! The purpose of this re-export is to ensure that consumers of the `domain` crate do not need to
//! directly depend on the `entity_api` crate. By re-exporting these items, we provide a clear and
//! consistent interface for working with recordings within the domain layer, while the underlying
//! persistence details remain encapsulated in the `entity_api` crate.

// Re-exports from `entity` crate via `entity_api`
pub use entity_api::{recordings, Id};

pub mod analysis;
pub mod error;
pub mod hitl;
pub mod media_resolver;
pub mod pipeline;
pub mod recording;
pub mod speakers;

pub mod gateway;
