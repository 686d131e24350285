//! Provider trait abstractions consumed by the pipeline orchestrator.
//!
//! Each module defines a `Provider` trait for one external collaborator.
//! Compile with the `mock` feature to get a `MockProvider` double per module.

pub mod capture;
pub mod completion;
pub mod credits;
pub mod storage;
pub mod transcription;
