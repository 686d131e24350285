//! Call AI abstraction layer for the external collaborators of the
//! intelligence pipeline.
//!
//! This crate provides trait-based abstractions for:
//! - Capture agents that join meetings and expose recording artifacts
//! - Speech-to-text transcription with speaker diarization
//! - LLM completion for analysis generation
//! - Storage signing for durable media objects
//! - Credit-balance checks gating premium analysis
//!
//! The design is provider-agnostic, enabling the pipeline to swap between
//! service providers (MeetingBaaS, AssemblyAI, Deepgram, OpenAI, etc.) without
//! changing orchestration code. With the `mock` feature enabled, every trait
//! also emits a mockall double for call-counting tests.

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::Error;
pub use types::transcript::{Transcript, Utterance};
