//! HTTP clients for the external collaborators the pipeline calls.
//!
//! Every client implements the matching `call_ai` provider trait so the
//! pipeline holds trait objects and tests can swap in doubles.

pub mod assembly_ai;
pub mod credits;
pub mod deepgram;
pub mod meeting_baas;
pub mod open_ai;
pub mod storage;
pub mod transcriber_chain;
