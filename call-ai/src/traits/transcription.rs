//! Transcription provider trait.

use crate::types::transcript::{Request, Transcript};
use crate::Error;
use async_trait::async_trait;

/// Abstraction for speech-to-text transcription services.
///
/// Implementations convert audio/video to text with speaker diarization and
/// timing, hiding the vendor's job model: async submit-and-poll vendors
/// (AssemblyAI) and synchronous vendors (Deepgram) both surface a single
/// `transcribe` call that returns only when a transcript is available or the
/// attempt budget is exhausted.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Obtain a diarized transcript for the media at `request.media_url`.
    ///
    /// Media must be publicly accessible or a pre-signed URL with sufficient
    /// expiry. Raw vendor speaker labels are normalized to dense zero-based
    /// indices before returning. Fails with `Error::Timeout` when a polling
    /// vendor does not finish within the adapter's attempt budget.
    async fn transcribe(&self, request: Request) -> std::result::Result<Transcript, Error>;

    /// Return unique identifier for this provider (e.g., "assemblyai", "deepgram").
    ///
    /// Used for logging, cost tracking, and provider selection.
    /// Must be lowercase, alphanumeric with underscores only.
    fn provider_id(&self) -> &str;
}
