//! Capture-agent provider trait.

use crate::types::media::RecordingMedia;
use crate::Error;
use async_trait::async_trait;

/// Abstraction for meeting bot services that join meetings to record.
///
/// Implementations expose the artifacts of an already-finished bot; deploying
/// and stopping bots belongs to the capture collaborator, not this pipeline.
/// Supports providers like MeetingBaaS and Recall.ai.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Fetch the finished recording media for a bot.
    ///
    /// Fails with `Error::NotFound` when the vendor has no recording for the
    /// bot yet; the media resolver treats that as "try the next tier".
    async fn get_recording(&self, bot_id: &str) -> std::result::Result<RecordingMedia, Error>;

    /// Fetch the raw bot status payload.
    ///
    /// Field layout varies by vendor and API version, so the payload is
    /// returned opaque; callers extract media URLs heuristically.
    async fn get_bot_status(&self, bot_id: &str)
        -> std::result::Result<serde_json::Value, Error>;

    /// Return unique identifier for this provider (e.g., "meeting_baas").
    ///
    /// Must be lowercase, alphanumeric with underscores only.
    fn provider_id(&self) -> &str;
}
