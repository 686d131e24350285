//! Durable storage provider trait.

use crate::Error;
use async_trait::async_trait;
use std::time::Duration;

/// Abstraction for the durable media storage collaborator.
///
/// The pipeline only mints read access for objects another service already
/// uploaded; `store_object` completes the collaborator contract but is not
/// called from orchestration code.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Mint a short-lived signed GET URL for a durable object key.
    ///
    /// `expires_in` must not exceed the collaborator's signing ceiling
    /// (two hours for recording media).
    async fn signed_get_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> std::result::Result<String, Error>;

    /// Store raw bytes and return the durable object key.
    async fn store_object(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> std::result::Result<String, Error>;

    /// Return unique identifier for this provider (e.g., "media_service").
    ///
    /// Must be lowercase, alphanumeric with underscores only.
    fn provider_id(&self) -> &str;
}
