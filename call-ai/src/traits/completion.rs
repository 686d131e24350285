//! LLM completion provider trait.

use crate::Error;
use async_trait::async_trait;

/// Abstraction for LLM-powered text completion.
///
/// Implementations run a single prompt and return the raw response text.
/// No response schema is enforced by the provider; callers that expect JSON
/// must parse defensively and carry their own fallback.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Run a prompt and return the model's response text.
    async fn complete(&self, prompt: &str) -> std::result::Result<String, Error>;

    /// Return unique identifier for this provider (e.g., "openai").
    ///
    /// Must be lowercase, alphanumeric with underscores only.
    fn provider_id(&self) -> &str;
}
