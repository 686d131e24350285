//! Credit-balance provider trait.

use crate::Error;
use async_trait::async_trait;
use uuid::Uuid;

/// Abstraction for the billing collaborator's balance check.
///
/// The check is advisory rate-limiting for premium analysis, not a
/// correctness invariant; callers are expected to fail open when the
/// collaborator is unreachable.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Whether the organization has credit available for premium analysis.
    async fn check_balance(&self, organization_id: Uuid) -> std::result::Result<bool, Error>;

    /// Return unique identifier for this provider (e.g., "billing_service").
    ///
    /// Must be lowercase, alphanumeric with underscores only.
    fn provider_id(&self) -> &str;
}
