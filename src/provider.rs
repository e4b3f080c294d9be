use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{CallerReference, Target};

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider rejected the call or it never reached it
    #[error("request failed: {0}")]
    Request(String),
    /// The request could not be built from the given parameters
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Invalidation API of one distribution's account, bound to that target's credentials and region.
#[async_trait]
pub trait InvalidationClient: Send + Sync {
    /// Submits an invalidation batch. Returns the provider-assigned id, or `None` if the
    /// response did not carry one.
    async fn create_invalidation(
        &self,
        distribution_id: &str,
        caller_reference: &CallerReference,
        paths: &[String],
    ) -> Result<Option<String>, ProviderError>;

    /// Fetches the raw status of an invalidation, `None` if the response did not carry one.
    async fn get_invalidation_status(
        &self,
        distribution_id: &str,
        invalidation_id: &str,
    ) -> Result<Option<String>, ProviderError>;
}

/// Hands out one client per target. Clients are never shared between targets.
#[async_trait]
pub trait CdnProvider: Send + Sync {
    async fn client(&self, target: &Target) -> Result<Box<dyn InvalidationClient>, ProviderError>;
}
