//! CloudFront implementation of the invalidation provider.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudfront::{
    Client,
    config::Credentials,
    error::DisplayErrorContext,
    types::{InvalidationBatch, Paths},
};

use crate::{
    domain::{CallerReference, Target},
    provider::{CdnProvider, InvalidationClient, ProviderError},
};

const CREDENTIALS_SOURCE: &str = "cdn-invalidate";

/// Builds a CloudFront client per target from that target's static credentials and region
#[derive(Debug, Default, Clone, Copy)]
pub struct CloudFrontProvider;

impl CloudFrontProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CdnProvider for CloudFrontProvider {
    async fn client(&self, target: &Target) -> Result<Box<dyn InvalidationClient>, ProviderError> {
        let credentials = Credentials::new(
            target.credentials().access_key_id(),
            target.credentials().secret_access_key(),
            None,
            None,
            CREDENTIALS_SOURCE,
        );

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(target.region().to_string()))
            .credentials_provider(credentials)
            .load()
            .await;

        tracing::debug!(region = %target.region(), "Initialized CloudFront client");

        Ok(Box::new(CloudFrontClient {
            client: Client::new(&config),
        }))
    }
}

pub struct CloudFrontClient {
    client: Client,
}

#[async_trait]
impl InvalidationClient for CloudFrontClient {
    async fn create_invalidation(
        &self,
        distribution_id: &str,
        caller_reference: &CallerReference,
        paths: &[String],
    ) -> Result<Option<String>, ProviderError> {
        let quantity = i32::try_from(paths.len())
            .map_err(|_| ProviderError::InvalidRequest("too many paths".to_string()))?;

        let paths = Paths::builder()
            .quantity(quantity)
            .set_items(Some(paths.to_vec()))
            .build()
            .map_err(|e| ProviderError::InvalidRequest(e.to_string()))?;

        let batch = InvalidationBatch::builder()
            .paths(paths)
            .caller_reference(caller_reference.as_str())
            .build()
            .map_err(|e| ProviderError::InvalidRequest(e.to_string()))?;

        let response = self
            .client
            .create_invalidation()
            .distribution_id(distribution_id)
            .invalidation_batch(batch)
            .send()
            .await
            .map_err(|e| ProviderError::Request(DisplayErrorContext(&e).to_string()))?;

        Ok(response
            .invalidation()
            .map(|invalidation| invalidation.id())
            .filter(|id| !id.is_empty())
            .map(str::to_string))
    }

    async fn get_invalidation_status(
        &self,
        distribution_id: &str,
        invalidation_id: &str,
    ) -> Result<Option<String>, ProviderError> {
        let response = self
            .client
            .get_invalidation()
            .distribution_id(distribution_id)
            .id(invalidation_id)
            .send()
            .await
            .map_err(|e| ProviderError::Request(DisplayErrorContext(&e).to_string()))?;

        Ok(response
            .invalidation()
            .map(|invalidation| invalidation.status())
            .filter(|status| !status.is_empty())
            .map(str::to_string))
    }
}
