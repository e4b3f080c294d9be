//! Fans invalidations out over all targets and joins their outcomes.
//!
//! Each target runs its own submit-then-poll state machine in a separate task:
//!
//! ```text
//! Submitting --> InProgress --> Succeeded
//!     |              |
//!     +--------------+--------> Failed
//! ```
//!
//! A failing target never cancels or delays its siblings. The orchestrator waits for
//! every task before reporting, and the run fails if any single target failed.

use std::{fmt, sync::Arc, time::Duration};

use thiserror::Error;
use tokio::{task::JoinSet, time};
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    domain::{CallerReference, InvalidationStatus, Target},
    provider::{CdnProvider, InvalidationClient, ProviderError},
};

pub const DEFAULT_POLL_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    /// Wait before every status check, including the first one
    pub delay: Duration,
    /// `None` polls until the provider reports a terminal status, however long that takes
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("failed to submit invalidation: {0}")]
    Submission(#[source] ProviderError),
    #[error("couldn't get invalidation request id")]
    MissingInvalidationId,
    #[error("failed to fetch status of invalidation {invalidation_id}: {source}")]
    Poll {
        invalidation_id: String,
        #[source]
        source: ProviderError,
    },
    #[error("invalidation {invalidation_id} unsuccessful, status: {status}")]
    Unsuccessful {
        invalidation_id: String,
        status: String,
    },
    #[error("invalidation {invalidation_id} still in progress after {attempts} status checks")]
    PollLimitExceeded {
        invalidation_id: String,
        attempts: u32,
    },
    #[error("invalidation task aborted before finishing")]
    Aborted,
}

/// A target's failure, tagged with the trace id its log lines carry
#[derive(Debug, Error)]
#[error("[{trace_id}] distribution {distribution_id}: {source}")]
pub struct TargetFailure {
    pub trace_id: Uuid,
    pub distribution_id: String,
    #[source]
    pub source: TargetError,
}

#[derive(Debug, Clone)]
pub struct CompletedInvalidation {
    pub trace_id: Uuid,
    pub distribution_id: String,
    pub invalidation_id: String,
    pub caller_reference: CallerReference,
    pub status_checks: u32,
}

#[derive(Debug)]
pub struct InvalidationReport {
    /// In the order targets were given
    pub completed: Vec<CompletedInvalidation>,
}

/// Summary of a run where at least one target failed. Individual causes are in `failures`.
#[derive(Debug, Error)]
pub struct InvalidationFailed {
    pub failures: Vec<TargetFailure>,
    pub completed: Vec<CompletedInvalidation>,
}

impl fmt::Display for InvalidationFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "One or more errors occurred while invalidating CloudFront CDN cache ({} of {} targets failed)",
            self.failures.len(),
            self.failures.len() + self.completed.len()
        )
    }
}

pub struct Orchestrator {
    provider: Arc<dyn CdnProvider>,
    settings: PollSettings,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn CdnProvider>, settings: PollSettings) -> Self {
        Self { provider, settings }
    }

    /// Invalidates every target concurrently and waits for all of them to finish
    pub async fn run(&self, targets: Vec<Target>) -> Result<InvalidationReport, InvalidationFailed> {
        let mut tasks = JoinSet::new();
        let mut identities = Vec::with_capacity(targets.len());

        for (index, target) in targets.into_iter().enumerate() {
            identities.push((target.trace_id(), target.distribution_id().to_string()));

            let provider = Arc::clone(&self.provider);
            let settings = self.settings;
            let span = tracing::info_span!(
                "invalidation",
                trace_id = %target.trace_id(),
                distribution_id = %target.distribution_id(),
            );

            tasks.spawn(
                async move {
                    let outcome = invalidate_target(provider.as_ref(), &target, settings).await;
                    if let Err(e) = &outcome {
                        tracing::warn!(error = %e, "Invalidation request unsuccessful");
                    }
                    (index, outcome)
                }
                .instrument(span),
            );
        }

        let mut outcomes: Vec<Option<Result<CompletedInvalidation, TargetError>>> =
            identities.iter().map(|_| None).collect();

        // wait for all, never bail on the first failure
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = Some(outcome),
                Err(e) => tracing::error!(error = %e, "Invalidation task join error"),
            }
        }

        let mut completed = Vec::new();
        let mut failures = Vec::new();
        for (outcome, (trace_id, distribution_id)) in outcomes.into_iter().zip(identities) {
            match outcome.unwrap_or(Err(TargetError::Aborted)) {
                Ok(done) => completed.push(done),
                Err(source) => failures.push(TargetFailure {
                    trace_id,
                    distribution_id,
                    source,
                }),
            }
        }

        if failures.is_empty() {
            tracing::info!(targets = completed.len(), "All invalidations completed");
            return Ok(InvalidationReport { completed });
        }

        for failure in &failures {
            tracing::error!(
                trace_id = %failure.trace_id,
                distribution_id = %failure.distribution_id,
                error = %failure.source,
                "Invalidation failed"
            );
        }

        Err(InvalidationFailed {
            failures,
            completed,
        })
    }
}

/// Submit, then poll until terminal. Runs inside the target's span.
async fn invalidate_target(
    provider: &dyn CdnProvider,
    target: &Target,
    settings: PollSettings,
) -> Result<CompletedInvalidation, TargetError> {
    let client = provider
        .client(target)
        .await
        .map_err(TargetError::Submission)?;

    let caller_reference = CallerReference::generate();
    tracing::info!(
        paths = ?target.paths(),
        caller_reference = %caller_reference,
        "Creating invalidation"
    );

    let invalidation_id = client
        .create_invalidation(target.distribution_id(), &caller_reference, target.paths())
        .await
        .map_err(TargetError::Submission)?
        .ok_or(TargetError::MissingInvalidationId)?;

    tracing::info!(invalidation_id = %invalidation_id, "Invalidation accepted");

    let status_checks = wait_for_completion(
        client.as_ref(),
        target.distribution_id(),
        &invalidation_id,
        settings,
    )
    .await?;

    tracing::info!(
        invalidation_id = %invalidation_id,
        status_checks,
        "Invalidation request successful"
    );

    Ok(CompletedInvalidation {
        trace_id: target.trace_id(),
        distribution_id: target.distribution_id().to_string(),
        invalidation_id,
        caller_reference,
        status_checks,
    })
}

/// Polls until the status leaves `InProgress`, returning the number of status checks made.
/// A response without a status counts as still in progress.
async fn wait_for_completion(
    client: &dyn InvalidationClient,
    distribution_id: &str,
    invalidation_id: &str,
    settings: PollSettings,
) -> Result<u32, TargetError> {
    let mut attempts = 0u32;

    loop {
        if settings.max_attempts.is_some_and(|max| attempts >= max) {
            return Err(TargetError::PollLimitExceeded {
                invalidation_id: invalidation_id.to_string(),
                attempts,
            });
        }

        time::sleep(settings.delay).await;
        attempts += 1;

        tracing::info!(attempt = attempts, "Fetching invalidation status");
        let raw = client
            .get_invalidation_status(distribution_id, invalidation_id)
            .await
            .map_err(|source| TargetError::Poll {
                invalidation_id: invalidation_id.to_string(),
                source,
            })?;

        let Some(raw) = raw else {
            tracing::warn!(attempt = attempts, "Status missing from response");
            continue;
        };

        let status = InvalidationStatus::parse(&raw);
        tracing::debug!(attempt = attempts, status = %status, "Invalidation status");

        match status {
            InvalidationStatus::InProgress => continue,
            InvalidationStatus::Completed => return Ok(attempts),
            InvalidationStatus::Other(status) => {
                return Err(TargetError::Unsuccessful {
                    invalidation_id: invalidation_id.to_string(),
                    status,
                });
            }
        }
    }
}
