use std::sync::Arc;

use thiserror::Error;

use crate::{
    config::Settings,
    orchestrator::{InvalidationFailed, InvalidationReport, Orchestrator, PollSettings},
    provider::CdnProvider,
    redact::Redactor,
    resolver::{self, ResolveError},
};

#[derive(Debug, Error)]
pub enum RunError {
    /// Nothing was submitted
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Invalidation(#[from] InvalidationFailed),
}

impl From<&Settings> for PollSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            delay: settings.delay,
            max_attempts: settings.max_poll_attempts,
        }
    }
}

/// Resolves targets from `settings` and invalidates all of them through `provider`
#[tracing::instrument(name = "app::run", skip_all)]
pub async fn run(
    settings: &Settings,
    redactor: &Redactor,
    provider: Arc<dyn CdnProvider>,
) -> Result<InvalidationReport, RunError> {
    let targets = resolver::resolve(&settings.inputs, redactor)?;

    let orchestrator = Orchestrator::new(provider, PollSettings::from(settings));
    let report = orchestrator.run(targets).await?;

    Ok(report)
}
