use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt::MakeWriter};

use crate::redact::{RedactingMakeWriter, Redactor};

const DEFAULT_FILTER: &str = "info";

/// Builds the fmt subscriber used by the binary, writing through the redactor.
/// `RUST_LOG` overrides the default `info` filter.
pub fn subscriber<W>(redactor: Redactor, writer: W) -> impl tracing::Subscriber + Send + Sync
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(RedactingMakeWriter::new(redactor, writer))
        .finish()
}

/// Installs the redacting subscriber as the global default, logging to stdout
pub fn init(redactor: Redactor) -> Result<()> {
    tracing::subscriber::set_global_default(subscriber(redactor, std::io::stdout))
        .context("Failed to install tracing subscriber")
}
