use std::{process::ExitCode, sync::Arc};

use anyhow::Result;
use cdn_invalidate::{
    actions, app, cloudfront::CloudFrontProvider, config, redact::Redactor, telemetry,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let redactor = Redactor::new();
    if let Err(e) = telemetry::init(redactor.clone()) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    match run(&redactor).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = redactor.redact(&format!("{e:#}")).into_owned();
            tracing::error!("{message}");
            actions::set_failed(&message);
            ExitCode::FAILURE
        }
    }
}

async fn run(redactor: &Redactor) -> Result<()> {
    let settings = config::load()?;
    let provider = Arc::new(CloudFrontProvider::new());

    let report = app::run(&settings, redactor, provider).await?;
    tracing::info!(
        invalidations = report.completed.len(),
        "CloudFront invalidations finished"
    );

    Ok(())
}
