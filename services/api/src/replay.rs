use crate::infra::build_pipeline;
use clap::Args;
use hire_sync::config::AppConfig;
use hire_sync::error::AppError;
use hire_sync::telemetry;
use hire_sync::workflows::hired::{HireEvent, PipelineRun};
use std::io::{self, Write};

#[derive(Args, Debug)]
pub(crate) struct ReplayArgs {
    /// Pinpoint application id to sync
    #[arg(long, value_parser = parse_application_id)]
    pub(crate) application_id: String,
}

fn parse_application_id(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err("application id must not be blank".to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

/// Runs the hire sync once, printing the run summary as JSON on stdout.
///
/// Every replay creates a new HiBob employee.
pub(crate) async fn run(args: ReplayArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let pipeline = build_pipeline(&config)?;
    let run = pipeline.run(HireEvent::new(args.application_id)).await;

    let mut stdout = io::stdout().lock();
    write_summary(&mut stdout, &run)?;
    outcome(&run)
}

fn write_summary(out: &mut impl Write, run: &PipelineRun) -> Result<(), AppError> {
    let summary = serde_json::to_string_pretty(&run.summary())
        .map_err(|err| AppError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))?;
    writeln!(out, "{summary}")?;
    Ok(())
}

fn outcome(run: &PipelineRun) -> Result<(), AppError> {
    match run.failed_stage() {
        Some(stage) => Err(AppError::SyncFailed {
            application_id: run.application_id().to_string(),
            stage,
        }),
        None => Ok(()),
    }
}
