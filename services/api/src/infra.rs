use hire_sync::config::AppConfig;
use hire_sync::error::AppError;
use hire_sync::workflows::hired::{HibobClient, HirePipeline, PinpointClient};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type LivePipeline = HirePipeline<PinpointClient, HibobClient>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Wires the live Pinpoint and HiBob clients into a pipeline.
pub(crate) fn build_pipeline(config: &AppConfig) -> Result<Arc<LivePipeline>, AppError> {
    let source = PinpointClient::new(&config.pinpoint)?;
    let sink = HibobClient::new(&config.hibob)?;
    Ok(Arc::new(HirePipeline::new(
        Arc::new(source),
        Arc::new(sink),
        config.policy.clone(),
    )))
}
