use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::warn;

use super::domain::{HireEvent, HiredWebhook};
use super::gateway::{ApplicantSource, HrSink};
use super::pipeline::HirePipeline;

pub const APPLICATION_HIRED_PATH: &str = "/pinpoint/application-hired";

/// Router exposing the Pinpoint `application_hired` webhook.
pub fn hired_router<S, H>(pipeline: Arc<HirePipeline<S, H>>) -> Router
where
    S: ApplicantSource + 'static,
    H: HrSink + 'static,
{
    Router::new()
        .route(APPLICATION_HIRED_PATH, post(application_hired_handler::<S, H>))
        .with_state(pipeline)
}

/// Runs the pipeline to completion, then acknowledges with an empty 200.
///
/// The acknowledgement does not depend on the outcome: Pinpoint never learns
/// about a failed sync, only the service logs do.
pub(crate) async fn application_hired_handler<S, H>(
    State(pipeline): State<Arc<HirePipeline<S, H>>>,
    Json(webhook): Json<HiredWebhook>,
) -> StatusCode
where
    S: ApplicantSource + 'static,
    H: HrSink + 'static,
{
    let run = pipeline.run(HireEvent::from(webhook)).await;

    if let Some(stage) = run.failed_stage() {
        warn!(
            application_id = %run.application_id(),
            stage = stage.label(),
            "acknowledging webhook although the hire sync failed"
        );
    }

    StatusCode::OK
}
