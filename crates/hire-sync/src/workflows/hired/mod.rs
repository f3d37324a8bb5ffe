//! Pinpoint "application hired" to HiBob employee sync.
//!
//! A hire event flows through four stages: fetch the application from Pinpoint,
//! create the employee in HiBob, share the CV with that employee, and comment
//! the new employee id back onto the application.

pub mod domain;
pub mod gateway;
pub mod hibob;
mod http;
pub mod pinpoint;
pub mod pipeline;
pub mod router;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantRecord, ApplicationId, Attachment, DataIntegrityError, EmployeeId, HireEvent,
    HiredWebhook, CV_ATTACHMENT_CONTEXT,
};
pub use gateway::{
    ApplicantSource, ApplicationComment, ClientBuildError, EmployeeWork, HrSink,
    IntegrationError, NewEmployee, SharedDocument, UpstreamError, UpstreamFailure,
};
pub use hibob::HibobClient;
pub use pinpoint::PinpointClient;
pub use pipeline::{
    EmployeePolicy, HirePipeline, PipelineRun, RunState, RunSummary, Stage, StageError,
};
pub use router::{hired_router, APPLICATION_HIRED_PATH};
