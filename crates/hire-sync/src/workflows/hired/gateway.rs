use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{ApplicantRecord, ApplicationId, DataIntegrityError, EmployeeId};

/// Recruiting platform the hire event originates from (Pinpoint).
#[async_trait]
pub trait ApplicantSource: Send + Sync {
    /// Fetch an application together with its attachments.
    async fn fetch_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicantRecord, IntegrationError>;

    async fn post_comment(&self, comment: &ApplicationComment) -> Result<(), UpstreamError>;
}

/// HR platform new employees are provisioned in (HiBob).
///
/// `create_employee` is not idempotent: every call creates a new person.
#[async_trait]
pub trait HrSink: Send + Sync {
    async fn create_employee(&self, employee: &NewEmployee) -> Result<EmployeeId, UpstreamError>;

    async fn upload_shared_document(
        &self,
        employee_id: &EmployeeId,
        document: &SharedDocument,
    ) -> Result<(), UpstreamError>;
}

/// Person payload for `POST /people`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub first_name: String,
    pub surname: String,
    pub email: String,
    pub work: EmployeeWork,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeWork {
    pub site: String,
    pub start_date: NaiveDate,
}

/// Document linked to an employee by URL rather than uploaded bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedDocument {
    pub document_name: String,
    pub document_url: String,
}

/// Comment written back onto a Pinpoint application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationComment {
    pub application_id: ApplicationId,
    pub body_text: String,
}

impl ApplicationComment {
    pub fn hire_confirmation(application_id: ApplicationId, employee_id: &EmployeeId) -> Self {
        Self {
            application_id,
            body_text: format!("Record created with ID: {employee_id}"),
        }
    }
}

/// A call to Pinpoint or HiBob did not complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    #[error("failed to fetch {resource}: {failure}")]
    Fetch {
        resource: String,
        failure: UpstreamFailure,
    },
    #[error("failed to write {resource}: {failure}")]
    Write {
        resource: String,
        failure: UpstreamFailure,
    },
}

impl UpstreamError {
    pub fn failure(&self) -> &UpstreamFailure {
        match self {
            UpstreamError::Fetch { failure, .. } | UpstreamError::Write { failure, .. } => failure,
        }
    }

    /// HTTP status of a rejected call, if the upstream answered at all.
    pub fn status(&self) -> Option<u16> {
        match self.failure() {
            UpstreamFailure::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamFailure {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("upstream responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("response body could not be decoded: {0}")]
    Decode(String),
}

/// Cause recorded against a failed pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrationError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    DataIntegrity(#[from] DataIntegrityError),
}

/// An HTTP client could not be constructed from its configuration.
#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    #[error("{client} base url '{url}' is not a valid http(s) url")]
    InvalidBaseUrl { client: &'static str, url: String },
    #[error("{client} credential cannot be sent as a header value")]
    InvalidCredential { client: &'static str },
    #[error("http client unavailable: {0}")]
    Http(String),
}
