use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::workflows::hired::domain::{ApplicantRecord, ApplicationId, EmployeeId, HireEvent};
use crate::workflows::hired::gateway::{
    ApplicantSource, ApplicationComment, HrSink, IntegrationError, NewEmployee, SharedDocument,
    UpstreamError, UpstreamFailure,
};
use crate::workflows::hired::pipeline::{EmployeePolicy, HirePipeline};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Call {
    Fetch(String),
    CreateEmployee(NewEmployee),
    UploadDocument(String, SharedDocument),
    Comment(ApplicationComment),
}

pub(super) type CallLog = Arc<Mutex<Vec<Call>>>;

pub(super) fn calls(log: &CallLog) -> Vec<Call> {
    log.lock().expect("call log poisoned").clone()
}

pub(super) fn creation_count(log: &CallLog) -> usize {
    calls(log)
        .iter()
        .filter(|call| matches!(call, Call::CreateEmployee(_)))
        .count()
}

pub(super) fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 11, 2).expect("valid date")
}

pub(super) fn policy() -> EmployeePolicy {
    EmployeePolicy::new("New York (Demo)", start_date())
}

pub(super) fn hire_event() -> HireEvent {
    HireEvent::new("42")
}

/// Application resource as Pinpoint returns it under `data`.
pub(super) fn ada_resource() -> Value {
    json!({
        "id": "42",
        "type": "applications",
        "attributes": {
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "attachments": [
                {
                    "context": "pdf_cv",
                    "filename": "cv.pdf",
                    "url": "https://files/cv.pdf"
                }
            ]
        }
    })
}

pub(super) fn resource_without_cv() -> Value {
    let mut resource = ada_resource();
    resource["attributes"]["attachments"] = json!([
        {
            "context": "cover_letter",
            "filename": "letter.pdf",
            "url": "https://files/letter.pdf"
        }
    ]);
    resource
}

pub(super) fn not_found() -> UpstreamError {
    UpstreamError::Fetch {
        resource: "pinpoint application 42".to_string(),
        failure: UpstreamFailure::Status {
            status: 404,
            body: r#"{"errors":[{"title":"Not Found"}]}"#.to_string(),
        },
    }
}

pub(super) fn write_rejected(resource: &str, status: u16) -> UpstreamError {
    UpstreamError::Write {
        resource: resource.to_string(),
        failure: UpstreamFailure::Status {
            status,
            body: "rejected".to_string(),
        },
    }
}

pub(super) struct FakeSource {
    log: CallLog,
    resource: Value,
    fetch_failure: Option<UpstreamError>,
    comment_failure: Option<UpstreamError>,
}

impl FakeSource {
    pub(super) fn new(log: &CallLog, resource: Value) -> Self {
        Self {
            log: log.clone(),
            resource,
            fetch_failure: None,
            comment_failure: None,
        }
    }

    pub(super) fn failing_fetch(mut self, error: UpstreamError) -> Self {
        self.fetch_failure = Some(error);
        self
    }

    pub(super) fn failing_comment(mut self, error: UpstreamError) -> Self {
        self.comment_failure = Some(error);
        self
    }
}

#[async_trait]
impl ApplicantSource for FakeSource {
    async fn fetch_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicantRecord, IntegrationError> {
        self.log
            .lock()
            .expect("call log poisoned")
            .push(Call::Fetch(application_id.0.clone()));
        if let Some(error) = &self.fetch_failure {
            return Err(error.clone().into());
        }
        Ok(ApplicantRecord::from_resource(self.resource.clone())?)
    }

    async fn post_comment(&self, comment: &ApplicationComment) -> Result<(), UpstreamError> {
        self.log
            .lock()
            .expect("call log poisoned")
            .push(Call::Comment(comment.clone()));
        match &self.comment_failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

/// Hands out `emp-7`, `emp-8`, ... so repeated creations stay distinguishable.
pub(super) struct FakeSink {
    log: CallLog,
    next_id: AtomicU64,
    create_failure: Option<UpstreamError>,
    upload_failure: Option<UpstreamError>,
}

impl FakeSink {
    pub(super) fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            next_id: AtomicU64::new(7),
            create_failure: None,
            upload_failure: None,
        }
    }

    pub(super) fn failing_create(mut self, error: UpstreamError) -> Self {
        self.create_failure = Some(error);
        self
    }

    pub(super) fn failing_upload(mut self, error: UpstreamError) -> Self {
        self.upload_failure = Some(error);
        self
    }
}

#[async_trait]
impl HrSink for FakeSink {
    async fn create_employee(&self, employee: &NewEmployee) -> Result<EmployeeId, UpstreamError> {
        self.log
            .lock()
            .expect("call log poisoned")
            .push(Call::CreateEmployee(employee.clone()));
        if let Some(error) = &self.create_failure {
            return Err(error.clone());
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        Ok(EmployeeId(format!("emp-{id}")))
    }

    async fn upload_shared_document(
        &self,
        employee_id: &EmployeeId,
        document: &SharedDocument,
    ) -> Result<(), UpstreamError> {
        self.log
            .lock()
            .expect("call log poisoned")
            .push(Call::UploadDocument(employee_id.0.clone(), document.clone()));
        match &self.upload_failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

pub(super) fn pipeline(source: FakeSource, sink: FakeSink) -> HirePipeline<FakeSource, FakeSink> {
    HirePipeline::new(Arc::new(source), Arc::new(sink), policy())
}

/// Pipeline over a healthy source/sink pair sharing `log`.
pub(super) fn healthy_pipeline(log: &CallLog) -> HirePipeline<FakeSource, FakeSink> {
    pipeline(FakeSource::new(log, ada_resource()), FakeSink::new(log))
}
