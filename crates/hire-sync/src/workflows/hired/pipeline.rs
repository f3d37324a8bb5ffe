use std::fmt;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::{debug, error, info};

use super::domain::{ApplicantRecord, ApplicationId, DataIntegrityError, EmployeeId, HireEvent};
use super::gateway::{
    ApplicantSource, ApplicationComment, EmployeeWork, HrSink, IntegrationError, NewEmployee,
    SharedDocument,
};

pub const DEFAULT_WORK_SITE: &str = "New York (Demo)";
pub const DEFAULT_START_OFFSET_DAYS: i64 = 30;

/// Fixed values applied to every employee the pipeline creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeePolicy {
    pub site: String,
    pub start_date: NaiveDate,
    /// Replaces the applicant's email, for sandbox HiBob tenants.
    pub email_override: Option<String>,
}

impl EmployeePolicy {
    pub fn new(site: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            site: site.into(),
            start_date,
            email_override: None,
        }
    }

    /// Default site with a start date a fixed number of days after `today`.
    pub fn starting_after(today: NaiveDate) -> Self {
        let start_date = today
            .checked_add_signed(Duration::days(DEFAULT_START_OFFSET_DAYS))
            .unwrap_or(today);
        Self::new(DEFAULT_WORK_SITE, start_date)
    }

    pub fn with_email_override(mut self, email: impl Into<String>) -> Self {
        self.email_override = Some(email.into());
        self
    }
}

/// Network-calling steps of a run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Fetch,
    CreateEmployee,
    UploadCv,
    UpdateApplication,
}

impl Stage {
    pub const fn label(self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::CreateEmployee => "create_employee",
            Stage::UploadCv => "upload_cv",
            Stage::UpdateApplication => "update_application",
        }
    }

    const fn description(self) -> &'static str {
        match self {
            Stage::Fetch => "fetching the Pinpoint application",
            Stage::CreateEmployee => "creating the HiBob employee",
            Stage::UploadCv => "sharing the CV with the HiBob employee",
            Stage::UpdateApplication => "commenting on the Pinpoint application",
        }
    }

    const fn completed_state(self) -> RunState {
        match self {
            Stage::Fetch => RunState::Fetched,
            Stage::CreateEmployee => RunState::EmployeeCreated,
            Stage::UploadCv => RunState::CvUploaded,
            Stage::UpdateApplication => RunState::Commented,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Start,
    Fetched,
    EmployeeCreated,
    CvUploaded,
    Commented,
    Failed(Stage),
}

impl RunState {
    pub const fn label(self) -> &'static str {
        match self {
            RunState::Start => "start",
            RunState::Fetched => "fetched",
            RunState::EmployeeCreated => "employee_created",
            RunState::CvUploaded => "cv_uploaded",
            RunState::Commented => "commented",
            RunState::Failed(_) => "failed",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, RunState::Commented | RunState::Failed(_))
    }

    /// Stage that runs next from this state; `None` once terminal.
    pub const fn next_stage(self) -> Option<Stage> {
        match self {
            RunState::Start => Some(Stage::Fetch),
            RunState::Fetched => Some(Stage::CreateEmployee),
            RunState::EmployeeCreated => Some(Stage::UploadCv),
            RunState::CvUploaded => Some(Stage::UpdateApplication),
            RunState::Commented | RunState::Failed(_) => None,
        }
    }
}

/// Failure recorded against the stage that raised it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageError {
    pub stage: Stage,
    pub message: String,
    pub cause: IntegrationError,
}

/// State threaded through the stages of one hire event.
#[derive(Debug)]
pub struct PipelineRun {
    application_id: ApplicationId,
    applicant: Option<ApplicantRecord>,
    employee_id: Option<EmployeeId>,
    state: RunState,
    errors: Vec<StageError>,
}

impl PipelineRun {
    pub fn new(event: &HireEvent) -> Self {
        Self {
            application_id: event.application_id().clone(),
            applicant: None,
            employee_id: None,
            state: RunState::Start,
            errors: Vec::new(),
        }
    }

    pub fn application_id(&self) -> &ApplicationId {
        &self.application_id
    }

    pub fn applicant_record(&self) -> Option<&ApplicantRecord> {
        self.applicant.as_ref()
    }

    pub fn employee_id(&self) -> Option<&EmployeeId> {
        self.employee_id.as_ref()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn errors(&self) -> &[StageError] {
        &self.errors
    }

    pub fn succeeded(&self) -> bool {
        self.state == RunState::Commented
    }

    pub fn failed_stage(&self) -> Option<Stage> {
        match self.state {
            RunState::Failed(stage) => Some(stage),
            _ => None,
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            application_id: self.application_id.0.clone(),
            state: self.state.label(),
            failed_stage: self.failed_stage(),
            employee_id: self.employee_id.as_ref().map(|id| id.0.clone()),
            errors: self
                .errors
                .iter()
                .map(|error| StageErrorView {
                    stage: error.stage,
                    message: error.message.clone(),
                })
                .collect(),
        }
    }

    fn applicant(&self) -> Result<&ApplicantRecord, DataIntegrityError> {
        self.applicant
            .as_ref()
            .ok_or(DataIntegrityError::ApplicantNotFetched)
    }

    fn employee(&self) -> Result<&EmployeeId, DataIntegrityError> {
        self.employee_id
            .as_ref()
            .ok_or(DataIntegrityError::EmployeeNotCreated)
    }

    fn record_failure(&mut self, stage: Stage, cause: IntegrationError) {
        let message = format!("{} failed: {}", stage.description(), cause);
        self.errors.push(StageError {
            stage,
            message,
            cause,
        });
        self.state = RunState::Failed(stage);
    }
}

/// Serializable outcome of a run for logs and the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub application_id: String,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    pub errors: Vec<StageErrorView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageErrorView {
    pub stage: Stage,
    pub message: String,
}

/// Drives a hire event from Pinpoint into HiBob and back.
///
/// Stages run strictly in order and the first failure ends the run. Nothing
/// already written upstream is rolled back and no stage is retried.
pub struct HirePipeline<S, H> {
    source: Arc<S>,
    sink: Arc<H>,
    policy: EmployeePolicy,
}

impl<S, H> HirePipeline<S, H>
where
    S: ApplicantSource + 'static,
    H: HrSink + 'static,
{
    pub fn new(source: Arc<S>, sink: Arc<H>, policy: EmployeePolicy) -> Self {
        Self {
            source,
            sink,
            policy,
        }
    }

    pub fn policy(&self) -> &EmployeePolicy {
        &self.policy
    }

    /// Run every stage for `event` and return the finished run.
    pub async fn run(&self, event: HireEvent) -> PipelineRun {
        let mut run = PipelineRun::new(&event);
        info!(application_id = %run.application_id, "processing hired application");

        while self.advance(&mut run).await {}

        if run.succeeded() {
            info!(
                application_id = %run.application_id,
                employee_id = run.employee_id.as_ref().map(|id| id.0.as_str()),
                "hired application synced to HiBob"
            );
        } else {
            for failure in &run.errors {
                error!(
                    application_id = %run.application_id,
                    stage = failure.stage.label(),
                    employee_id = run.employee_id.as_ref().map(|id| id.0.as_str()),
                    error = %failure.cause,
                    "hire sync stopped"
                );
            }
        }

        run
    }

    /// Execute the stage owed by the current state. Returns `false` once the
    /// run is terminal.
    pub(crate) async fn advance(&self, run: &mut PipelineRun) -> bool {
        let Some(stage) = run.state.next_stage() else {
            return false;
        };

        debug!(application_id = %run.application_id, stage = stage.label(), "stage started");

        let outcome = match stage {
            Stage::Fetch => self.fetch_application(run).await,
            Stage::CreateEmployee => self.create_employee(run).await,
            Stage::UploadCv => self.upload_cv(run).await,
            Stage::UpdateApplication => self.update_application(run).await,
        };

        match outcome {
            Ok(()) => {
                run.state = stage.completed_state();
                debug!(
                    application_id = %run.application_id,
                    stage = stage.label(),
                    "stage completed"
                );
            }
            Err(cause) => run.record_failure(stage, cause),
        }

        !run.state.is_terminal()
    }

    pub(crate) async fn fetch_application(
        &self,
        run: &mut PipelineRun,
    ) -> Result<(), IntegrationError> {
        let record = self.source.fetch_application(&run.application_id).await?;
        run.applicant = Some(record);
        Ok(())
    }

    pub(crate) async fn create_employee(
        &self,
        run: &mut PipelineRun,
    ) -> Result<(), IntegrationError> {
        let request = self.employee_request(run.applicant()?);
        let employee_id = self.sink.create_employee(&request).await?;
        run.employee_id = Some(employee_id);
        Ok(())
    }

    pub(crate) async fn upload_cv(&self, run: &mut PipelineRun) -> Result<(), IntegrationError> {
        let employee_id = run.employee()?;
        let applicant = run.applicant()?;
        let document = SharedDocument {
            document_name: applicant.cv_filename()?.to_string(),
            document_url: applicant.cv_url()?.to_string(),
        };
        self.sink
            .upload_shared_document(employee_id, &document)
            .await?;
        Ok(())
    }

    pub(crate) async fn update_application(
        &self,
        run: &mut PipelineRun,
    ) -> Result<(), IntegrationError> {
        let comment =
            ApplicationComment::hire_confirmation(run.application_id.clone(), run.employee()?);
        self.source.post_comment(&comment).await?;
        Ok(())
    }

    pub fn employee_request(&self, applicant: &ApplicantRecord) -> NewEmployee {
        let email = self
            .policy
            .email_override
            .clone()
            .unwrap_or_else(|| applicant.email().to_string());

        NewEmployee {
            first_name: applicant.first_name().to_string(),
            surname: applicant.last_name().to_string(),
            email,
            work: EmployeeWork {
                site: self.policy.site.clone(),
                start_date: self.policy.start_date,
            },
        }
    }
}
