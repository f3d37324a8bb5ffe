use super::common::*;
use std::sync::Arc;

use crate::workflows::hired::domain::{ApplicationId, DataIntegrityError, EmployeeId, HireEvent};
use crate::workflows::hired::gateway::{
    ApplicationComment, EmployeeWork, IntegrationError, NewEmployee, SharedDocument,
    UpstreamError,
};
use crate::workflows::hired::pipeline::{
    EmployeePolicy, HirePipeline, PipelineRun, RunState, Stage,
};

fn expected_employee() -> NewEmployee {
    NewEmployee {
        first_name: "Ada".to_string(),
        surname: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        work: EmployeeWork {
            site: "New York (Demo)".to_string(),
            start_date: start_date(),
        },
    }
}

fn expected_cv() -> SharedDocument {
    SharedDocument {
        document_name: "cv.pdf".to_string(),
        document_url: "https://files/cv.pdf".to_string(),
    }
}

#[tokio::test]
async fn successful_run_threads_state_through_every_stage() {
    let log = CallLog::default();
    let pipeline = healthy_pipeline(&log);

    let run = pipeline.run(hire_event()).await;

    assert!(run.succeeded());
    assert_eq!(run.state(), RunState::Commented);
    assert!(run.errors().is_empty());
    assert_eq!(run.employee_id(), Some(&EmployeeId("emp-7".to_string())));
    assert_eq!(
        run.applicant_record().map(|record| record.email()),
        Some("ada@example.com")
    );

    assert_eq!(
        calls(&log),
        vec![
            Call::Fetch("42".to_string()),
            Call::CreateEmployee(expected_employee()),
            Call::UploadDocument("emp-7".to_string(), expected_cv()),
            Call::Comment(ApplicationComment {
                application_id: ApplicationId("42".to_string()),
                body_text: "Record created with ID: emp-7".to_string(),
            }),
        ]
    );
}

#[tokio::test]
async fn successful_run_creates_exactly_one_employee() {
    let log = CallLog::default();
    let pipeline = healthy_pipeline(&log);

    let run = pipeline.run(hire_event()).await;

    assert!(run.succeeded());
    assert_eq!(creation_count(&log), 1);
}

#[tokio::test]
async fn fetch_failure_makes_no_hr_calls() {
    let log = CallLog::default();
    let pipeline = pipeline(
        FakeSource::new(&log, ada_resource()).failing_fetch(not_found()),
        FakeSink::new(&log),
    );

    let run = pipeline.run(hire_event()).await;

    assert_eq!(run.state(), RunState::Failed(Stage::Fetch));
    assert_eq!(calls(&log), vec![Call::Fetch("42".to_string())]);
    assert!(run.applicant_record().is_none());
    assert!(run.employee_id().is_none());

    let errors = run.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].stage, Stage::Fetch);
    match &errors[0].cause {
        IntegrationError::Upstream(error @ UpstreamError::Fetch { .. }) => {
            assert_eq!(error.status(), Some(404));
        }
        other => panic!("expected upstream fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_application_fails_the_fetch_stage() {
    let log = CallLog::default();
    let pipeline = pipeline(
        FakeSource::new(&log, serde_json::json!({ "id": "42" })),
        FakeSink::new(&log),
    );

    let run = pipeline.run(hire_event()).await;

    assert_eq!(run.failed_stage(), Some(Stage::Fetch));
    assert!(matches!(
        run.errors()[0].cause,
        IntegrationError::DataIntegrity(DataIntegrityError::MalformedRecord(_))
    ));
    assert_eq!(creation_count(&log), 0);
}

#[tokio::test]
async fn create_failure_stops_before_the_cv_upload() {
    let log = CallLog::default();
    let pipeline = pipeline(
        FakeSource::new(&log, ada_resource()),
        FakeSink::new(&log).failing_create(write_rejected("hibob person", 422)),
    );

    let run = pipeline.run(hire_event()).await;

    assert_eq!(run.state(), RunState::Failed(Stage::CreateEmployee));
    assert!(run.employee_id().is_none());
    assert_eq!(
        calls(&log),
        vec![
            Call::Fetch("42".to_string()),
            Call::CreateEmployee(expected_employee()),
        ]
    );
}

#[tokio::test]
async fn upload_failure_halts_before_commenting() {
    let log = CallLog::default();
    let pipeline = pipeline(
        FakeSource::new(&log, ada_resource()),
        FakeSink::new(&log).failing_upload(write_rejected("hibob shared document", 404)),
    );

    let run = pipeline.run(hire_event()).await;

    assert_eq!(run.state(), RunState::Failed(Stage::UploadCv));
    assert_eq!(run.errors().len(), 1);
    assert_eq!(run.errors()[0].stage.label(), "upload_cv");
    assert!(!calls(&log)
        .iter()
        .any(|call| matches!(call, Call::Comment(_))));
    // The employee created upstream is left in place.
    assert_eq!(run.employee_id(), Some(&EmployeeId("emp-7".to_string())));
}

#[tokio::test]
async fn missing_cv_fails_the_upload_stage() {
    let log = CallLog::default();
    let pipeline = pipeline(
        FakeSource::new(&log, resource_without_cv()),
        FakeSink::new(&log),
    );

    let run = pipeline.run(hire_event()).await;

    assert_eq!(run.state(), RunState::Failed(Stage::UploadCv));
    assert_eq!(
        run.errors()[0].cause,
        IntegrationError::DataIntegrity(DataIntegrityError::MissingCvAttachment {
            application_id: ApplicationId("42".to_string()),
        })
    );
    let recorded = calls(&log);
    assert_eq!(recorded.len(), 2);
    assert!(matches!(recorded[1], Call::CreateEmployee(_)));
}

#[tokio::test]
async fn cv_without_url_fails_the_upload_stage_without_a_call() {
    let log = CallLog::default();
    let mut resource = ada_resource();
    resource["attributes"]["attachments"][0]["url"] = serde_json::Value::Null;
    let pipeline = pipeline(FakeSource::new(&log, resource), FakeSink::new(&log));

    let run = pipeline.run(hire_event()).await;

    assert_eq!(run.state(), RunState::Failed(Stage::UploadCv));
    assert!(matches!(
        run.errors()[0].cause,
        IntegrationError::DataIntegrity(DataIntegrityError::MalformedRecord(_))
    ));
    assert!(!calls(&log)
        .iter()
        .any(|call| matches!(call, Call::UploadDocument(..))));
}

#[tokio::test]
async fn comment_failure_is_tagged_update_application() {
    let log = CallLog::default();
    let pipeline = pipeline(
        FakeSource::new(&log, ada_resource())
            .failing_comment(write_rejected("pinpoint comment on application 42", 500)),
        FakeSink::new(&log),
    );

    let run = pipeline.run(hire_event()).await;

    assert_eq!(run.failed_stage(), Some(Stage::UpdateApplication));
    assert_eq!(run.errors().len(), 1);
    assert!(run.errors()[0]
        .message
        .starts_with("commenting on the Pinpoint application failed"));
    assert_eq!(calls(&log).len(), 4);
}

#[tokio::test]
async fn replaying_an_event_creates_a_second_employee() {
    let log = CallLog::default();
    let pipeline = healthy_pipeline(&log);

    let first = pipeline.run(hire_event()).await;
    let second = pipeline.run(hire_event()).await;

    assert!(first.succeeded() && second.succeeded());
    assert_eq!(creation_count(&log), 2);
    assert_ne!(first.employee_id(), second.employee_id());
}

#[tokio::test]
async fn policy_values_flow_into_the_employee_request() {
    let log = CallLog::default();
    let start = chrono::NaiveDate::from_ymd_opt(2027, 1, 4).expect("valid date");
    let policy = EmployeePolicy::new("London", start).with_email_override("sandbox@example.com");
    let pipeline = HirePipeline::new(
        Arc::new(FakeSource::new(&log, ada_resource())),
        Arc::new(FakeSink::new(&log)),
        policy,
    );

    pipeline.run(hire_event()).await;

    let created = calls(&log)
        .into_iter()
        .find_map(|call| match call {
            Call::CreateEmployee(employee) => Some(employee),
            _ => None,
        })
        .expect("employee created");
    assert_eq!(created.email, "sandbox@example.com");
    assert_eq!(created.work.site, "London");
    assert_eq!(created.work.start_date, start);
}

#[tokio::test]
async fn stages_check_their_preconditions() {
    let log = CallLog::default();
    let pipeline = healthy_pipeline(&log);
    let mut run = PipelineRun::new(&hire_event());

    assert_eq!(
        pipeline.create_employee(&mut run).await,
        Err(IntegrationError::DataIntegrity(
            DataIntegrityError::ApplicantNotFetched
        ))
    );

    pipeline
        .fetch_application(&mut run)
        .await
        .expect("fetch succeeds");
    assert_eq!(
        pipeline.upload_cv(&mut run).await,
        Err(IntegrationError::DataIntegrity(
            DataIntegrityError::EmployeeNotCreated
        ))
    );
    assert_eq!(
        pipeline.update_application(&mut run).await,
        Err(IntegrationError::DataIntegrity(
            DataIntegrityError::EmployeeNotCreated
        ))
    );
    assert_eq!(creation_count(&log), 0);
}

#[tokio::test]
async fn terminal_runs_do_not_advance() {
    let log = CallLog::default();
    let pipeline = healthy_pipeline(&log);

    let mut run = pipeline.run(HireEvent::new("42")).await;
    let before = calls(&log).len();

    assert!(!pipeline.advance(&mut run).await);
    assert_eq!(calls(&log).len(), before);
    assert_eq!(run.state(), RunState::Commented);
}

#[tokio::test]
async fn summary_reports_failed_stage() {
    let log = CallLog::default();
    let pipeline = pipeline(
        FakeSource::new(&log, resource_without_cv()),
        FakeSink::new(&log),
    );

    let run = pipeline.run(hire_event()).await;
    let summary = serde_json::to_value(run.summary()).expect("summary serializes");

    assert_eq!(summary["application_id"], "42");
    assert_eq!(summary["state"], "failed");
    assert_eq!(summary["failed_stage"], "upload_cv");
    assert_eq!(summary["employee_id"], "emp-7");
    assert_eq!(summary["errors"][0]["stage"], "upload_cv");
}

#[test]
fn default_policy_starts_thirty_days_out() {
    let today = chrono::NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date");
    let policy = EmployeePolicy::starting_after(today);

    assert_eq!(policy.site, "New York (Demo)");
    assert_eq!(
        policy.start_date,
        chrono::NaiveDate::from_ymd_opt(2026, 11, 18).expect("valid date")
    );
}

#[test]
fn states_map_to_their_next_stage() {
    assert_eq!(RunState::Start.next_stage(), Some(Stage::Fetch));
    assert_eq!(RunState::Fetched.next_stage(), Some(Stage::CreateEmployee));
    assert_eq!(RunState::EmployeeCreated.next_stage(), Some(Stage::UploadCv));
    assert_eq!(
        RunState::CvUploaded.next_stage(),
        Some(Stage::UpdateApplication)
    );
    assert_eq!(RunState::Commented.next_stage(), None);
    assert_eq!(RunState::Failed(Stage::Fetch).next_stage(), None);
}
