use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::warn;

use super::domain::{deserialize_identifier, EmployeeId};
use super::gateway::{ClientBuildError, HrSink, NewEmployee, SharedDocument, UpstreamError};
use super::http::{UpstreamHttp, UpstreamOperation};
use crate::config::HibobConfig;

/// HiBob API client authenticated as a service user over Basic auth.
#[derive(Debug, Clone)]
pub struct HibobClient {
    http: UpstreamHttp,
}

#[derive(Debug, Deserialize)]
struct CreatedPerson {
    #[serde(deserialize_with = "deserialize_identifier")]
    id: String,
}

/// `base64(user:password)` as sent after `Basic `.
pub fn basic_token(user_id: &str, password: &str) -> String {
    STANDARD.encode(format!("{user_id}:{password}"))
}

impl HibobClient {
    /// The Basic credential is derived here once and reused for every request.
    pub fn new(config: &HibobConfig) -> Result<Self, ClientBuildError> {
        let token = basic_token(&config.user_id, config.password.expose());
        let http = UpstreamHttp::new(
            "hibob",
            &config.base_url,
            (AUTHORIZATION, format!("Basic {token}")),
            config.timeout,
        )?;
        Ok(Self { http })
    }
}

#[async_trait]
impl HrSink for HibobClient {
    async fn create_employee(&self, employee: &NewEmployee) -> Result<EmployeeId, UpstreamError> {
        let operation = UpstreamOperation::write("hibob person");
        let url = self.http.endpoint(&["people"]);
        let request = self.http.post(url).json(employee);

        let body = operation.send(request).await?;
        let person: CreatedPerson = operation.decode(&body).inspect_err(|_| {
            warn!("hibob accepted the person but returned no usable id; the record may exist");
        })?;
        Ok(EmployeeId(person.id))
    }

    async fn upload_shared_document(
        &self,
        employee_id: &EmployeeId,
        document: &SharedDocument,
    ) -> Result<(), UpstreamError> {
        let operation =
            UpstreamOperation::write(format!("hibob shared document for employee {employee_id}"));
        let url = self
            .http
            .endpoint(&["docs", "people", &employee_id.0, "shared"]);
        let request = self.http.post(url).json(document);

        operation.send(request).await?;
        Ok(())
    }
}
