use async_trait::async_trait;
use reqwest::header::HeaderName;
use serde::Deserialize;
use serde_json::{json, Value};

use super::domain::{ApplicantRecord, ApplicationId};
use super::gateway::{
    ApplicantSource, ApplicationComment, ClientBuildError, IntegrationError, UpstreamError,
};
use super::http::{UpstreamHttp, UpstreamOperation};
use crate::config::PinpointConfig;

const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Pinpoint API client authenticated with a static API key.
#[derive(Debug, Clone)]
pub struct PinpointClient {
    http: UpstreamHttp,
}

/// JSON:API top-level document; only the primary resource is read.
#[derive(Debug, Deserialize)]
struct ResourceDocument {
    data: Value,
}

impl PinpointClient {
    pub fn new(config: &PinpointConfig) -> Result<Self, ClientBuildError> {
        let http = UpstreamHttp::new(
            "pinpoint",
            &config.base_url,
            (API_KEY_HEADER, config.api_key.expose().to_string()),
            config.timeout,
        )?;
        Ok(Self { http })
    }
}

/// Request body creating a comment on an application.
pub(crate) fn comment_payload(comment: &ApplicationComment) -> Value {
    json!({
        "data": {
            "type": "comments",
            "attributes": {
                "body_text": comment.body_text,
            },
            "relationships": {
                "commentable": {
                    "data": {
                        "type": "applications",
                        "id": comment.application_id.0,
                    }
                }
            }
        }
    })
}

#[async_trait]
impl ApplicantSource for PinpointClient {
    async fn fetch_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicantRecord, IntegrationError> {
        let operation = UpstreamOperation::fetch(format!("pinpoint application {application_id}"));
        let url = self.http.endpoint(&["applications", &application_id.0]);
        let request = self
            .http
            .get(url)
            .query(&[("extra_fields[applications]", "attachments")]);

        let body = operation.send(request).await?;
        let document: ResourceDocument = operation.decode(&body)?;
        Ok(ApplicantRecord::from_resource(document.data)?)
    }

    async fn post_comment(&self, comment: &ApplicationComment) -> Result<(), UpstreamError> {
        let operation = UpstreamOperation::write(format!(
            "pinpoint comment on application {}",
            comment.application_id
        ));
        let url = self.http.endpoint(&["comments"]);
        let request = self.http.post(url).json(&comment_payload(comment));

        operation.send(request).await?;
        Ok(())
    }
}
