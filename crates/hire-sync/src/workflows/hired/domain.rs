use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Attachment context Pinpoint assigns to the candidate's PDF CV.
pub const CV_ATTACHMENT_CONTEXT: &str = "pdf_cv";

/// Identifier of an application in Pinpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier HiBob assigns to a newly created employee.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inbound notification that an application was moved to hired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HireEvent {
    application_id: ApplicationId,
}

impl HireEvent {
    pub fn new(application_id: impl Into<String>) -> Self {
        Self {
            application_id: ApplicationId(application_id.into()),
        }
    }

    pub fn application_id(&self) -> &ApplicationId {
        &self.application_id
    }
}

/// Body of the `application_hired` webhook. Only `data.application.id` is read.
#[derive(Debug, Clone, Deserialize)]
pub struct HiredWebhook {
    pub data: HiredWebhookData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HiredWebhookData {
    pub application: HiredWebhookApplication,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HiredWebhookApplication {
    #[serde(deserialize_with = "deserialize_identifier")]
    pub id: String,
}

impl From<HiredWebhook> for HireEvent {
    fn from(webhook: HiredWebhook) -> Self {
        HireEvent::new(webhook.data.application.id)
    }
}

/// File attached to a Pinpoint application.
///
/// Pinpoint sends `null` for fields it has no value for; only the CV entry
/// is required to carry a filename and url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}

impl Attachment {
    pub fn is_cv(&self) -> bool {
        self.context.as_deref() == Some(CV_ATTACHMENT_CONTEXT)
    }
}

/// Read-only view of the application fields the hire sync needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicantRecord {
    id: ApplicationId,
    first_name: String,
    last_name: String,
    email: String,
    attachments: Vec<Attachment>,
}

#[derive(Debug, Deserialize)]
struct RawApplicationResource {
    #[serde(deserialize_with = "deserialize_identifier")]
    id: String,
    attributes: RawApplicationAttributes,
    #[serde(default)]
    attachments: Option<Vec<Attachment>>,
}

#[derive(Debug, Deserialize)]
struct RawApplicationAttributes {
    first_name: String,
    last_name: String,
    email: String,
    #[serde(default)]
    attachments: Option<Vec<Attachment>>,
}

impl ApplicantRecord {
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        attachments: Vec<Attachment>,
    ) -> Self {
        Self {
            id: ApplicationId(id.into()),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            attachments,
        }
    }

    /// Build a record from the `data` member of a Pinpoint application document.
    ///
    /// Attachments are read from `attributes.attachments`, falling back to a
    /// resource-level `attachments` member when the attributes carry none.
    pub fn from_resource(resource: Value) -> Result<Self, DataIntegrityError> {
        let raw: RawApplicationResource = serde_json::from_value(resource)
            .map_err(|err| DataIntegrityError::MalformedRecord(err.to_string()))?;

        let attachments = raw
            .attributes
            .attachments
            .or(raw.attachments)
            .unwrap_or_default();

        Ok(Self {
            id: ApplicationId(raw.id),
            first_name: raw.attributes.first_name,
            last_name: raw.attributes.last_name,
            email: raw.attributes.email,
            attachments,
        })
    }

    pub fn id(&self) -> &ApplicationId {
        &self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// First attachment tagged as the PDF CV, in source order.
    pub fn cv(&self) -> Result<&Attachment, DataIntegrityError> {
        self.attachments
            .iter()
            .find(|attachment| attachment.is_cv())
            .ok_or_else(|| DataIntegrityError::MissingCvAttachment {
                application_id: self.id.clone(),
            })
    }

    pub fn cv_filename(&self) -> Result<&str, DataIntegrityError> {
        let cv = self.cv()?;
        cv_field(cv.filename.as_deref(), "filename")
    }

    pub fn cv_url(&self) -> Result<&str, DataIntegrityError> {
        let cv = self.cv()?;
        cv_field(cv.url.as_deref(), "url")
    }
}

fn cv_field<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, DataIntegrityError> {
    value.filter(|value| !value.trim().is_empty()).ok_or_else(|| {
        DataIntegrityError::MalformedRecord(format!("pdf_cv attachment has no {field}"))
    })
}

/// Expected data was missing or had the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataIntegrityError {
    #[error("application payload is malformed: {0}")]
    MalformedRecord(String),
    #[error("application {application_id} has no pdf_cv attachment")]
    MissingCvAttachment { application_id: ApplicationId },
    #[error("application has not been fetched yet")]
    ApplicantNotFetched,
    #[error("employee has not been created yet")]
    EmployeeNotCreated,
}

/// Accepts identifiers sent either as JSON strings or as JSON integers.
pub(crate) fn deserialize_identifier<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawIdentifier {
        Text(String),
        Number(u64),
    }

    match RawIdentifier::deserialize(deserializer)? {
        RawIdentifier::Text(value) if !value.trim().is_empty() => Ok(value),
        RawIdentifier::Text(_) => Err(serde::de::Error::custom("identifier must not be blank")),
        RawIdentifier::Number(value) => Ok(value.to_string()),
    }
}
