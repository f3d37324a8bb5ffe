use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::gateway::{ClientBuildError, UpstreamError, UpstreamFailure};

/// Shared reqwest plumbing for the Pinpoint and HiBob clients.
#[derive(Debug, Clone)]
pub(crate) struct UpstreamHttp {
    client: Client,
    base_url: Url,
}

impl UpstreamHttp {
    /// `credential` is installed as a default header and marked sensitive.
    pub(crate) fn new(
        name: &'static str,
        base_url: &str,
        credential: (HeaderName, String),
        timeout: Duration,
    ) -> Result<Self, ClientBuildError> {
        let base_url = parse_base_url(name, base_url)?;

        let (header_name, header_value) = credential;
        let mut value = HeaderValue::from_str(&header_value)
            .map_err(|_| ClientBuildError::InvalidCredential { client: name })?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header_name, value);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| ClientBuildError::Http(err.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Join path segments onto the base url, percent-encoding each one.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub(crate) fn get(&self, url: Url) -> RequestBuilder {
        self.client.get(url)
    }

    pub(crate) fn post(&self, url: Url) -> RequestBuilder {
        self.client.post(url)
    }
}

fn parse_base_url(name: &'static str, raw: &str) -> Result<Url, ClientBuildError> {
    let invalid = || ClientBuildError::InvalidBaseUrl {
        client: name,
        url: raw.to_string(),
    };

    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    Ok(url)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OperationKind {
    Fetch,
    Write,
}

/// Names a single upstream call so failures carry their context.
#[derive(Debug, Clone)]
pub(crate) struct UpstreamOperation {
    kind: OperationKind,
    resource: String,
}

impl UpstreamOperation {
    pub(crate) fn fetch(resource: impl Into<String>) -> Self {
        Self {
            kind: OperationKind::Fetch,
            resource: resource.into(),
        }
    }

    pub(crate) fn write(resource: impl Into<String>) -> Self {
        Self {
            kind: OperationKind::Write,
            resource: resource.into(),
        }
    }

    pub(crate) fn failed(&self, failure: UpstreamFailure) -> UpstreamError {
        let resource = self.resource.clone();
        match self.kind {
            OperationKind::Fetch => UpstreamError::Fetch { resource, failure },
            OperationKind::Write => UpstreamError::Write { resource, failure },
        }
    }

    /// Send the request and return the raw body of a 2xx response.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<String, UpstreamError> {
        let response = request
            .send()
            .await
            .map_err(|err| self.failed(UpstreamFailure::Transport(err.to_string())))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.failed(UpstreamFailure::Transport(err.to_string())))?;

        debug!(resource = %self.resource, status = status.as_u16(), "upstream responded");

        if !status.is_success() {
            return Err(self.failed(UpstreamFailure::Status {
                status: status.as_u16(),
                body,
            }));
        }

        Ok(body)
    }

    pub(crate) fn decode<T: DeserializeOwned>(&self, body: &str) -> Result<T, UpstreamError> {
        serde_json::from_str(body)
            .map_err(|err| self.failed(UpstreamFailure::Decode(err.to_string())))
    }
}
