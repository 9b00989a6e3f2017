use std::{
    sync::{PoisonError, RwLock},
    time::Duration,
};

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, RequestBuilder, Response, StatusCode,
};
use shared::{
    domain::Assessment,
    error::ErrorEnvelope,
    protocol::{AccountSummary, AssessmentMeta, RegisterRequest, TokenResponse},
};
use tracing::{debug, warn};
use url::Url;

use crate::{
    error::{ClientError, ClientResult},
    upload::UploadFile,
};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Request/response boundary to the remote assessment service.
///
/// Implementations own the outgoing authorization header and nothing else;
/// the session lifecycle lives in [`crate::session::SessionStore`].
#[async_trait]
pub trait AssessmentApi: Send + Sync {
    fn set_auth_token(&self, token: Option<&str>);
    fn auth_token(&self) -> Option<String>;
    async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> ClientResult<AccountSummary>;
    async fn login(&self, email: &str, password: &str) -> ClientResult<String>;
    async fn list_assessments(&self) -> ClientResult<Vec<Assessment>>;
    async fn create_assessment(
        &self,
        meta: &AssessmentMeta,
        file: &UploadFile,
    ) -> ClientResult<Assessment>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Register,
    Login,
    ListAssessments,
    CreateAssessment,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Self::Register => "/auth/register",
            Self::Login => "/auth/token",
            Self::ListAssessments | Self::CreateAssessment => "/assessments",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Login => "login",
            Self::ListAssessments => "list_assessments",
            Self::CreateAssessment => "create_assessment",
        }
    }

    fn classify(self, status: StatusCode, detail: Option<String>) -> ClientError {
        let code = status.as_u16();
        match (self, code) {
            (_, 401 | 403) => ClientError::Auth {
                status: code,
                detail,
            },
            (Self::Register | Self::Login, 400..=499) => ClientError::Auth {
                status: code,
                detail,
            },
            (Self::CreateAssessment, 400 | 413 | 415 | 422) => ClientError::Validation {
                status: Some(code),
                detail,
            },
            _ => ClientError::Service {
                status: code,
                detail,
            },
        }
    }
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    bearer: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let parsed = Url::parse(base_url.trim())
            .map_err(|err| ClientError::Configuration(format!("bad base url '{base_url}': {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::Configuration(format!(
                "base url must start with http:// or https://, got '{base_url}'"
            )));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ClientError::Configuration(err.to_string()))?;
        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            bearer: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.auth_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, endpoint: Endpoint, request: RequestBuilder) -> ClientResult<Response> {
        debug!(endpoint = endpoint.name(), "sending request");
        let response = self.authorize(request).send().await.map_err(|err| {
            warn!(endpoint = endpoint.name(), error = %err, "request failed in transport");
            ClientError::from(err)
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(endpoint = endpoint.name(), status = status.as_u16(), "request succeeded");
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let detail = ErrorEnvelope::parse(&body).message();
        warn!(
            endpoint = endpoint.name(),
            status = status.as_u16(),
            detail = detail.as_deref().unwrap_or(""),
            "service rejected request"
        );
        Err(endpoint.classify(status, detail))
    }
}

#[async_trait]
impl AssessmentApi for ApiClient {
    fn set_auth_token(&self, token: Option<&str>) {
        let mut bearer = self.bearer.write().unwrap_or_else(PoisonError::into_inner);
        *bearer = token.map(str::to_string);
    }

    fn auth_token(&self) -> Option<String> {
        self.bearer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> ClientResult<AccountSummary> {
        let request = self
            .http
            .post(self.url(Endpoint::Register))
            .json(&RegisterRequest {
                email: email.to_string(),
                password: password.to_string(),
                full_name: full_name.map(str::to_string),
            });
        let response = self.send(Endpoint::Register, request).await?;
        Ok(response.json().await?)
    }

    async fn login(&self, email: &str, password: &str) -> ClientResult<String> {
        let request = self
            .http
            .post(self.url(Endpoint::Login))
            .form(&[("username", email), ("password", password)]);
        let response = self.send(Endpoint::Login, request).await?;
        let body: TokenResponse = response.json().await?;
        body.access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ClientError::Decode("token response has no access_token".into()))
    }

    async fn list_assessments(&self) -> ClientResult<Vec<Assessment>> {
        let request = self.http.get(self.url(Endpoint::ListAssessments));
        let response = self.send(Endpoint::ListAssessments, request).await?;
        Ok(response.json().await?)
    }

    async fn create_assessment(
        &self,
        meta: &AssessmentMeta,
        file: &UploadFile,
    ) -> ClientResult<Assessment> {
        let meta_json =
            serde_json::to_string(meta).map_err(|err| ClientError::Decode(err.to_string()))?;
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(file.content_type())
            .map_err(|err| {
                ClientError::local_validation(format!(
                    "unsupported content type '{}': {err}",
                    file.content_type()
                ))
            })?;
        let form = Form::new().text("meta", meta_json).part("file", part);

        let request = self
            .http
            .post(self.url(Endpoint::CreateAssessment))
            .multipart(form);
        let response = self.send(Endpoint::CreateAssessment, request).await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
