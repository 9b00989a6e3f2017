use thiserror::Error;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Rejected input: either checked locally before any request, or a
    /// 4xx from the service about the uploaded file.
    #[error("validation failed: {}", .detail.as_deref().unwrap_or("invalid input"))]
    Validation {
        status: Option<u16>,
        detail: Option<String>,
    },
    #[error("authentication rejected ({status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Auth { status: u16, detail: Option<String> },
    #[error("network failure: {0}")]
    Network(String),
    #[error("service error ({status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Service { status: u16, detail: Option<String> },
    #[error("malformed service response: {0}")]
    Decode(String),
    #[error("invalid client configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    pub fn local_validation(message: impl Into<String>) -> Self {
        Self::Validation {
            status: None,
            detail: Some(message.into()),
        }
    }

    /// Human-readable text supplied by the service (or by the local check).
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Validation { detail, .. }
            | Self::Auth { detail, .. }
            | Self::Service { detail, .. } => detail.as_deref(),
            Self::Network(_) | Self::Decode(_) | Self::Configuration(_) => None,
        }
    }

    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Validation { status: None, .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
