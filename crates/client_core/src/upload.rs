use std::path::Path;

use crate::error::{ClientError, ClientResult};

/// Extensions the front end offers in its file picker: spreadsheets,
/// tabular text and PDF exports. The service has the final say.
pub const ACCEPTED_UPLOAD_EXTENSIONS: &[&str] = &["csv", "xlsx", "pdf"];

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_guess::from_path(&file_name)
            .first()
            .map(|mime| mime.essence_str().to_string());
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }

    pub async fn read(path: &Path) -> ClientResult<Self> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ClientError::local_validation(format!("'{}' is not a file", path.display()))
            })?;
        let bytes = tokio::fs::read(path).await.map_err(|err| {
            ClientError::local_validation(format!("could not read '{}': {err}", path.display()))
        })?;
        Ok(Self::new(file_name, bytes))
    }

    pub fn content_type(&self) -> &str {
        self.mime_type.as_deref().unwrap_or(FALLBACK_MIME_TYPE)
    }
}

pub fn is_accepted_upload(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ACCEPTED_UPLOAD_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
        .unwrap_or(false)
}
