use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error body returned by the assessment service on non-2xx responses.
///
/// `detail` is either a human-readable string or, for request validation
/// failures, a list of objects carrying a `msg` field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorEnvelope {
    pub fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
            Value::Array(items) => {
                let messages = items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(text) => Some(text.as_str()),
                        other => other.get("msg").and_then(Value::as_str),
                    })
                    .collect::<Vec<_>>();
                (!messages.is_empty()).then(|| messages.join("; "))
            }
            _ => None,
        }
    }
}
