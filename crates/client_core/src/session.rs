use std::sync::Arc;

use storage::KeyValueStore;
use tracing::{info, warn};

use crate::api::AssessmentApi;

/// Persistence slot holding the bearer token between runs.
pub const SESSION_TOKEN_KEY: &str = "fh_token";

/// Identity of the session a request was issued under.
///
/// The generation moves on every `establish` and `clear`, so a logout
/// followed by a login with the same token still invalidates old tickets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTicket {
    generation: u64,
    token: Option<String>,
}

impl SessionTicket {
    pub fn has_session(&self) -> bool {
        self.token.is_some()
    }
}

/// Sole owner of the session token. Every mutation also updates the API
/// client's authorization header before returning.
pub struct SessionStore {
    token: Option<String>,
    generation: u64,
    key: String,
    persistence: Arc<dyn KeyValueStore>,
    api: Arc<dyn AssessmentApi>,
}

impl SessionStore {
    pub fn new(persistence: Arc<dyn KeyValueStore>, api: Arc<dyn AssessmentApi>) -> Self {
        Self {
            token: None,
            generation: 0,
            key: SESSION_TOKEN_KEY.to_string(),
            persistence,
            api,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Loads a persisted token, if any. Returns whether a session is now active.
    pub async fn restore(&mut self) -> bool {
        let persisted = match self.persistence.get(&self.key).await {
            Ok(value) => value.filter(|token| !token.is_empty()),
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to read persisted session; starting signed out");
                None
            }
        };

        self.generation += 1;
        self.api.set_auth_token(persisted.as_deref());
        self.token = persisted;

        if self.token.is_some() {
            info!("restored persisted session");
        }
        self.token.is_some()
    }

    pub async fn establish(&mut self, token: String) {
        self.generation += 1;
        self.api.set_auth_token(Some(&token));
        self.token = Some(token.clone());
        if let Err(err) = self.persistence.set(&self.key, &token).await {
            warn!(key = %self.key, error = %err, "failed to persist session; it will not survive a restart");
        }
        info!("session established");
    }

    pub async fn clear(&mut self) {
        self.generation += 1;
        self.token = None;
        self.api.set_auth_token(None);
        if let Err(err) = self.persistence.remove(&self.key).await {
            warn!(key = %self.key, error = %err, "failed to remove persisted session");
        }
        info!("session cleared");
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn has_session(&self) -> bool {
        self.token.is_some()
    }

    pub fn ticket(&self) -> SessionTicket {
        SessionTicket {
            generation: self.generation,
            token: self.token.clone(),
        }
    }

    pub fn is_current(&self, ticket: &SessionTicket) -> bool {
        ticket.generation == self.generation && ticket.token == self.token
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
