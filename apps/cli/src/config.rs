use std::{collections::HashMap, path::Path, time::Duration};

use anyhow::{bail, Context};
use client_core::SESSION_TOKEN_KEY;
use config::{Config, Environment, File};
use serde::Deserialize;

const CONFIG_FILE: &str = "fh";
const ENV_PREFIX: &str = "FH";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
    pub database_url: String,
    pub token_key: String,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000/api".into(),
            database_url: "sqlite://./data/fh.db".into(),
            token_key: SESSION_TOKEN_KEY.into(),
            request_timeout_secs: 60,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Defaults, then `fh.toml` (or any format `config` recognises) in the
/// working directory, then `FH__*` environment variables.
pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from(Path::new(CONFIG_FILE), None)
}

fn load_settings_from(
    file: &Path,
    env: Option<HashMap<String, String>>,
) -> anyhow::Result<Settings> {
    let defaults = Settings::default();
    let settings: Settings = Config::builder()
        .set_default("api_base_url", defaults.api_base_url)?
        .set_default("database_url", defaults.database_url)?
        .set_default("token_key", defaults.token_key)?
        .set_default("request_timeout_secs", defaults.request_timeout_secs)?
        .add_source(File::from(file).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(env),
        )
        .build()
        .context("failed to load fh settings")?
        .try_deserialize()
        .context("invalid fh settings")?;

    if settings.token_key.trim().is_empty() {
        bail!("token_key must not be empty");
    }
    Ok(settings)
}

/// Returns a URL sqlx can open. The parent directory is created when the
/// store is opened.
pub fn prepare_database_url(raw_database_url: &str) -> anyhow::Result<String> {
    let database_url = normalize_database_url(raw_database_url);
    if database_url.starts_with("sqlite:") {
        Ok(database_url)
    } else {
        bail!("unsupported database url '{database_url}'; only sqlite is supported")
    }
}

fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:") {
        return raw_database_url.to_string();
    }

    let path = if let Some(path) = raw_database_url.strip_prefix("sqlite://") {
        path
    } else if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        path
    } else if raw_database_url.contains("://") {
        return raw_database_url.to_string();
    } else {
        raw_database_url
    };

    let path = path.replace('\\', "/");
    // Drive-letter paths only parse in the single-colon form.
    if has_drive_prefix(&path) {
        format!("sqlite:{path}")
    } else {
        format!("sqlite://{path}")
    }
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/'
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
