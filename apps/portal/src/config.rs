use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use client_core::{RemoteStoreConfig, DEFAULT_SUBMITTER};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub write_endpoint: String,
    pub export_url: Option<String>,
    pub submitted_by: String,
    pub request_timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            write_endpoint: "http://127.0.0.1:8080/exec".into(),
            export_url: None,
            submitted_by: DEFAULT_SUBMITTER.into(),
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    write_endpoint: Option<String>,
    export_url: Option<String>,
    submitted_by: Option<String>,
    request_timeout_seconds: Option<u64>,
}

pub fn load_settings(path: &Path) -> Settings {
    load_settings_with(path, |key| std::env::var(key).ok())
}

/// Defaults, then the TOML file if it parses, then environment overrides.
pub(crate) fn load_settings_with(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.write_endpoint {
                    settings.write_endpoint = v;
                }
                if let Some(v) = file_cfg.export_url {
                    settings.export_url = Some(v);
                }
                if let Some(v) = file_cfg.submitted_by {
                    settings.submitted_by = v;
                }
                if let Some(v) = file_cfg.request_timeout_seconds {
                    settings.request_timeout_seconds = v;
                }
            }
            Err(err) => {
                tracing::warn!("ignoring unreadable settings file {}: {err}", path.display());
            }
        }
    }

    if let Some(v) = env("PORTAL_WRITE_ENDPOINT") {
        settings.write_endpoint = v;
    }
    if let Some(v) = env("APP__WRITE_ENDPOINT") {
        settings.write_endpoint = v;
    }

    if let Some(v) = env("PORTAL_EXPORT_URL") {
        settings.export_url = Some(v);
    }
    if let Some(v) = env("APP__EXPORT_URL") {
        settings.export_url = Some(v);
    }

    if let Some(v) = env("APP__SUBMITTED_BY") {
        settings.submitted_by = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECONDS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_seconds = parsed;
        }
    }

    settings
}

impl Settings {
    /// Validates the endpoint URLs. A blank export URL means "query endpoint only".
    pub fn client_config(&self) -> anyhow::Result<RemoteStoreConfig> {
        let mut config = RemoteStoreConfig::new(&self.write_endpoint)
            .with_context(|| format!("invalid write endpoint '{}'", self.write_endpoint))?
            .with_submitter(self.submitted_by.clone())
            .with_request_timeout(Duration::from_secs(self.request_timeout_seconds));

        if let Some(export_url) = self.export_url.as_deref().filter(|url| !url.trim().is_empty()) {
            config = config
                .with_export_url(export_url)
                .with_context(|| format!("invalid export url '{export_url}'"))?;
        }
        Ok(config)
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
