use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use client_core::cookie::{get_cookie, CSRF_COOKIE};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "complaint_desk.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    /// Cookie string the page would see, e.g. `sessionid=...; csrftoken=...`.
    pub cookie: String,
    pub csrf_token: Option<String>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            cookie: String::new(),
            csrf_token: None,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn page_cookie(&self) -> String {
        let Some(token) = self.csrf_token.as_deref().filter(|token| !token.is_empty()) else {
            return self.cookie.clone();
        };
        if get_cookie(&self.cookie, CSRF_COOKIE).is_some() {
            return self.cookie.clone();
        }
        if self.cookie.trim().is_empty() {
            format!("{CSRF_COOKIE}={token}")
        } else {
            format!("{}; {CSRF_COOKIE}={token}", self.cookie.trim_end_matches(&[';', ' '][..]))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    server_url: Option<String>,
    cookie: Option<String>,
    csrf_token: Option<String>,
    log_filter: Option<String>,
}

/// Defaults, then the config file, then environment variables.
pub fn load_settings(explicit_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match explicit_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    if required || path.exists() {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?;
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.cookie {
        settings.cookie = v;
    }
    if let Some(v) = file_cfg.csrf_token {
        settings.csrf_token = Some(v);
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("COMPLAINT_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = lookup("COMPLAINT_COOKIE") {
        settings.cookie = v;
    }
    if let Some(v) = lookup("APP__COOKIE") {
        settings.cookie = v;
    }

    if let Some(v) = lookup("CSRF_TOKEN") {
        settings.csrf_token = Some(v);
    }
    if let Some(v) = lookup("APP__CSRF_TOKEN") {
        settings.csrf_token = Some(v);
    }

    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
