use std::{fs, io::ErrorKind, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

const DEFAULT_CONFIG_FILE: &str = "server.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: String,
    pub backend_url: String,
    pub cors_origins: Vec<String>,
    pub surface_id: String,
    pub request_timeout_secs: u64,
    pub page_size: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".into(),
            backend_url: "http://localhost:3000".into(),
            cors_origins: vec![
                "http://localhost:5173".into(),
                "http://localhost:8080".into(),
            ],
            surface_id: server_api::DEFAULT_SURFACE_ID.into(),
            request_timeout_secs: 30,
            page_size: server_api::DEFAULT_PAGE_SIZE,
        }
    }
}

impl Settings {
    /// Never below one second; a zero timeout would fail every backend call.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// `server.toml` keys; all optional, absent keys keep their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    bind_addr: Option<String>,
    backend_url: Option<String>,
    cors_origins: Option<Vec<String>>,
    surface_id: Option<String>,
    request_timeout_secs: Option<u64>,
    page_size: Option<i64>,
}

/// Defaults, then the config file, then the process environment.
///
/// An explicitly given file must exist; the default `server.toml` is
/// optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match config_path {
        Some(path) => (path, true),
        None => (Path::new(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg = parse_file(&raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
            apply_file(&mut settings, file_cfg);
        }
        Err(err) if err.kind() == ErrorKind::NotFound && !required => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn parse_file(raw: &str) -> anyhow::Result<FileSettings> {
    Ok(toml::from_str(raw)?)
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.bind_addr {
        settings.bind_addr = v;
    }
    if let Some(v) = file_cfg.backend_url {
        settings.backend_url = v;
    }
    if let Some(v) = file_cfg.cors_origins {
        settings.cors_origins = v;
    }
    if let Some(v) = file_cfg.surface_id {
        settings.surface_id = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = file_cfg.page_size {
        settings.page_size = v;
    }
}

/// Environment overrides read through `var`. Later keys win over earlier
/// ones for the same setting.
fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    let host = var("HOST");
    let port = var("PORT");
    if host.is_some() || port.is_some() {
        let (current_host, current_port) = settings
            .bind_addr
            .rsplit_once(':')
            .unwrap_or((settings.bind_addr.as_str(), "8080"));
        settings.bind_addr = format!(
            "{}:{}",
            host.as_deref().unwrap_or(current_host),
            port.as_deref().unwrap_or(current_port)
        );
    }
    if let Some(v) = var("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }

    if let Some(v) = var("BACKEND_URL") {
        settings.backend_url = v;
    }
    if let Some(v) = var("APP__BACKEND_URL") {
        settings.backend_url = v;
    }

    if let Some(v) = var("CORS_ORIGINS") {
        match parse_origins(&v) {
            Some(origins) => settings.cors_origins = origins,
            None => warn!(value = %v, "ignoring malformed CORS_ORIGINS"),
        }
    }

    if let Some(v) = var("APP__SURFACE_ID") {
        settings.surface_id = v;
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(_) => warn!(value = %v, "ignoring non-numeric APP__REQUEST_TIMEOUT_SECS"),
        }
    }
    if let Some(v) = var("APP__PAGE_SIZE") {
        match v.parse::<i64>() {
            Ok(parsed) => settings.page_size = parsed,
            Err(_) => warn!(value = %v, "ignoring non-numeric APP__PAGE_SIZE"),
        }
    }
}

/// A JSON array of strings, or a comma-separated list.
fn parse_origins(raw: &str) -> Option<Vec<String>> {
    let raw = raw.trim();
    if raw.starts_with('[') {
        return serde_json::from_str(raw).ok();
    }
    Some(
        raw.split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
