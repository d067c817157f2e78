use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::Context;
use url::Url;

pub const SETTINGS_FILE: &str = "claim_desk.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub adjudication_url: String,
    pub request_timeout_secs: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            adjudication_url: "http://localhost:5000/api/process-claim".into(),
            request_timeout_secs: 30,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn endpoint(&self) -> anyhow::Result<Url> {
        Url::parse(self.adjudication_url.trim()).with_context(|| {
            format!(
                "invalid adjudication url '{}'",
                self.adjudication_url
            )
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Defaults, then `claim_desk.toml` in the working directory, then the
/// environment. Problems found on the way come back as warnings so the
/// caller can log them once tracing is installed.
pub fn load_settings() -> (Settings, Vec<String>) {
    let mut settings = Settings::default();
    let mut warnings = Vec::new();
    if let Ok(raw) = fs::read_to_string(Path::new(SETTINGS_FILE)) {
        if let Err(err) = apply_file(&mut settings, &raw) {
            warnings.push(format!("ignoring {SETTINGS_FILE}: {err:#}"));
        }
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());
    (settings, warnings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, String>>(raw)
        .context("expected a flat table of strings")?;
    if let Some(v) = file_cfg.get("adjudication_url") {
        settings.adjudication_url = v.clone();
    }
    if let Some(secs) = file_cfg.get("request_timeout_secs").and_then(|v| parse_timeout(v)) {
        settings.request_timeout_secs = secs;
    }
    if let Some(v) = file_cfg.get("log_filter") {
        settings.log_filter = v.clone();
    }
    Ok(())
}

/// Whole seconds, at least one.
fn parse_timeout(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|secs| *secs > 0)
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("ADJUDICATION_URL") {
        settings.adjudication_url = v;
    }
    if let Some(v) = lookup("APP__ADJUDICATION_URL") {
        settings.adjudication_url = v;
    }

    if let Some(secs) = lookup("APP__REQUEST_TIMEOUT_SECS").and_then(|v| parse_timeout(&v)) {
        settings.request_timeout_secs = secs;
    }

    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
