pub mod constants;

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use constants::*;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Report job configuration, loaded from the process environment
#[derive(Clone)]
pub struct ReportConfig {
    pub github_token: String,
    pub sendgrid_api_key: String,
    pub github_api_url: String,
    pub sendgrid_api_url: String,
    pub email_to: String,
    pub email_from: String,
    pub interval: Duration,
    pub run_once: bool,
    pub log_dir: Option<PathBuf>,
}

impl std::fmt::Debug for ReportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportConfig")
            .field("github_token", &redact(&self.github_token))
            .field("sendgrid_api_key", &redact(&self.sendgrid_api_key))
            .field("github_api_url", &self.github_api_url)
            .field("sendgrid_api_url", &self.sendgrid_api_url)
            .field("email_to", &self.email_to)
            .field("email_from", &self.email_from)
            .field("interval", &self.interval)
            .field("run_once", &self.run_once)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl ReportConfig {
    /// Load config from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load config through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let optional = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let github_token = required(GITHUB_PAT_ENV)?;
        let sendgrid_api_key = required(SENDGRID_API_KEY_ENV)?;

        let interval_hours = match lookup(INTERVAL_HOURS_ENV).filter(|v| !v.trim().is_empty()) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(hours) if hours > 0 => hours,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: INTERVAL_HOURS_ENV,
                        value: raw,
                    })
                }
            },
            None => DEFAULT_INTERVAL_HOURS,
        };

        let run_once = match lookup(RUN_ONCE_ENV) {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::Invalid {
                name: RUN_ONCE_ENV,
                value: raw,
            })?,
            None => false,
        };

        Ok(Self {
            github_token,
            sendgrid_api_key,
            github_api_url: optional(GITHUB_API_URL_ENV, GITHUB_API_URL)
                .trim_end_matches('/')
                .to_string(),
            sendgrid_api_url: optional(SENDGRID_API_URL_ENV, SENDGRID_API_URL)
                .trim_end_matches('/')
                .to_string(),
            email_to: optional(EMAIL_TO_ENV, DEFAULT_EMAIL_TO),
            email_from: optional(EMAIL_FROM_ENV, DEFAULT_EMAIL_FROM),
            interval: Duration::from_secs(interval_hours * 60 * 60),
            run_once,
            log_dir: lookup(LOG_DIR_ENV)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn redact(secret: &str) -> String {
    let prefix: String = secret.chars().take(4).collect();
    format!("{}***", prefix)
}
