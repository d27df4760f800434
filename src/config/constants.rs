use std::time::Duration;

pub const GITHUB_API_URL: &str = "https://api.github.com";
pub const SENDGRID_API_URL: &str = "https://api.sendgrid.com";
pub const USER_AGENT: &str = "swa-workflow-report";

/// Code search query: deploy action reference plus a language filter.
pub const SEARCH_QUERY: &str = "Azure/static-web-apps-deploy language:YAML";
pub const SEARCH_SORT: &str = "indexed";
pub const SEARCH_PAGE_SIZE: u32 = 120;

pub const RUN_HISTORY_PAGE_SIZE: u32 = 100;

/// Delay before the single re-attempt of a rate-limited content fetch.
pub const RATE_LIMIT_RETRY_DELAY: Duration = Duration::from_secs(2);

pub const DEPLOY_JOB_NAME: &str = "build_and_deploy_job";
pub const DEPLOY_ACTION: &str = "Azure/static-web-apps-deploy";

pub const DEFAULT_EMAIL_TO: &str = "swa-reports@example.com";
pub const DEFAULT_EMAIL_FROM: &str = "swa-report-bot@example.com";
pub const EMAIL_SUBJECT: &str = "Static Web Apps - daily GitHub workflows report";

pub const DEFAULT_INTERVAL_HOURS: u64 = 24;

pub const GITHUB_PAT_ENV: &str = "GITHUB_PAT";
pub const SENDGRID_API_KEY_ENV: &str = "SENDGRID_API_KEY";
pub const EMAIL_TO_ENV: &str = "REPORT_EMAIL_TO";
pub const EMAIL_FROM_ENV: &str = "REPORT_EMAIL_FROM";
pub const INTERVAL_HOURS_ENV: &str = "REPORT_INTERVAL_HOURS";
pub const RUN_ONCE_ENV: &str = "REPORT_RUN_ONCE";
pub const LOG_DIR_ENV: &str = "REPORT_LOG_DIR";
pub const GITHUB_API_URL_ENV: &str = "GITHUB_API_URL";
pub const SENDGRID_API_URL_ENV: &str = "SENDGRID_API_URL";
