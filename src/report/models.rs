use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use super::run_history::RunSummary;
use crate::github::{CodeSearchItem, Framework, MarkerFiles};

static REF_PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bref=([0-9a-z]+)").expect("valid ref pattern"));
static REPO_IN_HTML_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https://.+?/(.+?/.+?)/").expect("valid repository url pattern"));

/// Revision carried by a search hit's API url (`...?ref=<sha>`)
pub fn parse_ref(url: &str) -> Option<String> {
    REF_PARAM
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoIdentity {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Pending,
    /// All steps ran; diagnostics may still have been recorded
    Analyzed,
    /// A step failed and the rest were abandoned
    Errored,
    /// Same repository as the item right before it
    Skipped,
}

/// What was learned about one workflow file
#[derive(Debug, Clone, Default)]
pub struct AnalysisInfo {
    pub errors: Vec<String>,
    /// Most recent first
    pub runs: Vec<RunSummary>,
    pub app_location: Option<String>,
    pub api_location: Option<String>,
    pub markers: MarkerFiles,
    pub latest_created_at: Option<DateTime<Utc>>,
    framework: Option<Framework>,
}

impl AnalysisInfo {
    pub fn framework(&self) -> Option<Framework> {
        self.framework
    }

    /// Record the classification; the first one sticks
    pub fn set_framework(&mut self, framework: Framework) {
        if self.framework.is_none() {
            self.framework = Some(framework);
        }
    }

    pub fn framework_label(&self) -> &'static str {
        self.framework.map_or("undefined", |f| f.label())
    }

    pub fn latest_run(&self) -> Option<&RunSummary> {
        self.runs.first()
    }
}

/// One code search hit and its analysis
#[derive(Debug, Clone)]
pub struct WorkflowMatch {
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub url: String,
    pub html_url: String,
    pub status: ItemStatus,
    pub info: AnalysisInfo,
}

impl WorkflowMatch {
    pub fn identity(&self) -> RepoIdentity {
        RepoIdentity {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
        }
    }

    pub fn git_ref(&self) -> Option<String> {
        parse_ref(&self.url)
    }

    /// `owner/repo` as shown in the html url
    pub fn display_name(&self) -> String {
        REPO_IN_HTML_URL
            .captures(&self.html_url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| self.identity().to_string())
    }

    pub fn is_skipped(&self) -> bool {
        self.status == ItemStatus::Skipped
    }
}

impl From<CodeSearchItem> for WorkflowMatch {
    fn from(item: CodeSearchItem) -> Self {
        Self {
            owner: item.repository.owner.login,
            repo: item.repository.name,
            path: item.path,
            url: item.url,
            html_url: item.html_url,
            status: ItemStatus::Pending,
            info: AnalysisInfo::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow(html_url: &str, url: &str) -> WorkflowMatch {
        WorkflowMatch {
            owner: "octo".to_string(),
            repo: "site".to_string(),
            path: ".github/workflows/deploy.yml".to_string(),
            url: url.to_string(),
            html_url: html_url.to_string(),
            status: ItemStatus::Pending,
            info: AnalysisInfo::default(),
        }
    }

    #[test]
    fn test_parse_ref() {
        let url = "https://api.github.com/repositories/1/contents/.github/workflows/a.yml?ref=0f3a9c1e";
        assert_eq!(parse_ref(url).as_deref(), Some("0f3a9c1e"));
        assert_eq!(parse_ref("https://api.github.com/repositories/1/contents/a.yml"), None);
        assert_eq!(parse_ref("https://x/contents/a.yml?href=abc"), None);
    }

    #[test]
    fn test_display_name_from_html_url() {
        let item = workflow("https://github.com/Octo-Org/my.site/blob/abc/.github/workflows/a.yml", "");
        assert_eq!(item.display_name(), "Octo-Org/my.site");

        let fallback = workflow("not a url", "");
        assert_eq!(fallback.display_name(), "octo/site");
    }

    #[test]
    fn test_framework_is_set_once() {
        let mut info = AnalysisInfo::default();
        assert_eq!(info.framework_label(), "undefined");

        info.set_framework(Framework::Hugo);
        info.set_framework(Framework::React);
        assert_eq!(info.framework(), Some(Framework::Hugo));
        assert_eq!(info.framework_label(), "hugo");
    }
}
