use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use super::models::*;
use crate::application::ports::{CodeSearch, ContentSource, RunHistorySource};
use crate::config::constants::{RATE_LIMIT_RETRY_DELAY, USER_AGENT};

/// Outcome of a single contents API round-trip
#[derive(Debug)]
enum ContentFetch {
    Found(Content),
    RateLimited,
    Unavailable(StatusCode),
}

#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    token: String,
    base_url: String,
    retry_delay: Duration,
}

impl GitHubClient {
    pub fn new(token: String, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token,
            base_url: base_url.into(),
            retry_delay: RATE_LIMIT_RETRY_DELAY,
        }
    }

    /// Override the delay before re-attempting a rate-limited fetch
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github.v3+json")
    }

    /// Search code across all public repositories
    pub async fn search_code(&self, query: &str, sort: &str, per_page: u32) -> Result<CodeSearchResult> {
        let url = format!("{}/search/code", self.base_url);
        let per_page = per_page.to_string();
        let response = self
            .get(&url)
            .query(&[("q", query), ("sort", sort), ("per_page", per_page.as_str())])
            .send()
            .await
            .context("Failed to reach code search API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            return Err(anyhow!("GitHub API error ({}): {}", status, body));
        }

        Ok(response.json().await?)
    }

    /// Get a file or directory listing at a revision
    ///
    /// A 429 is retried once after `retry_delay`. Anything else that is not a
    /// 200 with a readable body comes back as `None`.
    pub async fn get_content(&self, request: &ContentRequest) -> Option<Content> {
        let mut retried = false;

        loop {
            match self.fetch_content(request).await {
                Ok(ContentFetch::Found(content)) => return Some(content),
                Ok(ContentFetch::RateLimited) if !retried => {
                    warn!("429 retrying {}/{}/{}", request.owner, request.repo, request.path);
                    tokio::time::sleep(self.retry_delay).await;
                    retried = true;
                }
                Ok(ContentFetch::RateLimited) => {
                    debug!("Still rate limited, giving up on {}", request.path);
                    return None;
                }
                Ok(ContentFetch::Unavailable(status)) => {
                    debug!("Content {} unavailable ({})", request.path, status);
                    return None;
                }
                Err(e) => {
                    debug!("Content {} fetch failed: {:#}", request.path, e);
                    return None;
                }
            }
        }
    }

    async fn fetch_content(&self, request: &ContentRequest) -> Result<ContentFetch> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_url,
            request.owner,
            request.repo,
            request.path.trim_start_matches('/')
        );
        let response = self
            .get(&url)
            .query(&[("ref", request.git_ref.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(ContentFetch::RateLimited);
        }
        if status != StatusCode::OK {
            return Ok(ContentFetch::Unavailable(status));
        }

        let body: ContentsResponse = response.json().await?;
        Ok(ContentFetch::Found(match body {
            ContentsResponse::Directory(entries) => Content::Directory(entries),
            ContentsResponse::File(entry) => Content::File(decode_file(entry)),
        }))
    }

    /// List workflow runs for a repository
    pub async fn list_workflow_runs(&self, owner: &str, repo: &str, per_page: u32) -> Result<WorkflowRunsPage> {
        let url = format!("{}/repos/{}/{}/actions/runs", self.base_url, owner, repo);
        let response = self
            .get(&url)
            .query(&[("per_page", per_page.to_string())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            return Err(anyhow!("GitHub API error ({}): {}", status, body));
        }

        Ok(response.json().await?)
    }
}

/// Decode a base64 file body and parse it as structured data
///
/// `.json` files go through serde_json, everything else through YAML.
pub(crate) fn decode_file(entry: ContentEntry) -> FileContent {
    let text = match (entry.content.as_deref(), entry.encoding.as_deref()) {
        (Some(raw), Some("base64")) => {
            let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
            STANDARD
                .decode(compact)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
        }
        (Some(raw), _) => Some(raw.to_string()),
        (None, _) => None,
    };

    let document = match (&text, entry.encoding.as_deref()) {
        (Some(text), Some("base64")) => parse_document(&entry.name, text),
        _ => None,
    };

    FileContent {
        name: entry.name,
        path: entry.path,
        text,
        document,
    }
}

fn parse_document(name: &str, text: &str) -> Option<serde_yaml::Value> {
    if name.to_lowercase().ends_with(".json") {
        if let Ok(value) = serde_json::from_str::<serde_yaml::Value>(text) {
            return Some(value);
        }
    }
    serde_yaml::from_str(text).ok()
}

#[async_trait]
impl CodeSearch for GitHubClient {
    async fn search_code(&self, query: &str, sort: &str, per_page: u32) -> Result<Vec<CodeSearchItem>> {
        let result = GitHubClient::search_code(self, query, sort, per_page).await?;
        if result.incomplete_results {
            warn!("Code search returned incomplete results ({} total)", result.total_count);
        }
        Ok(result.items)
    }
}

#[async_trait]
impl ContentSource for GitHubClient {
    async fn get_content(&self, request: &ContentRequest) -> Option<Content> {
        GitHubClient::get_content(self, request).await
    }
}

#[async_trait]
impl RunHistorySource for GitHubClient {
    async fn list_workflow_runs(&self, owner: &str, repo: &str, per_page: u32) -> Result<Vec<WorkflowRun>> {
        let page = GitHubClient::list_workflow_runs(self, owner, repo, per_page).await?;
        Ok(page.workflow_runs)
    }
}
