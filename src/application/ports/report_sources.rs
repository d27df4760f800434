use anyhow::Result;
use async_trait::async_trait;

use crate::github::models::{CodeSearchItem, Content, ContentRequest, WorkflowRun};
use crate::report::render::EmailReport;

/// Code search over hosted repositories
#[async_trait]
pub trait CodeSearch: Send + Sync {
    /// Search files matching `query`, sorted by `sort`, capped at `per_page` hits
    async fn search_code(&self, query: &str, sort: &str, per_page: u32) -> Result<Vec<CodeSearchItem>>;
}

/// File and directory lookups at a fixed revision
///
/// A failed lookup is "not found": implementations return `None` instead of an error.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn get_content(&self, request: &ContentRequest) -> Option<Content>;
}

/// Workflow run history of a repository, most recent first
#[async_trait]
pub trait RunHistorySource: Send + Sync {
    async fn list_workflow_runs(&self, owner: &str, repo: &str, per_page: u32) -> Result<Vec<WorkflowRun>>;
}

/// Delivery of the rendered report
#[async_trait]
pub trait ReportMailer: Send + Sync {
    async fn send_report(&self, email: &EmailReport) -> Result<()>;
}
