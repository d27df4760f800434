use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRepository {
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    pub owner: Owner,
}

/// One hit of the code search API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeSearchItem {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub sha: String,
    /// API url of the file, carries the `ref=` query parameter
    pub url: String,
    pub html_url: String,
    pub repository: SearchRepository,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeSearchResult {
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    pub items: Vec<CodeSearchItem>,
}

/// Raw entry of the contents API, either a directory member or a single file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ContentsResponse {
    Directory(Vec<ContentEntry>),
    File(ContentEntry),
}

/// A fetched file with its decoded text and, when it parses, its document
#[derive(Debug, Clone)]
pub struct FileContent {
    pub name: String,
    pub path: String,
    pub text: Option<String>,
    pub document: Option<serde_yaml::Value>,
}

#[derive(Debug, Clone)]
pub enum Content {
    Directory(Vec<ContentEntry>),
    File(FileContent),
}

impl Content {
    pub fn as_directory(&self) -> Option<&[ContentEntry]> {
        match self {
            Content::Directory(entries) => Some(entries.as_slice()),
            Content::File(_) => None,
        }
    }

    pub fn into_file(self) -> Option<FileContent> {
        match self {
            Content::File(file) => Some(file),
            Content::Directory(_) => None,
        }
    }
}

/// Coordinates of a contents API lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRequest {
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub git_ref: String,
}

impl ContentRequest {
    /// Same repository and revision, different path
    pub fn with_path(&self, path: &str) -> Self {
        Self {
            path: path.trim_start_matches('/').to_string(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRun {
    #[serde(default)]
    pub id: u64,
    pub status: Option<String>,
    pub conclusion: Option<String>,
    pub created_at: DateTime<Utc>,
    pub html_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRunsPage {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub workflow_runs: Vec<WorkflowRun>,
}
