use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::config::constants::RUN_HISTORY_PAGE_SIZE;
use crate::github::WorkflowRun;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    Failure,
    /// Cancelled, skipped, still running, ...
    Other,
}

impl RunOutcome {
    pub fn emoji(&self) -> &'static str {
        match self {
            RunOutcome::Success => "✅",
            RunOutcome::Failure => "⛔️",
            RunOutcome::Other => "❔",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub status: Option<String>,
    pub conclusion: Option<String>,
    pub created_at: DateTime<Utc>,
    pub html_url: String,
}

impl RunSummary {
    pub fn outcome(&self) -> RunOutcome {
        match self.conclusion.as_deref() {
            Some("success") => RunOutcome::Success,
            Some("failure") => RunOutcome::Failure,
            _ => RunOutcome::Other,
        }
    }
}

impl From<&WorkflowRun> for RunSummary {
    fn from(run: &WorkflowRun) -> Self {
        Self {
            status: run.status.clone(),
            conclusion: run.conclusion.clone(),
            created_at: run.created_at,
            html_url: run.html_url.clone(),
        }
    }
}

/// Project raw runs into summaries, keeping the source order (most recent first)
pub fn summarize(runs: &[WorkflowRun]) -> Vec<RunSummary> {
    runs.iter()
        .take(RUN_HISTORY_PAGE_SIZE as usize)
        .map(RunSummary::from)
        .collect()
}

/// `2021-05-02T08:30:00Z`, the form GitHub reports run times in
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Emoji strip of run outcomes, most recent first
pub fn outcome_strip(runs: &[RunSummary]) -> String {
    runs.iter().map(|run| run.outcome().emoji()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(id: u64, conclusion: Option<&str>, created_at: &str) -> WorkflowRun {
        WorkflowRun {
            id,
            status: Some(if conclusion.is_some() { "completed" } else { "queued" }.to_string()),
            conclusion: conclusion.map(str::to_string),
            created_at: created_at.parse().unwrap(),
            html_url: format!("https://github.com/octo/site/actions/runs/{}", id),
        }
    }

    #[test]
    fn test_summarize_keeps_source_order() {
        let runs = vec![
            run(3, Some("failure"), "2021-05-03T00:00:00Z"),
            run(1, Some("success"), "2021-05-01T00:00:00Z"),
            run(2, None, "2021-05-02T00:00:00Z"),
        ];

        let summaries = summarize(&runs);
        let dates: Vec<String> = summaries.iter().map(|s| format_timestamp(&s.created_at)).collect();
        assert_eq!(dates, vec!["2021-05-03T00:00:00Z", "2021-05-01T00:00:00Z", "2021-05-02T00:00:00Z"]);
        assert_eq!(summaries[0].html_url, "https://github.com/octo/site/actions/runs/3");
        assert_eq!(summaries[2].status.as_deref(), Some("queued"));
    }

    #[test]
    fn test_summarize_caps_at_page_size() {
        let runs: Vec<WorkflowRun> = (0..150).map(|i| run(i, Some("success"), "2021-05-01T00:00:00Z")).collect();
        assert_eq!(summarize(&runs).len(), 100);
    }

    #[test]
    fn test_outcomes() {
        let summaries = summarize(&[
            run(1, Some("success"), "2021-05-04T00:00:00Z"),
            run(2, Some("failure"), "2021-05-03T00:00:00Z"),
            run(3, Some("cancelled"), "2021-05-02T00:00:00Z"),
            run(4, None, "2021-05-01T00:00:00Z"),
        ]);

        let outcomes: Vec<RunOutcome> = summaries.iter().map(RunSummary::outcome).collect();
        assert_eq!(outcomes, vec![RunOutcome::Success, RunOutcome::Failure, RunOutcome::Other, RunOutcome::Other]);
        assert_eq!(outcome_strip(&summaries), "✅⛔️❔❔");
    }

    #[test]
    fn test_format_timestamp() {
        let at: DateTime<Utc> = "2021-05-02T08:30:00+00:00".parse().unwrap();
        assert_eq!(format_timestamp(&at), "2021-05-02T08:30:00Z");
    }
}
