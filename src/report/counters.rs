use serde::Serialize;
use std::collections::BTreeMap;

use crate::github::Framework;
use super::run_history::RunSummary;

/// Counter key names
pub mod keys {
    use super::{Framework, RunSummary};

    pub const TOTAL: &str = "TOTAL";
    pub const API_LOCATION_MISSING: &str = "apiLocation.missing";
    pub const API_LOCATION_HOST_JSON_MISSING: &str = "apiLocation.hostJsonMissing";

    pub fn framework(framework: Option<Framework>) -> String {
        format!("framework.{}", framework.map_or("undefined", |f| f.label()))
    }

    /// Keyed by the conclusion of the most recent run; `null` while it has none yet
    pub fn latest_workflow_run(latest: Option<&RunSummary>) -> String {
        let conclusion = match latest {
            Some(run) => run.conclusion.as_deref().unwrap_or("null"),
            None => "none",
        };
        format!("latestWorkflowRun.{}", conclusion)
    }
}

/// Named tallies for one report run
///
/// Absent keys read as zero. Counts only ever go up.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Counters(BTreeMap<String, u64>);

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: impl Into<String>) {
        *self.0.entry(key.into()).or_insert(0) += 1;
    }

    pub fn get(&self, key: &str) -> u64 {
        self.0.get(key).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.get(keys::TOTAL)
    }

    /// Share of `TOTAL`, in percent
    pub fn percentage(&self, key: &str) -> f64 {
        match self.total() {
            0 => 0.0,
            total => 100.0 * self.get(key) as f64 / total as f64,
        }
    }

    /// Entries sorted by key
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_starts_from_zero() {
        let mut counters = Counters::new();
        assert_eq!(counters.get("framework.hugo"), 0);

        counters.increment("framework.hugo");
        counters.increment("framework.hugo");
        counters.increment(keys::TOTAL);

        assert_eq!(counters.get("framework.hugo"), 2);
        assert_eq!(counters.total(), 1);
    }

    #[test]
    fn test_iteration_is_sorted() {
        let mut counters = Counters::new();
        for key in ["latestWorkflowRun.success", "TOTAL", "framework.react", "apiLocation.missing"] {
            counters.increment(key);
        }

        let keys: Vec<&str> = counters.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["TOTAL", "apiLocation.missing", "framework.react", "latestWorkflowRun.success"]);
    }

    #[test]
    fn test_percentage() {
        let mut counters = Counters::new();
        assert_eq!(counters.percentage("framework.vue"), 0.0);

        for _ in 0..4 {
            counters.increment(keys::TOTAL);
        }
        counters.increment("framework.vue");
        assert_eq!(counters.percentage("framework.vue"), 25.0);
        assert_eq!(counters.percentage(keys::TOTAL), 100.0);
    }

    #[test]
    fn test_key_builders() {
        assert_eq!(keys::framework(Some(Framework::Eleventy)), "framework.11ty");
        assert_eq!(keys::framework(None), "framework.undefined");
        assert_eq!(keys::latest_workflow_run(None), "latestWorkflowRun.none");

        let in_progress = RunSummary {
            status: Some("in_progress".to_string()),
            conclusion: None,
            created_at: "2021-05-01T10:00:00Z".parse().unwrap(),
            html_url: String::new(),
        };
        assert_eq!(keys::latest_workflow_run(Some(&in_progress)), "latestWorkflowRun.null");
    }
}
