use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_yaml::Value as YamlValue;
use std::collections::HashMap;
use thiserror::Error;

use crate::config::constants::{DEPLOY_ACTION, DEPLOY_JOB_NAME};

static DEPLOY_ACTION_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)^{}\b", regex::escape(DEPLOY_ACTION))).expect("valid deploy action pattern")
});

// =============================================================================
// Extraction result
// =============================================================================

/// Locations declared on the deploy step, verbatim
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeployLocations {
    pub app_location: Option<String>,
    pub api_location: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum DescriptorError {
    #[error("workflow has no jobs.{0}")]
    MissingJob(&'static str),

    #[error("jobs.{job} is malformed: {reason}")]
    MalformedJob { job: &'static str, reason: String },

    #[error("jobs.{0} has no {1} step")]
    MissingDeployStep(&'static str, &'static str),

    #[error("{1} step in jobs.{0} has no with parameters")]
    MissingDeployParams(&'static str, &'static str),
}

// =============================================================================
// YAML shape (serde)
// =============================================================================

#[derive(Debug, Deserialize)]
struct Job {
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    uses: Option<String>,

    #[serde(default)]
    with: Option<HashMap<String, YamlValue>>,
}

// =============================================================================
// Parser
// =============================================================================

pub struct WorkflowParser;

impl WorkflowParser {
    /// Read app/api locations from the deploy step of `build_and_deploy_job`
    ///
    /// The step is the first one whose `uses` starts with the deploy action
    /// reference (case-insensitive). Its `with` parameters are read as-is; a
    /// step without them is an error, while a missing single key is not.
    pub fn extract_locations(document: &YamlValue) -> Result<DeployLocations, DescriptorError> {
        let job_value = document
            .get("jobs")
            .and_then(|jobs| jobs.get(DEPLOY_JOB_NAME))
            .ok_or(DescriptorError::MissingJob(DEPLOY_JOB_NAME))?;

        let job: Job = serde_yaml::from_value(job_value.clone()).map_err(|e| DescriptorError::MalformedJob {
            job: DEPLOY_JOB_NAME,
            reason: e.to_string(),
        })?;

        let step = job
            .steps
            .into_iter()
            .find(|step| step.uses.as_deref().map_or(false, Self::is_deploy_action))
            .ok_or(DescriptorError::MissingDeployStep(DEPLOY_JOB_NAME, DEPLOY_ACTION))?;

        let params = step
            .with
            .ok_or(DescriptorError::MissingDeployParams(DEPLOY_JOB_NAME, DEPLOY_ACTION))?;

        Ok(DeployLocations {
            app_location: Self::with_param(&params, "app_location"),
            api_location: Self::with_param(&params, "api_location"),
        })
    }

    pub fn is_deploy_action(uses: &str) -> bool {
        DEPLOY_ACTION_REF.is_match(uses)
    }

    fn with_param(params: &HashMap<String, YamlValue>, key: &str) -> Option<String> {
        match params.get(key)? {
            YamlValue::String(s) => Some(s.clone()),
            YamlValue::Number(n) => Some(n.to_string()),
            YamlValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(yaml: &str) -> Result<DeployLocations, DescriptorError> {
        let document: YamlValue = serde_yaml::from_str(yaml).unwrap();
        WorkflowParser::extract_locations(&document)
    }

    #[test]
    fn test_extract_locations() {
        let yaml = r#"
name: Azure Static Web Apps CI/CD
on:
  push:
    branches: [main]
jobs:
  build_and_deploy_job:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v2
        with:
          submodules: true
      - name: Build And Deploy
        uses: Azure/static-web-apps-deploy@v0.0.1-preview
        with:
          azure_static_web_apps_api_token: ${{ secrets.TOKEN }}
          action: "upload"
          app_location: "/"
          api_location: "api"
          output_location: "public"
"#;

        let locations = extract(yaml).unwrap();
        assert_eq!(locations.app_location.as_deref(), Some("/"));
        assert_eq!(locations.api_location.as_deref(), Some("api"));
    }

    #[test]
    fn test_case_insensitive_match_and_absent_params() {
        let yaml = r#"
jobs:
  build_and_deploy_job:
    steps:
      - uses: azure/STATIC-web-apps-deploy@v1
        with:
          app_location: ""
"#;

        let locations = extract(yaml).unwrap();
        assert_eq!(locations.app_location.as_deref(), Some(""));
        assert_eq!(locations.api_location, None);
    }

    #[test]
    fn test_first_matching_step_wins() {
        let yaml = r#"
jobs:
  build_and_deploy_job:
    steps:
      - uses: Azure/static-web-apps-deploy@v1
        with:
          app_location: "first"
      - uses: Azure/static-web-apps-deploy@v1
        with:
          app_location: "second"
"#;

        assert_eq!(extract(yaml).unwrap().app_location.as_deref(), Some("first"));
    }

    #[test]
    fn test_prefix_must_end_on_word_boundary() {
        assert!(WorkflowParser::is_deploy_action("Azure/static-web-apps-deploy@v1"));
        assert!(!WorkflowParser::is_deploy_action("Azure/static-web-apps-deployer@v1"));
        assert!(!WorkflowParser::is_deploy_action("my/Azure/static-web-apps-deploy@v1"));
    }

    #[test]
    fn test_missing_job_or_step() {
        let no_job = "jobs:\n  close_pull_request_job:\n    steps: []\n";
        assert_eq!(extract(no_job).unwrap_err(), DescriptorError::MissingJob(DEPLOY_JOB_NAME));

        let no_step = "jobs:\n  build_and_deploy_job:\n    steps:\n      - uses: actions/checkout@v2\n";
        assert!(matches!(extract(no_step).unwrap_err(), DescriptorError::MissingDeployStep(..)));
    }

    #[test]
    fn test_deploy_step_without_with_block() {
        let yaml = "jobs:\n  build_and_deploy_job:\n    steps:\n      - uses: Azure/static-web-apps-deploy@v1\n";
        assert_eq!(
            extract(yaml).unwrap_err(),
            DescriptorError::MissingDeployParams(DEPLOY_JOB_NAME, DEPLOY_ACTION)
        );

        let empty = "jobs:\n  build_and_deploy_job:\n    steps:\n      - uses: Azure/static-web-apps-deploy@v1\n        with:\n";
        assert!(matches!(extract(empty).unwrap_err(), DescriptorError::MissingDeployParams(..)));
    }

    #[test]
    fn test_malformed_job() {
        let yaml = "jobs:\n  build_and_deploy_job:\n    steps: not-a-list\n";
        assert!(matches!(extract(yaml).unwrap_err(), DescriptorError::MalformedJob { .. }));
    }
}
