use std::fmt::Write as _;

use super::counters::Counters;
use super::models::{AnalysisInfo, WorkflowMatch};
use super::run_history::{format_timestamp, outcome_strip};

const NO_RUNS: &str = "no runs";

/// A rendered report, ready for delivery
#[derive(Debug, Clone, PartialEq)]
pub struct EmailReport {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub html: String,
}

fn latest_label(info: &AnalysisInfo) -> String {
    info.latest_created_at
        .as_ref()
        .map_or_else(|| NO_RUNS.to_string(), format_timestamp)
}

/// Multi-line console summary of one analyzed item
pub fn console_summary(workflow: &WorkflowMatch) -> String {
    format!(
        "{}\n{} {}\n{}\n{}\n",
        workflow.html_url,
        latest_label(&workflow.info),
        outcome_strip(&workflow.info.runs),
        workflow.info.framework_label(),
        workflow.info.errors.join("\n"),
    )
}

/// `key: count` for every counter, sorted by key
pub fn console_counter_lines(counters: &Counters) -> Vec<String> {
    counters
        .iter()
        .map(|(key, count)| format!("{}: {}", key, count))
        .collect()
}

/// `key: count (share%)` for every counter, sorted by key
pub fn counter_lines(counters: &Counters) -> Vec<String> {
    counters
        .iter()
        .map(|(key, count)| format!("{}: {} ({:.1}%)", key, count, counters.percentage(key)))
        .collect()
}

/// HTML body: counters first, then every non-skipped item in search order
pub fn render_email_body(workflows: &[WorkflowMatch], counters: &Counters) -> String {
    let mut body = String::new();

    for line in counter_lines(counters) {
        body.push_str(&line);
        body.push_str("<br />");
    }

    for workflow in workflows.iter().filter(|w| !w.is_skipped()) {
        let info = &workflow.info;

        let run_links: String = info
            .runs
            .iter()
            .map(|run| {
                format!(
                    r#"<a href="{}" title="{}">{}</a>"#,
                    escape_html(&run.html_url),
                    escape_html(&format_timestamp(&run.created_at)),
                    run.outcome().emoji()
                )
            })
            .collect();

        let _ = write!(
            body,
            r#"<hr /><b><a href="{}">{}</a></b><br />"#,
            escape_html(&workflow.html_url),
            escape_html(&workflow.display_name())
        );
        let _ = write!(
            body,
            "{} - {}<br />{}",
            escape_html(&latest_label(info)),
            info.framework_label(),
            run_links
        );

        if !info.errors.is_empty() {
            let errors: Vec<String> = info.errors.iter().map(|e| escape_html(e)).collect();
            let _ = write!(
                body,
                r#"<br /><span style="color: #dd0000">{}</span>"#,
                errors.join("<br />")
            );
        }
    }

    body
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\n' => escaped.push_str("<br />"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::Framework;
    use crate::report::counters::keys;
    use crate::report::models::ItemStatus;
    use crate::report::run_history::RunSummary;

    fn workflow(repo: &str, status: ItemStatus) -> WorkflowMatch {
        WorkflowMatch {
            owner: "octo".to_string(),
            repo: repo.to_string(),
            path: ".github/workflows/deploy.yml".to_string(),
            url: format!("https://api.github.com/repos/octo/{}/contents/x.yml?ref=abc", repo),
            html_url: format!("https://github.com/octo/{}/blob/abc/.github/workflows/deploy.yml", repo),
            status,
            info: AnalysisInfo::default(),
        }
    }

    fn run(conclusion: &str, created_at: &str) -> RunSummary {
        RunSummary {
            status: Some("completed".to_string()),
            conclusion: Some(conclusion.to_string()),
            created_at: created_at.parse().unwrap(),
            html_url: "https://github.com/octo/site/actions/runs/1".to_string(),
        }
    }

    #[test]
    fn test_counter_lines() {
        let mut counters = Counters::new();
        counters.increment(keys::TOTAL);
        counters.increment(keys::TOTAL);
        counters.increment(keys::TOTAL);
        counters.increment("framework.react");

        assert_eq!(
            counter_lines(&counters),
            vec!["TOTAL: 3 (100.0%)".to_string(), "framework.react: 1 (33.3%)".to_string()]
        );
    }

    #[test]
    fn test_console_counter_lines_have_no_share() {
        let mut counters = Counters::new();
        counters.increment(keys::TOTAL);
        counters.increment(keys::TOTAL);
        counters.increment(keys::API_LOCATION_MISSING);

        assert_eq!(
            console_counter_lines(&counters),
            vec!["TOTAL: 2".to_string(), "apiLocation.missing: 1".to_string()]
        );
    }

    #[test]
    fn test_console_summary() {
        let mut item = workflow("site", ItemStatus::Analyzed);
        item.info.runs = vec![run("success", "2021-05-02T00:00:00Z"), run("failure", "2021-05-01T00:00:00Z")];
        item.info.latest_created_at = Some("2021-05-02T00:00:00Z".parse().unwrap());
        item.info.set_framework(Framework::Hugo);

        let summary = console_summary(&item);
        assert!(summary.starts_with("https://github.com/octo/site/blob/"));
        assert!(summary.contains("\n2021-05-02T00:00:00Z ✅⛔️\nhugo\n"));
    }

    #[test]
    fn test_email_body_skips_duplicates_and_keeps_order() {
        let mut first = workflow("alpha", ItemStatus::Analyzed);
        first.info.runs = vec![run("success", "2021-05-02T00:00:00Z")];
        first.info.latest_created_at = Some("2021-05-02T00:00:00Z".parse().unwrap());
        first.info.set_framework(Framework::React);

        let skipped = workflow("alpha", ItemStatus::Skipped);

        let mut second = workflow("beta", ItemStatus::Errored);
        second.info.errors.push("Failed to process x\nworkflow <missing>".to_string());

        let mut counters = Counters::new();
        counters.increment(keys::TOTAL);
        counters.increment(keys::TOTAL);

        let body = render_email_body(&[first, skipped, second], &counters);

        assert!(body.starts_with("TOTAL: 2 (100.0%)<br />"));
        assert_eq!(body.matches("<hr />").count(), 2);
        let alpha = body.find("octo/alpha</a>").unwrap();
        let beta = body.find("octo/beta</a>").unwrap();
        assert!(alpha < beta);
        assert!(body.contains("2021-05-02T00:00:00Z - react<br />"));
        assert!(body.contains(r#"title="2021-05-02T00:00:00Z">✅</a>"#));
        assert!(body.contains("no runs - undefined<br />"));
        assert!(body.contains(
            r#"<span style="color: #dd0000">Failed to process x<br />workflow &lt;missing&gt;</span>"#
        ));
    }
}
