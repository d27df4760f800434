use anyhow::Result;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::application::ports::{CodeSearch, ContentSource, ReportMailer, RunHistorySource};
use crate::config::constants::{
    EMAIL_SUBJECT, RUN_HISTORY_PAGE_SIZE, SEARCH_PAGE_SIZE, SEARCH_QUERY, SEARCH_SORT,
};
use crate::github::{
    CodeSearchItem, Content, ContentRequest, DescriptorError, FrameworkDetector, MarkerFiles,
    WorkflowParser,
};
use crate::infrastructure::logging::{BoundaryLogger, Timer};
use crate::report::render::{console_counter_lines, console_summary, render_email_body};
use crate::report::{keys, summarize, Counters, EmailReport, ItemStatus, RepoIdentity, WorkflowMatch};

const HOST_JSON: &str = "host.json";

/// Reasons an item's analysis stops early
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("no ref= in {0}")]
    MissingRef(String),

    #[error("workflow file {0} not found")]
    WorkflowNotFound(String),

    #[error("workflow file {0} could not be parsed")]
    WorkflowUnreadable(String),

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error("failed to list workflow runs: {0:#}")]
    RunHistory(anyhow::Error),
}

/// Report mail addressing
#[derive(Debug, Clone)]
pub struct Recipients {
    pub to: String,
    pub from: String,
}

/// Result of one report pass
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub workflows: Vec<WorkflowMatch>,
    pub counters: Counters,
    pub email: EmailReport,
}

impl ReportOutcome {
    pub fn analyzed_count(&self) -> usize {
        self.workflows.iter().filter(|w| !w.is_skipped()).count()
    }
}

/// ReportService - 워크플로우 리포트 한 회차를 담당하는 서비스
///
/// 책임:
/// - 코드 검색 결과 수집
/// - 저장소 단위 인접 중복 제거
/// - 항목별 배포 설정/프레임워크/실행 이력 분석
/// - 카운터 집계 및 메일 발송
pub struct ReportService<S, C, R, M>
where
    S: CodeSearch,
    C: ContentSource,
    R: RunHistorySource,
    M: ReportMailer,
{
    search: Arc<S>,
    content: Arc<C>,
    runs: Arc<R>,
    mailer: Arc<M>,
    recipients: Recipients,
    logger: Arc<BoundaryLogger>,
}

impl<S, C, R, M> ReportService<S, C, R, M>
where
    S: CodeSearch,
    C: ContentSource,
    R: RunHistorySource,
    M: ReportMailer,
{
    pub fn new(
        search: Arc<S>,
        content: Arc<C>,
        runs: Arc<R>,
        mailer: Arc<M>,
        recipients: Recipients,
        logger: Arc<BoundaryLogger>,
    ) -> Self {
        Self {
            search,
            content,
            runs,
            mailer,
            recipients,
            logger,
        }
    }

    /// 리포트 한 회차 실행
    ///
    /// Search and mail failures abort the run. Item failures never do.
    pub async fn run(&self, trace_id: &str) -> Result<ReportOutcome> {
        let timer = Timer::start();
        self.logger.service_entry(trace_id, "Scheduler", "ReportService", "run", &SEARCH_QUERY);

        let result = self.run_inner(trace_id).await;

        match &result {
            Ok(_) => self.logger.service_exit(trace_id, "Scheduler", "ReportService", "run", timer.elapsed_ms()),
            Err(e) => self.logger.service_error(trace_id, "Scheduler", "ReportService", "run", &format!("{:#}", e)),
        }

        result
    }

    async fn run_inner(&self, trace_id: &str) -> Result<ReportOutcome> {
        self.logger.external_call(trace_id, "ReportService", "GitHub", "search_code");
        let ext_timer = Timer::start();
        let items = match self.search.search_code(SEARCH_QUERY, SEARCH_SORT, SEARCH_PAGE_SIZE).await {
            Ok(items) => items,
            Err(e) => {
                self.logger.external_error(trace_id, "ReportService", "GitHub", "search_code", &e);
                return Err(e.context("Code search failed"));
            }
        };
        self.logger.external_done(trace_id, "ReportService", "GitHub", "search_code", ext_timer.elapsed_ms());
        info!("[{}] {} workflow files found", trace_id, items.len());

        let (workflows, counters) = self.analyze_all(trace_id, items).await;

        for line in console_counter_lines(&counters) {
            info!("[{}] {}", trace_id, line);
        }

        let email = EmailReport {
            to: self.recipients.to.clone(),
            from: self.recipients.from.clone(),
            subject: EMAIL_SUBJECT.to_string(),
            html: render_email_body(&workflows, &counters),
        };

        self.logger.external_call(trace_id, "ReportService", "SendGrid", "send_report");
        let ext_timer = Timer::start();
        if let Err(e) = self.mailer.send_report(&email).await {
            self.logger.external_error(trace_id, "ReportService", "SendGrid", "send_report", &e);
            return Err(e.context("Report email dispatch failed"));
        }
        self.logger.external_done(trace_id, "ReportService", "SendGrid", "send_report", ext_timer.elapsed_ms());

        Ok(ReportOutcome {
            workflows,
            counters,
            email,
        })
    }

    /// Analyze every search hit in order
    ///
    /// A hit from the same repository as the last hit with a readable
    /// revision is skipped; search results come grouped by repository, so
    /// this is the only duplicate check. A hit without a revision fails
    /// before the check and leaves the last-seen repository alone.
    pub async fn analyze_all(&self, trace_id: &str, items: Vec<CodeSearchItem>) -> (Vec<WorkflowMatch>, Counters) {
        let mut counters = Counters::new();
        let mut workflows = Vec::with_capacity(items.len());
        let mut last_seen: Option<RepoIdentity> = None;

        for item in items {
            let mut workflow = WorkflowMatch::from(item);

            let result = match workflow.git_ref() {
                None => Err(ItemError::MissingRef(workflow.url.clone())),
                Some(git_ref) => {
                    let identity = workflow.identity();
                    if last_seen.as_ref() == Some(&identity) {
                        info!("[{}] Skipping duplicate: {} ({})", trace_id, identity, workflow.path);
                        workflow.status = ItemStatus::Skipped;
                        workflows.push(workflow);
                        continue;
                    }
                    last_seen = Some(identity);

                    self.analyze(trace_id, &mut workflow, git_ref, &mut counters).await
                }
            };

            workflow.status = match result {
                Ok(()) => ItemStatus::Analyzed,
                Err(e) => {
                    self.logger.item_failed(trace_id, &workflow.identity().to_string(), &e);
                    workflow
                        .info
                        .errors
                        .push(format!("Failed to process {}\n{}", workflow.url, e));
                    ItemStatus::Errored
                }
            };

            workflow.info.latest_created_at = workflow.info.latest_run().map(|run| run.created_at);
            info!("[{}] {}", trace_id, console_summary(&workflow));

            counters.increment(keys::framework(workflow.info.framework()));
            counters.increment(keys::TOTAL);
            counters.increment(keys::latest_workflow_run(workflow.info.latest_run()));

            workflows.push(workflow);
        }

        (workflows, counters)
    }

    /// Fetch, extract, classify and collect runs for one item; the first failure ends it
    async fn analyze(
        &self,
        trace_id: &str,
        workflow: &mut WorkflowMatch,
        git_ref: String,
        counters: &mut Counters,
    ) -> Result<(), ItemError> {
        let request = ContentRequest {
            owner: workflow.owner.clone(),
            repo: workflow.repo.clone(),
            path: workflow.path.clone(),
            git_ref,
        };

        let document = self
            .fetch(trace_id, &request)
            .await
            .and_then(Content::into_file)
            .ok_or_else(|| ItemError::WorkflowNotFound(request.path.clone()))?
            .document
            .ok_or_else(|| ItemError::WorkflowUnreadable(request.path.clone()))?;

        let locations = WorkflowParser::extract_locations(&document)?;
        workflow.info.app_location = locations.app_location;
        workflow.info.api_location = locations.api_location;

        if let Some(app_location) = non_empty(&workflow.info.app_location) {
            let app_request = request.with_path(&app_location);

            // Missing app folder is fine: a build step may generate it
            if let Some(Content::Directory(listing)) = self.fetch(trace_id, &app_request).await {
                let markers = MarkerFiles::discover(&listing);
                debug!("[{}] {} markers: {:?}", trace_id, app_request.path, markers.found());

                let framework = FrameworkDetector::classify(&markers, &*self.content, &app_request).await;
                workflow.info.set_framework(framework);
                workflow.info.markers = markers;
            }
        }

        if let Some(api_location) = non_empty(&workflow.info.api_location) {
            let api_request = request.with_path(&api_location);

            match self.fetch(trace_id, &api_request).await {
                Some(Content::Directory(listing)) => {
                    if !listing.iter().any(|entry| entry.name == HOST_JSON) {
                        workflow
                            .info
                            .errors
                            .push(format!("api_location {} missing {}", api_request.path, HOST_JSON));
                    }
                    // Counted for every readable api folder, host.json or not
                    counters.increment(keys::API_LOCATION_HOST_JSON_MISSING);
                }
                _ => {
                    workflow
                        .info
                        .errors
                        .push(format!("api_location {} not found", api_request.path));
                    counters.increment(keys::API_LOCATION_MISSING);
                }
            }
        }

        self.logger.external_call(trace_id, "ReportService", "GitHub", "list_workflow_runs");
        let ext_timer = Timer::start();
        let runs = match self
            .runs
            .list_workflow_runs(&workflow.owner, &workflow.repo, RUN_HISTORY_PAGE_SIZE)
            .await
        {
            Ok(runs) => runs,
            Err(e) => {
                self.logger.external_error(trace_id, "ReportService", "GitHub", "list_workflow_runs", &e);
                return Err(ItemError::RunHistory(e));
            }
        };
        self.logger.external_done(trace_id, "ReportService", "GitHub", "list_workflow_runs", ext_timer.elapsed_ms());

        workflow.info.runs = summarize(&runs);
        Ok(())
    }

    async fn fetch(&self, trace_id: &str, request: &ContentRequest) -> Option<Content> {
        let ext_timer = Timer::start();
        let content = self.content.get_content(request).await;
        debug!(
            "[{}] get_content {}/{}:{} -> {} ({:.2}ms)",
            trace_id,
            request.owner,
            request.repo,
            request.path,
            match &content {
                Some(Content::Directory(entries)) => format!("{} entries", entries.len()),
                Some(Content::File(_)) => "file".to_string(),
                None => "absent".to_string(),
            },
            ext_timer.elapsed_ms()
        );
        content
    }
}

fn non_empty(location: &Option<String>) -> Option<String> {
    location.as_ref().filter(|l| !l.is_empty()).cloned()
}
