use anyhow::Result;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info};

use crate::application::ports::{CodeSearch, ContentSource, ReportMailer, RunHistorySource};
use crate::application::services::{ReportOutcome, ReportService};
use crate::infrastructure::logging::TraceContext;

/// Run one report pass under a fresh trace id
pub async fn run_report_once<S, C, R, M>(service: &ReportService<S, C, R, M>) -> Result<ReportOutcome>
where
    S: CodeSearch,
    C: ContentSource,
    R: RunHistorySource,
    M: ReportMailer,
{
    let trace_id = TraceContext::new_trace_id();
    info!("📊 Report run {} starting", TraceContext::short(&trace_id));

    let outcome = service.run(&trace_id).await?;

    info!(
        "✅ Report run {} sent to {}: {} workflows analyzed, {} total",
        TraceContext::short(&trace_id),
        outcome.email.to,
        outcome.analyzed_count(),
        outcome.counters.total()
    );
    Ok(outcome)
}

/// Report scheduler worker
///
/// Fires immediately, then every `every`. A failed run is logged and the
/// next tick still fires.
pub async fn run_report_scheduler<S, C, R, M>(service: ReportService<S, C, R, M>, every: Duration) -> Result<()>
where
    S: CodeSearch,
    C: ContentSource,
    R: RunHistorySource,
    M: ReportMailer,
{
    info!("Starting report scheduler (runs every {} hours)", every.as_secs() / 3600);

    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        if let Err(e) = run_report_once(&service).await {
            error!("Report run failed: {:#}", e);
        }
    }
}
