mod application;
mod config;
mod github;
mod infrastructure;
mod report;
mod workers;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use application::services::{Recipients, ReportService};
use config::ReportConfig;
use github::GitHubClient;
use infrastructure::logging::BoundaryLogger;
use infrastructure::notifications::SendGridClient;
use workers::{run_report_once, run_report_scheduler};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Missing secrets are fatal before anything else runs
    let config = ReportConfig::from_env()?;

    let _log_guard = init_tracing(config.log_dir.as_deref());

    info!("Starting Static Web Apps workflow report");
    debug!("Config: {:?}", config);

    let github = Arc::new(GitHubClient::new(
        config.github_token.clone(),
        config.github_api_url.clone(),
    ));
    let sendgrid = Arc::new(SendGridClient::new(
        config.sendgrid_api_key.clone(),
        config.sendgrid_api_url.clone(),
    )?);

    let service = ReportService::new(
        github.clone(),
        github.clone(),
        github,
        sendgrid,
        Recipients {
            to: config.email_to.clone(),
            from: config.email_from.clone(),
        },
        Arc::new(BoundaryLogger::new()),
    );

    if config.run_once {
        run_report_once(&service).await?;
        return Ok(());
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        result = run_report_scheduler(service, config.interval) => {
            if let Err(e) = result {
                error!("Report scheduler stopped: {:#}", e);
            }
        }
    }

    info!("Shutting down...");

    Ok(())
}

/// Console logging, plus a daily rolling file when `log_dir` is set
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "swa-workflow-report.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}
