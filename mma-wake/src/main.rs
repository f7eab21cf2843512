//! mma-wake - keep-alive pinger for the hosted dashboard
//!
//! Exit status 0 when dashboard content was seen, 1 on timeout or any error.
//! Meant to run on a schedule (e.g. a CI cron job) next to a chromedriver
//! instance; `WEBDRIVER_URL` points at it.

use anyhow::{Context, Result};
use mma_wake::{target_url, wake, webdriver_url, BrowserSession, WakeOutcome, WakePolicy};
use std::process::ExitCode;
use tracing::{error, info, warn};

async fn run() -> Result<WakeOutcome> {
    let url = target_url();
    let webdriver = webdriver_url();
    info!("Target: {} (WebDriver {})", url, webdriver);

    let session = BrowserSession::connect(&webdriver)
        .await
        .with_context(|| format!("Failed to start a browser via {}", webdriver))?;
    let outcome = wake(&session, &url, &WakePolicy::default()).await;

    if let Err(e) = session.quit().await {
        warn!("Browser session did not close cleanly: {}", e);
    }

    outcome.with_context(|| format!("Wake-up of {} failed", url))
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting Music Money keep-alive (mma-wake) {}", env!("BUILD_ID"));

    match run().await {
        Ok(WakeOutcome::Awake { attempt }) => {
            info!("Dashboard is up (attempt {})", attempt);
            ExitCode::SUCCESS
        }
        Ok(WakeOutcome::TimedOut) => {
            error!("Dashboard did not come up in time");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
