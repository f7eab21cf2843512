//! # mma-wake
//!
//! Keeps the hosted dashboard from idling out. A hosted app that has been
//! asleep serves a placeholder page with a wake-up button until it boots
//! again. The dashboard itself is rendered client-side, so the page has to be
//! driven through a real browser: this crate talks to a WebDriver server
//! (chromedriver) running headless Chrome.
//!
//! **Flow:**
//! 1. Open the target URL
//! 2. Settle delay
//! 3. Click the wake-up button if the placeholder shows one
//! 4. Poll the rendered page for content markers, `attempts` times,
//!    `interval` apart
//!
//! A page that cannot be read during polling only costs an attempt; the app
//! commonly answers with gateway errors while it boots.

use fantoccini::error::{CmdError, NewSessionError};
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Environment variable holding the dashboard URL
pub const URL_ENV_VAR: &str = "STREAMLIT_APP_URL";

/// Hosted dashboard address used when the environment does not name one
pub const DEFAULT_URL: &str = "https://music-money-analytics-6w38qnsrdok58yvctt3x5a.streamlit.app/";

/// Environment variable holding the WebDriver server address
pub const WEBDRIVER_ENV_VAR: &str = "WEBDRIVER_URL";

/// chromedriver's default listen address
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// Text shown by the placeholder page of a sleeping app
pub const SLEEP_MARKER: &str = "Yes, get this app back up";

/// Locates the placeholder's wake-up button
pub const WAKE_BUTTON_XPATH: &str = "//button[contains(., 'Yes, get this app back up')]";

/// Any of these in the page means the dashboard is up
pub const CONTENT_MARKERS: &[&str] = &["Channel Name", "Video Name", "Music Money"];

/// Browser-like user agent; some hosts serve a bare page to unknown clients
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/110.0.0.0 Safari/537.36";

/// Chrome flags for an unattended headless run
const CHROME_ARGS: &[&str] = &[
    "--headless=new",
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--window-size=1920,1080",
];

#[derive(Error, Debug)]
pub enum WakeError {
    #[error("WebDriver session could not be started: {0}")]
    Session(#[from] NewSessionError),

    #[error("WebDriver command failed: {0}")]
    Command(#[from] CmdError),
}

/// Timing of one wake-up run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakePolicy {
    /// Maximum number of content checks
    pub attempts: u32,
    /// Delay between content checks
    pub interval: Duration,
    /// Delay between opening the page and looking for the wake-up button
    pub settle: Duration,
    /// How long the wake-up button may take to appear
    pub button_wait: Duration,
}

impl Default for WakePolicy {
    fn default() -> Self {
        Self {
            attempts: 18,
            interval: Duration::from_secs(5),
            settle: Duration::from_secs(5),
            button_wait: Duration::from_secs(10),
        }
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeOutcome {
    /// Content marker found on this 1-based attempt
    Awake { attempt: u32 },
    TimedOut,
}

impl WakeOutcome {
    pub fn is_awake(&self) -> bool {
        matches!(self, WakeOutcome::Awake { .. })
    }
}

/// A browser tab the wake-up loop can drive
pub trait PageDriver {
    fn open(&self, url: &str) -> impl Future<Output = Result<(), WakeError>> + Send;

    fn title(&self) -> impl Future<Output = Result<String, WakeError>> + Send;

    /// Rendered HTML of the current page
    fn page_source(&self) -> impl Future<Output = Result<String, WakeError>> + Send;

    /// Click the wake-up button once it appears; `Ok(false)` when it does not
    /// show up within `wait`
    fn click_wake_button(&self, wait: Duration)
        -> impl Future<Output = Result<bool, WakeError>> + Send;
}

/// [`PageDriver`] backed by a WebDriver session running headless Chrome
pub struct BrowserSession {
    client: Client,
}

impl BrowserSession {
    /// Start a headless Chrome session on the WebDriver server at `webdriver_url`
    pub async fn connect(webdriver_url: &str) -> Result<Self, WakeError> {
        let mut args: Vec<String> = CHROME_ARGS.iter().map(|a| a.to_string()).collect();
        args.push(format!("user-agent={}", USER_AGENT));

        let mut capabilities = serde_json::Map::new();
        capabilities.insert("goog:chromeOptions".to_string(), json!({ "args": args }));

        let mut builder = ClientBuilder::native();
        builder.capabilities(capabilities);
        let client = builder.connect(webdriver_url).await?;
        debug!("WebDriver session started on {}", webdriver_url);
        Ok(Self { client })
    }

    /// End the session and close the browser
    pub async fn quit(self) -> Result<(), WakeError> {
        self.client.close().await?;
        Ok(())
    }
}

impl PageDriver for BrowserSession {
    async fn open(&self, url: &str) -> Result<(), WakeError> {
        self.client.goto(url).await?;
        Ok(())
    }

    async fn title(&self) -> Result<String, WakeError> {
        Ok(self.client.title().await?)
    }

    async fn page_source(&self) -> Result<String, WakeError> {
        Ok(self.client.source().await?)
    }

    async fn click_wake_button(&self, wait: Duration) -> Result<bool, WakeError> {
        let found = self
            .client
            .wait()
            .at_most(wait)
            .for_element(Locator::XPath(WAKE_BUTTON_XPATH))
            .await;
        let button = match found {
            Ok(button) => button,
            Err(CmdError::WaitTimeout) => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        // Script click; the placeholder overlay can intercept a native click
        let target = serde_json::to_value(&button).map_err(CmdError::Json)?;
        self.client
            .execute("arguments[0].click();", vec![target])
            .await?;
        Ok(true)
    }
}

fn env_or(var: &str, default: &str) -> String {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Target URL from the environment, or the hosted default
pub fn target_url() -> String {
    env_or(URL_ENV_VAR, DEFAULT_URL)
}

/// WebDriver server address from the environment, or chromedriver's default
pub fn webdriver_url() -> String {
    env_or(WEBDRIVER_ENV_VAR, DEFAULT_WEBDRIVER_URL)
}

/// True when the page shows dashboard content
pub fn has_content(page: &str) -> bool {
    CONTENT_MARKERS.iter().any(|m| page.contains(m))
}

/// True when the page is the sleeping-app placeholder
pub fn is_sleeping(page: &str) -> bool {
    page.contains(SLEEP_MARKER)
}

/// Open `url`, press the wake-up button if shown and poll until the dashboard
/// renders
///
/// Only a failure to open the page ends the run with an error.
pub async fn wake<D: PageDriver>(
    driver: &D,
    url: &str,
    policy: &WakePolicy,
) -> Result<WakeOutcome, WakeError> {
    driver.open(url).await?;
    info!("Page loaded: {} ({})", url, driver.title().await.unwrap_or_default());
    tokio::time::sleep(policy.settle).await;

    match driver.click_wake_button(policy.button_wait).await {
        Ok(true) => warn!("Sleeping status detected: wake-up button clicked"),
        Ok(false) => info!("Wake-up button not found, app is loading or already awake"),
        Err(e) => warn!("Wake-up button could not be clicked: {}", e),
    }

    info!(
        "Waiting for app content ({} checks, {:?} apart)",
        policy.attempts, policy.interval
    );
    for attempt in 1..=policy.attempts {
        match driver.page_source().await {
            Ok(page) if has_content(&page) => {
                info!("App content detected on attempt #{}", attempt);
                return Ok(WakeOutcome::Awake { attempt });
            }
            Ok(page) => debug!(
                "Attempt {}/{}: content not ready (sleeping page: {})",
                attempt,
                policy.attempts,
                is_sleeping(&page)
            ),
            Err(e) => warn!("Attempt {}/{}: page unavailable: {}", attempt, policy.attempts, e),
        }
        if attempt < policy.attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    warn!("Timed out waiting for app content");
    if let Ok(title) = driver.title().await {
        info!("Final page title: {}", title);
    }
    Ok(WakeOutcome::TimedOut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers() {
        assert!(has_content("<h1>Music Money Analytics</h1>"));
        assert!(has_content("| Channel Name | Views |"));
        assert!(!has_content("<title>Streamlit</title>"));
        assert!(is_sleeping("<button>Yes, get this app back up!</button>"));
    }

    #[test]
    fn test_default_policy() {
        let p = WakePolicy::default();
        assert_eq!(p.attempts, 18);
        assert_eq!(p.interval * p.attempts, Duration::from_secs(90));
        assert_eq!(p.button_wait, Duration::from_secs(10));
    }
}
