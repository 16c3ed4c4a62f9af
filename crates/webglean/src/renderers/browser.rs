//! Headless browser renderer
//!
//! Launches a fresh Chromium per request over CDP, loads the page, lets
//! scripts settle and reads back the live DOM. The browser is closed on
//! every exit path.

use crate::client::FetchOptions;
use crate::error::FetchError;
use crate::renderers::{RenderedPage, Renderer};
use crate::types::RendererKind;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tracing::{debug, warn};

/// Quiet period after the load event for late script work
const SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Scheme of the page Chromium shows when a navigation fails
const ERROR_PAGE_SCHEME: &str = "chrome-error:";

/// HTTP status of the main navigation, 0 when the browser does not expose it
const NAVIGATION_STATUS_JS: &str = r#"(() => {
    const entry = performance.getEntriesByType('navigation')[0];
    return entry && entry.responseStatus ? entry.responseStatus : 0;
})()"#;

/// Headless Chromium renderer
///
/// Uses [`FetchOptions::browser_path`] as the executable when set, otherwise
/// lets chromiumoxide locate an installed Chrome or Chromium.
pub struct BrowserRenderer;

impl BrowserRenderer {
    /// Create a new browser renderer
    pub fn new() -> Self {
        Self
    }
}

impl Default for BrowserRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Renderer for BrowserRenderer {
    fn name(&self) -> &'static str {
        "browser"
    }

    fn kind(&self) -> RendererKind {
        RendererKind::Browser
    }

    async fn render(&self, url: &str, options: &FetchOptions) -> Result<RenderedPage, FetchError> {
        let config = browser_config(options)?;
        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::BrowserLaunch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    debug!("CDP handler loop ended");
                    break;
                }
            }
        });

        let timeout = options.navigation_timeout;
        let result = match tokio::time::timeout(timeout, load(&browser, url, timeout.as_secs())).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::NavigationTimeout(timeout.as_secs())),
        };

        if let Err(e) = browser.close().await {
            warn!("Error closing browser: {}", e);
        }
        if let Err(e) = browser.wait().await {
            warn!("Error waiting for browser exit: {}", e);
        }
        handler_task.abort();

        result
    }
}

fn browser_config(options: &FetchOptions) -> Result<BrowserConfig, FetchError> {
    let mut builder = BrowserConfig::builder()
        .no_sandbox()
        .arg("--disable-gpu")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-extensions")
        .request_timeout(options.navigation_timeout);

    if let Some(path) = &options.browser_path {
        builder = builder.chrome_executable(path);
    }
    if let Some(user_agent) = &options.user_agent {
        builder = builder.arg(format!("--user-agent={user_agent}"));
    }

    builder.build().map_err(FetchError::BrowserLaunch)
}

async fn load(browser: &Browser, url: &str, timeout_secs: u64) -> Result<RenderedPage, FetchError> {
    // Creating the target on a blank page lets `goto` report failed navigations
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| navigation_error(e, timeout_secs))?;

    let result = visit(&page, url, timeout_secs).await;

    if let Err(e) = page.close().await {
        debug!("Error closing page: {}", e);
    }
    result
}

async fn visit(page: &Page, url: &str, timeout_secs: u64) -> Result<RenderedPage, FetchError> {
    page.goto(url)
        .await
        .map_err(|e| navigation_error(e, timeout_secs))?;

    let current_url = page.url().await.ok().flatten();
    let status = navigation_status(page).await;
    debug!(url, ?status, current_url = current_url.as_deref(), "Navigation finished");
    check_navigation(current_url.as_deref(), status)?;

    tokio::time::sleep(SETTLE_DELAY).await;

    let html = page
        .content()
        .await
        .map_err(|e| navigation_error(e, timeout_secs))?;
    let final_url = page.url().await.ok().flatten().filter(|u| u != url);

    Ok(RenderedPage { html, final_url })
}

/// Map a CDP failure during navigation to a fetch error
fn navigation_error(err: CdpError, timeout_secs: u64) -> FetchError {
    match err {
        CdpError::Timeout => FetchError::NavigationTimeout(timeout_secs),
        other => FetchError::Navigation(other.to_string()),
    }
}

/// Decide whether a finished navigation produced a usable page
///
/// Chromium lands on its own error page for DNS, connection and TLS
/// failures; a known HTTP status outside 2xx is an HTTP error.
fn check_navigation(current_url: Option<&str>, status: Option<u16>) -> Result<(), FetchError> {
    if let Some(current) = current_url {
        if current.starts_with(ERROR_PAGE_SCHEME) {
            return Err(FetchError::Navigation(format!(
                "browser showed an error page ({current})"
            )));
        }
    }

    match status {
        Some(status) if !(200..300).contains(&status) => Err(FetchError::HttpStatus(status)),
        _ => Ok(()),
    }
}

async fn navigation_status(page: &Page) -> Option<u16> {
    page.evaluate(NAVIGATION_STATUS_JS)
        .await
        .ok()
        .and_then(|v| v.into_value::<u16>().ok())
        .filter(|status| *status != 0)
}
