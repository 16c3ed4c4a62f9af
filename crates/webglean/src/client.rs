//! Fetch entry points
//!
//! Validates the request, hands the URL to a [`Renderer`] and runs the
//! extraction pipeline over whatever HTML comes back.

use crate::convert::{extract, page_title};
use crate::error::FetchError;
use crate::renderers::{renderer_for, Renderer};
use crate::types::{FetchRequest, FetchResponse, RendererKind};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default navigation timeout
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetch options that can be configured via tool builder
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Which renderer loads the page
    pub renderer: RendererKind,
    /// Browser executable, auto-detected when unset
    pub browser_path: Option<PathBuf>,
    /// Upper bound for loading a page
    pub navigation_timeout: Duration,
    /// Custom User-Agent
    pub user_agent: Option<String>,
    /// Allow list of URL prefixes
    pub allow_prefixes: Vec<String>,
    /// Block list of URL prefixes
    pub block_prefixes: Vec<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            renderer: RendererKind::default(),
            browser_path: None,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            user_agent: None,
            allow_prefixes: Vec::new(),
            block_prefixes: Vec::new(),
        }
    }
}

/// Fetch a URL and return the response
///
/// Uses the headless browser with default options.
/// For custom options, use [`fetch_with_options`].
pub async fn fetch(req: FetchRequest) -> Result<FetchResponse, FetchError> {
    fetch_with_options(req, FetchOptions::default()).await
}

/// Fetch a URL with custom options
pub async fn fetch_with_options(
    req: FetchRequest,
    options: FetchOptions,
) -> Result<FetchResponse, FetchError> {
    let renderer = renderer_for(options.renderer);
    fetch_with_renderer(req, &options, renderer.as_ref()).await
}

/// Fetch a URL with a caller-supplied renderer
///
/// `options.renderer` is ignored; the response reports `renderer.kind()`.
pub async fn fetch_with_renderer(
    req: FetchRequest,
    options: &FetchOptions,
    renderer: &dyn Renderer,
) -> Result<FetchResponse, FetchError> {
    validate_url(&req.url, options)?;

    let mode = req.effective_output();
    debug!(renderer = renderer.name(), url = %req.url, %mode, "Rendering page");
    let page = renderer.render(&req.url, options).await?;

    let content = extract(&page.html, mode);
    let title = page_title(&page.html);

    Ok(FetchResponse {
        url: req.url,
        final_url: page.final_url,
        title,
        format: mode,
        content,
        renderer: renderer.kind(),
    })
}

/// Check scheme and prefix lists before anything touches the network
fn validate_url(url: &str, options: &FetchOptions) -> Result<(), FetchError> {
    if url.is_empty() {
        return Err(FetchError::MissingUrl);
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(FetchError::InvalidUrlScheme);
    }
    Url::parse(url).map_err(|_| FetchError::InvalidUrlScheme)?;

    if !options.allow_prefixes.is_empty()
        && !options
            .allow_prefixes
            .iter()
            .any(|prefix| url.starts_with(prefix))
    {
        return Err(FetchError::BlockedUrl);
    }

    if options
        .block_prefixes
        .iter()
        .any(|prefix| url.starts_with(prefix))
    {
        return Err(FetchError::BlockedUrl);
    }

    Ok(())
}
