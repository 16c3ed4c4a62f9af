//! Plain HTTP renderer
//!
//! Loads the page with a single GET and returns the body as served. No
//! JavaScript runs, so this is only faithful for static pages.

use crate::client::FetchOptions;
use crate::error::FetchError;
use crate::renderers::{RenderedPage, Renderer};
use crate::types::RendererKind;
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

/// Binary content type prefixes
const BINARY_PREFIXES: &[&str] = &[
    "image/",
    "audio/",
    "video/",
    "application/octet-stream",
    "application/pdf",
    "application/zip",
    "application/gzip",
    "application/x-tar",
    "application/x-rar",
    "application/x-7z",
    "application/vnd.ms-",
    "application/vnd.openxmlformats",
    "font/",
];

/// Upper bound for establishing the connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// HTTP renderer
///
/// The whole exchange (headers and body) is bounded by
/// [`FetchOptions::navigation_timeout`].
pub struct HttpRenderer;

impl HttpRenderer {
    /// Create a new HTTP renderer
    pub fn new() -> Self {
        Self
    }
}

impl Default for HttpRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    fn name(&self) -> &'static str {
        "http"
    }

    fn kind(&self) -> RendererKind {
        RendererKind::Http
    }

    async fn render(&self, url: &str, options: &FetchOptions) -> Result<RenderedPage, FetchError> {
        let timeout = options.navigation_timeout;
        let timeout_secs = timeout.as_secs();

        let mut headers = HeaderMap::new();
        let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );
        headers.insert(ACCEPT, HeaderValue::from_static(HTML_ACCEPT));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .build()
            .map_err(FetchError::ClientBuildError)?;

        let deadline = tokio::time::Instant::now() + timeout;
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(e, timeout_secs))?;

        let status = response.status();
        debug!(url, status = status.as_u16(), "HTTP response");
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        if let Some(ct) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if is_binary_content_type(ct) {
                return Err(FetchError::BinaryContent(ct.to_string()));
            }
        }

        let final_url = redirected_url(url, response.url());

        let (body, truncated) = read_body_until(response, deadline).await;
        if truncated {
            if body.is_empty() {
                return Err(FetchError::NavigationTimeout(timeout_secs));
            }
            warn!(url, bytes = body.len(), "Body incomplete, using partial content");
        }

        Ok(RenderedPage {
            html: String::from_utf8_lossy(&body).into_owned(),
            final_url,
        })
    }
}

/// Check if content type indicates binary content
fn is_binary_content_type(content_type: &str) -> bool {
    let ct_lower = content_type.to_lowercase();
    BINARY_PREFIXES
        .iter()
        .any(|prefix| ct_lower.starts_with(prefix))
}

/// The response URL, if redirects moved it away from the requested one
fn redirected_url(requested: &str, actual: &Url) -> Option<String> {
    match Url::parse(requested) {
        Ok(requested) if &requested == actual => None,
        _ => Some(actual.to_string()),
    }
}

/// Read the response body until it ends or `deadline` passes
///
/// Returns the bytes read and whether the body is incomplete.
async fn read_body_until(response: reqwest::Response, deadline: tokio::time::Instant) -> (Bytes, bool) {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();

    loop {
        tokio::select! {
            chunk = stream.next() => {
                match chunk {
                    Some(Ok(bytes)) => body.extend_from_slice(&bytes),
                    Some(Err(e)) => {
                        error!("Error reading body chunk: {}", e);
                        return (Bytes::from(body), true);
                    }
                    None => return (Bytes::from(body), false),
                }
            }
            _ = tokio::time::sleep_until(deadline) => {
                return (Bytes::from(body), true);
            }
        }
    }
}
