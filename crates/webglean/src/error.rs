//! Error types for webglean

use thiserror::Error;

/// Errors that can occur while rendering a page
///
/// All of these are I/O failures of the rendering collaborator. Content
/// problems are never errors: malformed HTML extracts to what it can.
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL is missing
    #[error("Missing required parameter: url")]
    MissingUrl,

    /// URL has invalid scheme
    #[error("Invalid URL: must start with http:// or https://")]
    InvalidUrlScheme,

    /// URL is blocked by prefix list
    #[error("Blocked URL: prefix not allowed")]
    BlockedUrl,

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Browser process could not be started
    #[error("Failed to launch browser: {0}")]
    BrowserLaunch(String),

    /// Page did not finish loading in time
    #[error("Navigation timed out after {0} seconds")]
    NavigationTimeout(u64),

    /// Page could not be loaded (DNS failure, crash, protocol error)
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// Server answered with a non-success status
    #[error("Navigation failed: HTTP status {0}")]
    HttpStatus(u16),

    /// Response is not a document
    #[error("Binary content is not supported: {0}")]
    BinaryContent(String),

    /// Other request error
    #[error("Request failed: {0}")]
    RequestError(String),
}

impl FetchError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            FetchError::NavigationTimeout(timeout_secs)
        } else if err.is_connect() {
            FetchError::Navigation(format!("failed to connect to server: {err}"))
        } else {
            FetchError::RequestError(err.to_string())
        }
    }
}

/// Errors that can occur during a web search
///
/// An empty result list is not an error.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Query is missing
    #[error("Missing required parameter: query")]
    MissingQuery,

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Search backend unreachable or answered with an error status
    #[error("Search provider error: {0}")]
    Http(String),

    /// Search backend answered with something that is not a result page
    #[error("Search provider returned an unparseable response: {0}")]
    Parse(String),
}
