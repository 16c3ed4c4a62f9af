//! Tool builder and contract for webglean
//!
//! One [`Tool`] carries the configuration shared by the command line and the
//! tool-protocol server, and exposes the `fetch` and `search` operations
//! with their generated JSON schemas.

use crate::client::{fetch_with_options, FetchOptions, DEFAULT_NAVIGATION_TIMEOUT};
use crate::error::{FetchError, SearchError};
use crate::search::{search_with_provider, DuckDuckGoProvider};
use crate::types::{FetchRequest, FetchResponse, RendererKind, SearchRequest, SearchResponse};
use crate::{FETCH_TOOL_DESCRIPTION, SEARCH_TOOL_DESCRIPTION, TOOL_LLMTXT};
use schemars::schema_for;
use std::path::PathBuf;
use std::time::Duration;

/// Builder for configuring the tool
#[derive(Debug, Clone)]
pub struct ToolBuilder {
    renderer: RendererKind,
    browser_path: Option<PathBuf>,
    navigation_timeout: Duration,
    user_agent: Option<String>,
    allow_prefixes: Vec<String>,
    block_prefixes: Vec<String>,
    search_base_url: Option<String>,
}

impl Default for ToolBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolBuilder {
    /// Create a new tool builder with default settings
    pub fn new() -> Self {
        Self {
            renderer: RendererKind::default(),
            browser_path: None,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            user_agent: None,
            allow_prefixes: Vec::new(),
            block_prefixes: Vec::new(),
            search_base_url: None,
        }
    }

    /// Select the renderer
    pub fn renderer(mut self, renderer: RendererKind) -> Self {
        self.renderer = renderer;
        self
    }

    /// Use a specific browser executable
    pub fn browser_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.browser_path = Some(path.into());
        self
    }

    /// Set the navigation timeout
    pub fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Add URL prefix to allow list
    pub fn allow_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.allow_prefixes.push(prefix.into());
        self
    }

    /// Add URL prefix to block list
    pub fn block_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.block_prefixes.push(prefix.into());
        self
    }

    /// Send search queries to another DuckDuckGo-compatible endpoint
    pub fn search_base_url(mut self, url: impl Into<String>) -> Self {
        self.search_base_url = Some(url.into());
        self
    }

    /// Build the tool
    pub fn build(self) -> Tool {
        Tool {
            renderer: self.renderer,
            browser_path: self.browser_path,
            navigation_timeout: self.navigation_timeout,
            user_agent: self.user_agent,
            allow_prefixes: self.allow_prefixes,
            block_prefixes: self.block_prefixes,
            search_base_url: self.search_base_url,
        }
    }
}

/// Configured fetch and search tool
#[derive(Debug, Clone)]
pub struct Tool {
    renderer: RendererKind,
    browser_path: Option<PathBuf>,
    navigation_timeout: Duration,
    user_agent: Option<String>,
    allow_prefixes: Vec<String>,
    block_prefixes: Vec<String>,
    search_base_url: Option<String>,
}

impl Default for Tool {
    fn default() -> Self {
        ToolBuilder::new().build()
    }
}

impl Tool {
    /// Create a new tool builder
    pub fn builder() -> ToolBuilder {
        ToolBuilder::new()
    }

    /// Description of the fetch operation
    pub fn fetch_description(&self) -> &'static str {
        FETCH_TOOL_DESCRIPTION
    }

    /// Description of the search operation
    pub fn search_description(&self) -> &'static str {
        SEARCH_TOOL_DESCRIPTION
    }

    /// Get full documentation (llmtxt)
    pub fn llmtxt(&self) -> &'static str {
        TOOL_LLMTXT
    }

    /// Input schema of the fetch operation
    pub fn fetch_input_schema(&self) -> serde_json::Value {
        serde_json::to_value(schema_for!(FetchRequest)).unwrap_or_default()
    }

    /// Output schema of the fetch operation
    pub fn fetch_output_schema(&self) -> serde_json::Value {
        serde_json::to_value(schema_for!(FetchResponse)).unwrap_or_default()
    }

    /// Input schema of the search operation
    pub fn search_input_schema(&self) -> serde_json::Value {
        serde_json::to_value(schema_for!(SearchRequest)).unwrap_or_default()
    }

    /// Output schema of the search operation
    pub fn search_output_schema(&self) -> serde_json::Value {
        serde_json::to_value(schema_for!(SearchResponse)).unwrap_or_default()
    }

    /// Fetch options derived from this configuration
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            renderer: self.renderer,
            browser_path: self.browser_path.clone(),
            navigation_timeout: self.navigation_timeout,
            user_agent: self.user_agent.clone(),
            allow_prefixes: self.allow_prefixes.clone(),
            block_prefixes: self.block_prefixes.clone(),
        }
    }

    /// Search provider derived from this configuration
    pub fn search_provider(&self) -> DuckDuckGoProvider {
        let mut provider = DuckDuckGoProvider::new();
        if let Some(url) = &self.search_base_url {
            provider = provider.with_base_url(url.clone());
        }
        if let Some(ua) = &self.user_agent {
            provider = provider.with_user_agent(ua.clone());
        }
        provider
    }

    /// Fetch a page
    pub async fn execute_fetch(&self, req: FetchRequest) -> Result<FetchResponse, FetchError> {
        fetch_with_options(req, self.fetch_options()).await
    }

    /// Search the web
    pub async fn execute_search(&self, req: SearchRequest) -> Result<SearchResponse, SearchError> {
        search_with_provider(req, &self.search_provider()).await
    }
}
