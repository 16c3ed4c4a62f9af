//! Core types for webglean

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default number of search results
pub const DEFAULT_SEARCH_RESULTS: usize = 4;

/// Representation of the fetched page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// The rendered HTML, untouched
    Html,
    /// Readable plain text
    #[default]
    Text,
    /// Markdown
    #[serde(rename = "md", alias = "markdown")]
    Markdown,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(OutputMode::Html),
            "text" => Ok(OutputMode::Text),
            "md" | "markdown" => Ok(OutputMode::Markdown),
            _ => Err("Invalid output: must be html, text or md".to_string()),
        }
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputMode::Html => write!(f, "html"),
            OutputMode::Text => write!(f, "text"),
            OutputMode::Markdown => write!(f, "md"),
        }
    }
}

/// Which collaborator turns a URL into HTML
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Headless Chromium, runs page JavaScript
    #[default]
    Browser,
    /// Plain HTTP GET, no JavaScript
    Http,
}

impl FromStr for RendererKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "browser" => Ok(RendererKind::Browser),
            "http" => Ok(RendererKind::Http),
            _ => Err("Invalid renderer: must be browser or http".to_string()),
        }
    }
}

impl std::fmt::Display for RendererKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RendererKind::Browser => write!(f, "browser"),
            RendererKind::Http => write!(f, "http"),
        }
    }
}

/// Request to fetch a URL
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FetchRequest {
    /// The URL to fetch (required, must be http:// or https://)
    pub url: String,

    /// Output format: "html", "text" or "md" (optional, default "text")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputMode>,
}

impl FetchRequest {
    /// Create a new request with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the output mode
    pub fn output(mut self, output: OutputMode) -> Self {
        self.output = Some(output);
        self
    }

    /// Request Markdown
    pub fn as_markdown(self) -> Self {
        self.output(OutputMode::Markdown)
    }

    /// Request plain text
    pub fn as_text(self) -> Self {
        self.output(OutputMode::Text)
    }

    /// Request the rendered HTML
    pub fn as_html(self) -> Self {
        self.output(OutputMode::Html)
    }

    /// Get the effective output mode (default to text)
    pub fn effective_output(&self) -> OutputMode {
        self.output.unwrap_or_default()
    }
}

/// Response from a fetch operation
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FetchResponse {
    /// The requested URL
    pub url: String,

    /// URL after redirects, when it differs from the requested one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,

    /// Page title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Output format of `content`
    pub format: OutputMode,

    /// The extracted content
    pub content: String,

    /// Renderer that produced the HTML
    pub renderer: RendererKind,
}

/// Request to search the web
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchRequest {
    /// The search query (required)
    pub query: String,

    /// Maximum number of results (optional, default 4)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_results: Option<usize>,
}

impl SearchRequest {
    /// Create a new request for the given query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set the maximum number of results
    pub fn num_results(mut self, n: usize) -> Self {
        self.num_results = Some(n);
        self
    }

    /// Get the effective result count (default 4)
    pub fn effective_num_results(&self) -> usize {
        self.num_results.unwrap_or(DEFAULT_SEARCH_RESULTS)
    }
}

/// A single search hit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchResult {
    /// Result title
    pub title: String,
    /// Target URL
    pub url: String,
    /// Description snippet shown by the search engine
    pub snippet: String,
    /// Publication date as the search engine printed it (`Mar 5, 2024`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Response from a search operation
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchResponse {
    /// The query that was run
    pub query: String,
    /// Results in provider order, at most the requested count
    pub results: Vec<SearchResult>,
}
