//! webglean - read rendered web pages and search the web
//!
//! This crate fetches a page through a headless browser (or plain HTTP),
//! reduces the rendered HTML to readable text or Markdown, and runs web
//! searches that return a bounded list of results.
//!
//! ## Extraction
//!
//! [`extract`] is a pure function from raw HTML to the requested
//! [`OutputMode`]. It never fails; input that is not markup degrades to an
//! empty string.
//!
//! ## Renderers
//!
//! A [`Renderer`] turns a URL into HTML:
//! - [`BrowserRenderer`] - headless Chromium, runs page JavaScript
//! - [`HttpRenderer`] - plain HTTP GET for static pages
//!
//! ## Search
//!
//! A [`SearchProvider`] returns results in its own order;
//! [`DuckDuckGoProvider`] scrapes the HTML-only DuckDuckGo endpoint.

pub mod client;
mod convert;
mod error;
pub mod renderers;
pub mod search;
mod tool;
mod types;

pub use client::{
    fetch, fetch_with_options, fetch_with_renderer, FetchOptions, DEFAULT_NAVIGATION_TIMEOUT,
};
pub use convert::{
    extract, html_to_markdown, html_to_text, linearize, normalize_whitespace, page_title,
    sanitize, Document, Element, NodeData, NodeId,
};
pub use error::{FetchError, SearchError};
pub use renderers::{renderer_for, BrowserRenderer, HttpRenderer, RenderedPage, Renderer};
pub use search::{
    search, search_with_provider, DuckDuckGoProvider, SearchProvider, DEFAULT_DUCKDUCKGO_URL,
};
pub use tool::{Tool, ToolBuilder};
pub use types::{
    FetchRequest, FetchResponse, OutputMode, RendererKind, SearchRequest, SearchResponse,
    SearchResult, DEFAULT_SEARCH_RESULTS,
};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) webglean/0.1";

/// Fetch tool description for LLM consumption
pub const FETCH_TOOL_DESCRIPTION: &str = r#"Fetches a web page in a headless browser and returns its content.

- Runs page JavaScript before reading the document
- Returns readable text (default), Markdown, or the rendered HTML
- Strips scripts, styles, navigation and hidden elements"#;

/// Search tool description for LLM consumption
pub const SEARCH_TOOL_DESCRIPTION: &str = r#"Searches the web and returns a short list of results.

- Each result has a title, a URL and a description snippet
- Results are in search engine order
- Returns 4 results unless num_results is given"#;

/// Extended documentation for LLM consumption (llmtxt)
pub const TOOL_LLMTXT: &str = r#"# webglean

Reads rendered web pages and searches the web.

## Tools

### fetch
Loads a URL in a headless browser, waits for the page to settle and
returns its content.

### search
Runs a web search and returns up to `num_results` results.

## Input Parameters

### fetch
- `url` (required): The URL to fetch (must be http:// or https://)
- `output` (optional): "text" (default), "md" or "html"

### search
- `query` (required): The search query
- `num_results` (optional): Maximum number of results (default 4)

## Output Fields

### fetch
- `url`: The requested URL
- `final_url`: URL after redirects, when different
- `title`: Page title, when present
- `format`: "text", "md" or "html"
- `content`: The extracted content
- `renderer`: "browser" or "http"

### search
- `query`: The query that was run
- `results`: List of `{title, url, snippet, date?}`; `date` only when the engine shows one

## Examples

### Read an article as Markdown
```json
{"url": "https://example.com/post", "output": "md"}
```

### Search for documentation
```json
{"query": "tokio select macro", "num_results": 6}
```

## Error Handling
- Invalid or blocked URLs return an error
- Pages that fail to load, time out or answer with a non-2xx status return an error
- A search with no hits returns an empty list, not an error
- Pages without readable content return empty content, not an error
"#;
