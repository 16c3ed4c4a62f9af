//! DuckDuckGo search provider
//!
//! Uses the HTML-only endpoint, which needs no JavaScript and answers a
//! plain form POST.

use crate::error::SearchError;
use crate::search::SearchProvider;
use crate::types::SearchResult;
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// HTML-only DuckDuckGo endpoint
pub const DEFAULT_DUCKDUCKGO_URL: &str = "https://html.duckduckgo.com/html/";

/// Base for relative result links
const DUCKDUCKGO_ORIGIN: &str = "https://duckduckgo.com";

const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);

/// DuckDuckGo HTML scraper
#[derive(Debug, Clone)]
pub struct DuckDuckGoProvider {
    base_url: String,
    user_agent: Option<String>,
    timeout: Duration,
}

impl DuckDuckGoProvider {
    /// Create a provider for the public endpoint
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_DUCKDUCKGO_URL.to_string(),
            user_agent: None,
            timeout: SEARCH_TIMEOUT,
        }
    }

    /// Send queries to another endpoint (a mirror or a test server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the User-Agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Endpoint queries are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn client(&self) -> Result<reqwest::Client, SearchError> {
        let mut headers = HeaderMap::new();
        let user_agent = self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.timeout)
            .build()
            .map_err(SearchError::ClientBuildError)
    }
}

impl Default for DuckDuckGoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, SearchError> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("q", query)
            .finish();

        let response = self
            .client()?
            .post(&self.base_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("DuckDuckGo request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("DuckDuckGo HTTP error: {e}")))?;

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("DuckDuckGo response read failed: {e}")))?;

        debug!(bytes = html.len(), "DuckDuckGo response received");
        parse_results(&html, limit)
    }
}

/// Dates the engine prints into snippets, e.g. `Mar 5, 2024`
const SNIPPET_DATE_PATTERN: &str = r"\b([A-Z][a-z]{2,8}\.? \d{1,2}, \d{4})\b";

fn selector(css: &str) -> Result<Selector, SearchError> {
    Selector::parse(css).map_err(|e| SearchError::Parse(format!("invalid selector {css}: {e:?}")))
}

/// Parse a DuckDuckGo HTML result page
///
/// A page with neither hits nor a results container or no-results marker is
/// not a result page (a captcha, an error page) and is a parse error.
pub(crate) fn parse_results(html: &str, limit: usize) -> Result<Vec<SearchResult>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = selector(".result:not(.result--ad), .web-result:not(.result--ad)")?;
    let title_sel = selector(".result__a")?;
    let snippet_sel = selector(".result__snippet")?;
    let timestamp_sel = selector(".result__timestamp")?;
    let date_re = Regex::new(SNIPPET_DATE_PATTERN)
        .map_err(|e| SearchError::Parse(format!("invalid date pattern: {e}")))?;
    let page_sel = selector("#links, .results, .serp__results, .no-results")?;

    let mut results = Vec::new();
    for element in document.select(&result_sel) {
        if results.len() >= limit {
            break;
        }
        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };

        let title = collapsed_text(title_el);
        if title.is_empty() {
            continue;
        }
        let Some(url) = title_el.value().attr("href").and_then(extract_url) else {
            continue;
        };
        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(collapsed_text)
            .unwrap_or_default();
        let timestamp = element
            .select(&timestamp_sel)
            .next()
            .map(collapsed_text)
            .filter(|t| !t.is_empty());
        let (snippet, date) = match timestamp {
            Some(date) => (snippet, Some(date)),
            None => split_snippet_date(&date_re, &snippet),
        };

        results.push(SearchResult {
            title,
            url,
            snippet,
            date,
        });
    }

    if results.is_empty() && document.select(&page_sel).next().is_none() {
        warn!("DuckDuckGo answered with a page that has no result list");
        return Err(SearchError::Parse("no result list in page".to_string()));
    }

    debug!(count = results.len(), "DuckDuckGo results parsed");
    Ok(results)
}

/// Take a leading or embedded date out of a snippet
///
/// Returns the snippet without the date and the date itself, if any.
fn split_snippet_date(date_re: &Regex, snippet: &str) -> (String, Option<String>) {
    let Some(found) = date_re.find(snippet) else {
        return (snippet.to_string(), None);
    };

    let before = snippet[..found.start()].trim_end();
    let after = snippet[found.end()..]
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '·' | '-' | '|'));
    let rest = match (before.is_empty(), after.is_empty()) {
        (true, _) => after.to_string(),
        (false, true) => before.to_string(),
        (false, false) => format!("{before} {after}"),
    };
    (rest, Some(found.as_str().to_string()))
}

/// Element text with whitespace runs collapsed and ends trimmed
fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve a result link to the target URL
///
/// Result links are wrapped as `//duckduckgo.com/l/?uddg=<encoded target>`;
/// the wrapper is removed and relative links are made absolute.
fn extract_url(href: &str) -> Option<String> {
    let href = href.trim();
    let full_href = if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("{DUCKDUCKGO_ORIGIN}{href}")
    } else {
        href.to_string()
    };

    let parsed = Url::parse(&full_href).ok()?;
    let is_redirect = parsed
        .host_str()
        .is_some_and(|host| host == "duckduckgo.com" || host.ends_with(".duckduckgo.com"))
        && parsed.path().starts_with("/l/");

    if is_redirect {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned())
    } else if matches!(parsed.scheme(), "http" | "https") {
        Some(parsed.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<body>
<div id="links" class="results">
<div class="result results_links results_links_deep result--ad">
    <a class="result__a" href="https://ads.example.com/buy">Sponsored thing</a>
    <div class="result__snippet">Buy now</div>
</div>
<div class="result results_links results_links_deep web-result">
    <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.rust-lang.org%2F&amp;rut=abc123">
        Rust Programming
        Language
    </a>
    <a class="result__snippet" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.rust-lang.org%2F">
        A language empowering everyone to build <b>reliable</b> and efficient software.
    </a>
</div>
<div class="result results_links results_links_deep web-result">
    <a class="result__a" href="https://doc.rust-lang.org/book/">The Rust Book</a>
</div>
<div class="result results_links results_links_deep web-result">
    <a class="result__a" href="/l/?uddg=https%3A%2F%2Fen.wikipedia.org%2Fwiki%2FRust&amp;rut=def456">Rust - Wikipedia</a>
    <div class="result__snippet">Rust is a general-purpose programming language.</div>
</div>
</div>
</body>
</html>"#;

    #[test]
    fn test_parse_results() {
        let results = parse_results(RESULTS_PAGE, 10).unwrap();
        assert_eq!(results.len(), 3);

        assert_eq!(results[0].title, "Rust Programming Language");
        assert_eq!(results[0].url, "https://www.rust-lang.org/");
        assert_eq!(
            results[0].snippet,
            "A language empowering everyone to build reliable and efficient software."
        );

        assert_eq!(results[1].title, "The Rust Book");
        assert_eq!(results[1].url, "https://doc.rust-lang.org/book/");
        assert_eq!(results[1].snippet, "");

        assert_eq!(results[2].url, "https://en.wikipedia.org/wiki/Rust");
    }

    #[test]
    fn test_parse_results_dates() {
        let html = r#"<div id="links" class="results">
<div class="result web-result">
    <a class="result__a" href="https://example.com/news">News</a>
    <a class="result__snippet">Mar 5, 2024 · Something happened today.</a>
</div>
<div class="result web-result">
    <a class="result__a" href="https://example.com/post">Post</a>
    <a class="result__snippet">A post about things.</a>
    <span class="result__timestamp">2024-03-05T10:00:00</span>
</div>
</div>"#;
        let results = parse_results(html, 10).unwrap();
        assert_eq!(results[0].date.as_deref(), Some("Mar 5, 2024"));
        assert_eq!(results[0].snippet, "Something happened today.");
        assert_eq!(results[1].date.as_deref(), Some("2024-03-05T10:00:00"));
        assert_eq!(results[1].snippet, "A post about things.");

        let results = parse_results(RESULTS_PAGE, 10).unwrap();
        assert!(results.iter().all(|r| r.date.is_none()));
    }

    #[test]
    fn test_split_snippet_date() {
        let re = Regex::new(SNIPPET_DATE_PATTERN).unwrap();
        assert_eq!(
            split_snippet_date(&re, "Released on Sept. 12, 2023 with fixes"),
            ("Released on with fixes".to_string(), Some("Sept. 12, 2023".to_string()))
        );
        assert_eq!(
            split_snippet_date(&re, "section 2, 2024 notes"),
            ("section 2, 2024 notes".to_string(), None)
        );
        assert_eq!(
            split_snippet_date(&re, "no date here"),
            ("no date here".to_string(), None)
        );
    }

    #[test]
    fn test_parse_results_skips_ads() {
        let results = parse_results(RESULTS_PAGE, 10).unwrap();
        assert!(results.iter().all(|r| !r.url.contains("ads.example.com")));
    }

    #[test]
    fn test_parse_results_respects_limit() {
        let results = parse_results(RESULTS_PAGE, 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].title, "The Rust Book");
    }

    #[test]
    fn test_parse_no_results_page() {
        let html = r#"<html><body><div class="no-results">No results.</div></body></html>"#;
        assert!(parse_results(html, 4).unwrap().is_empty());

        let html = r#"<html><body><div id="links" class="results"></div></body></html>"#;
        assert!(parse_results(html, 4).unwrap().is_empty());
    }

    #[test]
    fn test_parse_unrecognized_page() {
        let html = "<html><body><h1>Are you a robot?</h1></body></html>";
        assert!(matches!(parse_results(html, 4), Err(SearchError::Parse(_))));
        assert!(matches!(parse_results("", 4), Err(SearchError::Parse(_))));
    }

    #[test]
    fn test_extract_url() {
        assert_eq!(
            extract_url("//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fpage&rut=abc"),
            Some("https://example.com/page".to_string())
        );
        assert_eq!(
            extract_url("https://html.duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.org%2F"),
            Some("https://example.org/".to_string())
        );
        assert_eq!(
            extract_url("https://example.com/direct"),
            Some("https://example.com/direct".to_string())
        );
        assert_eq!(
            extract_url("/about"),
            Some("https://duckduckgo.com/about".to_string())
        );
        assert_eq!(extract_url("not-a-url"), None);
        assert_eq!(extract_url("javascript:void(0)"), None);
    }

    #[test]
    fn test_provider_builder() {
        let provider = DuckDuckGoProvider::new();
        assert_eq!(provider.base_url(), DEFAULT_DUCKDUCKGO_URL);

        let provider = DuckDuckGoProvider::new()
            .with_base_url("http://127.0.0.1:9999/html/")
            .with_user_agent("test")
            .with_timeout(Duration::from_secs(2));
        assert_eq!(provider.base_url(), "http://127.0.0.1:9999/html/");
        assert_eq!(provider.user_agent.as_deref(), Some("test"));
        assert_eq!(provider.timeout, Duration::from_secs(2));
    }
}
