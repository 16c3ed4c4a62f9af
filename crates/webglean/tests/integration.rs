//! Integration tests for webglean using wiremock

use webglean::{
    fetch_with_options, search_with_provider, DuckDuckGoProvider, FetchError, FetchOptions,
    FetchRequest, OutputMode, RendererKind, SearchError, SearchRequest, Tool,
};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("webglean=debug")
        .try_init();
}

fn http_options() -> FetchOptions {
    FetchOptions {
        renderer: RendererKind::Http,
        ..Default::default()
    }
}

const ARTICLE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Test Article</title><style>body { color: red; }</style></head>
<body>
    <nav><a href="/">Home</a> <a href="/about">About</a></nav>
    <h1>Hello World</h1>
    <p>This is a <strong>test</strong> paragraph with a <a href="https://example.com/more">link</a>.</p>
    <ul>
        <li>Item 1</li>
        <li>Item 2</li>
    </ul>
    <script>document.write("tracking");</script>
    <footer>Copyright</footer>
</body>
</html>"#;

async fn serve_article() -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ARTICLE, "text/html"))
        .mount(&mock_server)
        .await;
    mock_server
}

#[tokio::test]
async fn test_fetch_markdown() {
    init_tracing();
    let mock_server = serve_article().await;

    let req = FetchRequest::new(format!("{}/article", mock_server.uri())).as_markdown();
    let resp = fetch_with_options(req, http_options()).await.unwrap();

    assert_eq!(resp.format, OutputMode::Markdown);
    assert_eq!(resp.renderer, RendererKind::Http);
    assert_eq!(resp.title.as_deref(), Some("Test Article"));
    assert_eq!(
        resp.content,
        "# Hello World\n\nThis is a **test** paragraph with a [link](https://example.com/more).\n\n- Item 1\n- Item 2"
    );
}

#[tokio::test]
async fn test_fetch_text() {
    init_tracing();
    let mock_server = serve_article().await;

    let req = FetchRequest::new(format!("{}/article", mock_server.uri())).as_text();
    let resp = fetch_with_options(req, http_options()).await.unwrap();

    assert_eq!(resp.format, OutputMode::Text);
    assert_eq!(
        resp.content,
        "Hello World\nThis is a test paragraph with a link.\nItem 1\nItem 2"
    );
    assert!(!resp.content.contains("tracking"));
    assert!(!resp.content.contains("Copyright"));
    assert!(!resp.content.contains("color: red"));
}

#[tokio::test]
async fn test_fetch_html_is_raw() {
    let mock_server = serve_article().await;

    let req = FetchRequest::new(format!("{}/article", mock_server.uri())).as_html();
    let resp = fetch_with_options(req, http_options()).await.unwrap();

    assert_eq!(resp.format, OutputMode::Html);
    assert_eq!(resp.content, ARTICLE);
}

#[tokio::test]
async fn test_fetch_sends_user_agent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "TestAgent/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>ok</p>", "text/html"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let tool = Tool::builder()
        .renderer(RendererKind::Http)
        .user_agent("TestAgent/1.0")
        .build();
    let resp = tool
        .execute_fetch(FetchRequest::new(format!("{}/", mock_server.uri())))
        .await
        .unwrap();
    assert_eq!(resp.content, "ok");
}

#[tokio::test]
async fn test_fetch_follows_redirect() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new", mock_server.uri())),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>moved</p>", "text/html"))
        .mount(&mock_server)
        .await;

    let req = FetchRequest::new(format!("{}/old", mock_server.uri()));
    let resp = fetch_with_options(req, http_options()).await.unwrap();

    assert_eq!(resp.content, "moved");
    assert_eq!(resp.final_url, Some(format!("{}/new", mock_server.uri())));
}

#[tokio::test]
async fn test_fetch_404_is_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_raw("<h1>Not Found</h1>", "text/html"))
        .mount(&mock_server)
        .await;

    let req = FetchRequest::new(format!("{}/missing", mock_server.uri()));
    let result = fetch_with_options(req, http_options()).await;

    assert!(matches!(result, Err(FetchError::HttpStatus(404))));
}

#[tokio::test]
async fn test_fetch_5xx_is_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let req = FetchRequest::new(format!("{}/", mock_server.uri()));
    let result = fetch_with_options(req, http_options()).await;

    assert!(matches!(result, Err(FetchError::HttpStatus(503))));
}

#[tokio::test]
async fn test_fetch_binary_content_is_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/image.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0x89, 0x50, 0x4E, 0x47], "image/png"))
        .mount(&mock_server)
        .await;

    let req = FetchRequest::new(format!("{}/image.png", mock_server.uri()));
    let result = fetch_with_options(req, http_options()).await;

    match result {
        Err(FetchError::BinaryContent(ct)) => assert_eq!(ct, "image/png"),
        other => panic!("expected binary content error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_empty_page() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("", "text/html"))
        .mount(&mock_server)
        .await;

    let req = FetchRequest::new(format!("{}/", mock_server.uri())).as_markdown();
    let resp = fetch_with_options(req, http_options()).await.unwrap();

    assert_eq!(resp.content, "");
    assert!(resp.title.is_none());
}

#[tokio::test]
async fn test_fetch_timeout() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<p>slow</p>", "text/html")
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let options = FetchOptions {
        navigation_timeout: std::time::Duration::from_secs(1),
        ..http_options()
    };
    let req = FetchRequest::new(format!("{}/", mock_server.uri()));
    let result = fetch_with_options(req, options).await;

    assert!(matches!(result, Err(FetchError::NavigationTimeout(1))));
}

#[tokio::test]
async fn test_url_prefix_lists() {
    let mock_server = serve_article().await;
    let url = format!("{}/article", mock_server.uri());

    let options = FetchOptions {
        allow_prefixes: vec!["https://allowed.example.com".to_string()],
        ..http_options()
    };
    let result = fetch_with_options(FetchRequest::new(&url), options).await;
    assert!(matches!(result, Err(FetchError::BlockedUrl)));

    let options = FetchOptions {
        block_prefixes: vec![mock_server.uri()],
        ..http_options()
    };
    let result = fetch_with_options(FetchRequest::new(&url), options).await;
    assert!(matches!(result, Err(FetchError::BlockedUrl)));

    let options = FetchOptions {
        allow_prefixes: vec![mock_server.uri()],
        ..http_options()
    };
    assert!(fetch_with_options(FetchRequest::new(&url), options).await.is_ok());
}

#[tokio::test]
async fn test_invalid_url_scheme() {
    let result = fetch_with_options(FetchRequest::new("file:///etc/passwd"), http_options()).await;
    assert!(matches!(result, Err(FetchError::InvalidUrlScheme)));
}

#[tokio::test]
async fn test_missing_url() {
    let result = fetch_with_options(FetchRequest::new(""), http_options()).await;
    assert!(matches!(result, Err(FetchError::MissingUrl)));
}

fn results_page(count: usize) -> String {
    let mut html = String::from(r#"<html><body><div id="links" class="results">"#);
    html.push_str(
        r#"<div class="result result--ad"><a class="result__a" href="https://ads.example.com/">Ad</a></div>"#,
    );
    for i in 1..=count {
        html.push_str(&format!(
            r#"<div class="result results_links web-result">
                <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fsite{i}.example.com%2F&amp;rut=x">Site {i}</a>
                <a class="result__snippet" href="//duckduckgo.com/l/?uddg=x">About site {i}</a>
            </div>"#
        ));
    }
    html.push_str("</div></body></html>");
    html
}

async fn serve_search(body: String) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/html/"))
        .and(body_string_contains("q=rust+async"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(&mock_server)
        .await;
    mock_server
}

fn provider_for(mock_server: &MockServer) -> DuckDuckGoProvider {
    DuckDuckGoProvider::new().with_base_url(format!("{}/html/", mock_server.uri()))
}

#[tokio::test]
async fn test_search_truncates_to_count() {
    init_tracing();
    let mock_server = serve_search(results_page(10)).await;

    let req = SearchRequest::new("rust async").num_results(6);
    let resp = search_with_provider(req, &provider_for(&mock_server))
        .await
        .unwrap();

    assert_eq!(resp.query, "rust async");
    assert_eq!(resp.results.len(), 6);
    for (i, result) in resp.results.iter().enumerate() {
        let n = i + 1;
        assert_eq!(result.title, format!("Site {n}"));
        assert_eq!(result.url, format!("https://site{n}.example.com/"));
        assert_eq!(result.snippet, format!("About site {n}"));
    }
}

#[tokio::test]
async fn test_search_default_count() {
    let mock_server = serve_search(results_page(10)).await;

    let tool = Tool::builder()
        .search_base_url(format!("{}/html/", mock_server.uri()))
        .build();
    let resp = tool
        .execute_search(SearchRequest::new("rust async"))
        .await
        .unwrap();

    assert_eq!(resp.results.len(), 4);
}

#[tokio::test]
async fn test_search_fewer_results_than_requested() {
    let mock_server = serve_search(results_page(2)).await;

    let req = SearchRequest::new("rust async").num_results(8);
    let resp = search_with_provider(req, &provider_for(&mock_server))
        .await
        .unwrap();

    assert_eq!(resp.results.len(), 2);
}

#[tokio::test]
async fn test_search_no_results() {
    let mock_server = serve_search(
        r#"<html><body><div class="no-results">No results found for <b>rust async</b>.</div></body></html>"#
            .to_string(),
    )
    .await;

    let req = SearchRequest::new("rust async");
    let resp = search_with_provider(req, &provider_for(&mock_server))
        .await
        .unwrap();

    assert!(resp.results.is_empty());
}

#[tokio::test]
async fn test_search_unrecognized_page() {
    let mock_server = serve_search("<html><body><p>Please verify you are human</p></body></html>".to_string()).await;

    let req = SearchRequest::new("rust async");
    let result = search_with_provider(req, &provider_for(&mock_server)).await;

    assert!(matches!(result, Err(SearchError::Parse(_))));
}

#[tokio::test]
async fn test_search_http_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let req = SearchRequest::new("rust async");
    let result = search_with_provider(req, &provider_for(&mock_server)).await;

    assert!(matches!(result, Err(SearchError::Http(_))));
}

#[tokio::test]
async fn test_search_zero_count_sends_nothing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(results_page(3), "text/html"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let req = SearchRequest::new("rust async").num_results(0);
    let resp = search_with_provider(req, &provider_for(&mock_server))
        .await
        .unwrap();

    assert!(resp.results.is_empty());
}
