//! Batch behavior of the scraping service with a stub backend

use async_trait::async_trait;
use scrape_mcp::config::Defaults;
use scrape_mcp::{
    ErrorKind, ExtractionKind, Fault, FetchClient, FetchOptions, Scraper, UrlRequest,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const PAGE: &str = r#"
<html>
<head>
    <title>Stub Page</title>
    <meta name="description" content="A stub page">
    <meta property="og:title" content="Stub OG">
</head>
<body><h1>Welcome</h1><p>No subheadings.</p></body>
</html>
"#;

/// Answers by host name and records concurrency
#[derive(Default)]
struct StubClient {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
}

#[async_trait]
impl FetchClient for StubClient {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String, Fault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let result = if url.contains("404.example") {
            Err(Fault::Status {
                status: 404,
                message: "Not Found".into(),
            })
        } else if url.contains("timeout.example") {
            tokio::time::sleep(options.timeout + Duration::from_millis(10)).await;
            Err(Fault::Timeout("no response".into()))
        } else if url.contains("refused.example") {
            Err(Fault::Network("connection refused".into()))
        } else if url.contains("empty.example") {
            Ok(String::new())
        } else {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(PAGE.to_string())
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

fn scraper(client: Arc<StubClient>, concurrency: usize) -> Scraper {
    Scraper::new(
        client,
        Defaults {
            concurrency,
            timeout: Duration::from_millis(50),
            ..Defaults::default()
        },
    )
}

#[tokio::test]
async fn test_ok_404_timeout_scenario() {
    let scraper = scraper(Arc::new(StubClient::default()), 5);
    let results = scraper
        .run(
            ExtractionKind::Title,
            UrlRequest::batch([
                "https://ok.example",
                "https://404.example",
                "https://timeout.example",
            ]),
        )
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert!(results[0].is_success());
    assert_eq!(results[0].data(), Some(&json!("Stub Page")));
    assert_eq!(results[1].error_kind(), Some(ErrorKind::NotFoundError));
    assert_eq!(results[2].error_kind(), Some(ErrorKind::TimeoutError));
    assert_eq!(results[1].url(), "https://404.example");
}

#[tokio::test]
async fn test_single_url_matches_one_element_batch() {
    let scraper = scraper(Arc::new(StubClient::default()), 5);
    let single = scraper
        .run(ExtractionKind::OpenGraph, UrlRequest::single("https://ok.example"))
        .await
        .unwrap();
    let batch = scraper
        .run(ExtractionKind::OpenGraph, UrlRequest::batch(["https://ok.example"]))
        .await
        .unwrap();

    assert_eq!(single, batch);
    assert_eq!(single[0].data(), Some(&json!({"title": "Stub OG"})));
}

#[tokio::test]
async fn test_one_failure_among_successes() {
    let scraper = scraper(Arc::new(StubClient::default()), 2);
    let urls: Vec<String> = (0..5)
        .map(|i| {
            if i == 3 {
                "https://refused.example".to_string()
            } else {
                format!("https://ok.example/{}", i)
            }
        })
        .collect();

    let results = scraper
        .run(ExtractionKind::MetaDescription, UrlRequest::batch(urls.clone()))
        .await
        .unwrap();

    assert_eq!(results.len(), 5);
    for (i, env) in results.iter().enumerate() {
        assert_eq!(env.url(), urls[i]);
        if i == 3 {
            assert_eq!(env.error_kind(), Some(ErrorKind::NetworkError));
        } else {
            assert_eq!(env.data(), Some(&json!("A stub page")));
        }
    }
}

#[tokio::test]
async fn test_concurrency_never_exceeds_ceiling() {
    let client = Arc::new(StubClient::default());
    let scraper = scraper(Arc::clone(&client), 3);
    let urls: Vec<String> = (0..9).map(|i| format!("https://ok.example/{}", i)).collect();

    let results = scraper
        .run(ExtractionKind::Html, UrlRequest::batch(urls))
        .await
        .unwrap();

    assert_eq!(results.len(), 9);
    assert_eq!(client.calls.load(Ordering::SeqCst), 9);
    assert!(client.max_in_flight.load(Ordering::SeqCst) <= 3);
}

#[tokio::test]
async fn test_missing_headers_are_empty_success() {
    let scraper = scraper(Arc::new(StubClient::default()), 5);
    let results = scraper
        .run(ExtractionKind::H2, UrlRequest::single("https://ok.example"))
        .await
        .unwrap();

    assert!(results[0].is_success());
    assert_eq!(results[0].data(), Some(&json!([])));
}

#[tokio::test]
async fn test_empty_document_is_parsing_error() {
    let scraper = scraper(Arc::new(StubClient::default()), 5);
    let results = scraper
        .run(ExtractionKind::H1, UrlRequest::single("https://empty.example"))
        .await
        .unwrap();

    assert_eq!(results[0].error_kind(), Some(ErrorKind::ParsingError));
}

#[tokio::test]
async fn test_malformed_request_fails_before_fetching() {
    let client = Arc::new(StubClient::default());
    let scraper = scraper(Arc::clone(&client), 5);
    let err = scraper
        .run(
            ExtractionKind::Title,
            UrlRequest::batch(["https://ok.example", "not-a-url"]),
        )
        .await
        .unwrap_err();

    assert!(err.to_string().contains("not-a-url"));
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}
