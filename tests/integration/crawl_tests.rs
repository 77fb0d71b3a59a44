//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use sitecrawl::config::CrawlConfig;
use sitecrawl::crawler::Completion;
use sitecrawl::storage::{sink_for_path, CSV_HEADER};
use sitecrawl::Coordinator;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration for a seed URL
fn create_test_config(seed: &str, max_depth: usize) -> CrawlConfig {
    let mut config = CrawlConfig::new(seed);
    config.max_depth = max_depth;
    config.workers = 3;
    config.rate_interval = Duration::from_millis(1);
    config.fetch_timeout = Duration::from_secs(5);
    config.user_agent.name = "TestBot".to_string();
    config.user_agent.version = "1.0.0".to_string();
    config
}

fn html_page(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, page_path: &str, body: impl Into<String>) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html_page(body))
        .mount(server)
        .await;
}

fn sorted_urls(results: &[sitecrawl::PageResult]) -> Vec<String> {
    let mut urls: Vec<String> = results.iter().map(|r| r.url.clone()).collect();
    urls.sort();
    urls
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        format!(
            r#"<html><head><title>Home</title></head><body>
            <a href="/page1">Page 1</a>
            <a href="{}/page2?utm_source=nav">Page 2</a>
            </body></html>"#,
            base_url
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/page1/",
        r#"<html><head><title>Page 1</title></head><body>
        <a href="/">Home</a>
        <a href="../page2/">Page 2</a>
        <a href="/page3">Page 3</a>
        </body></html>"#,
    )
    .await;
    mount_page(
        &mock_server,
        "/page2/",
        r#"<html><head><title>Page 2</title></head><body><a href="/">Home</a></body></html>"#,
    )
    .await;
    mount_page(
        &mock_server,
        "/page3/",
        r#"<html><head><title>Page 3</title></head><body><a href="/page4">Too deep</a></body></html>"#,
    )
    .await;
    mount_page(&mock_server, "/page4/", "<title>Page 4</title>").await;

    let coordinator = Coordinator::new(create_test_config(&base_url, 2)).unwrap();
    let outcome = coordinator.start().await.unwrap();

    assert_eq!(outcome.completion, Completion::Finished);
    assert_eq!(
        sorted_urls(&outcome.results),
        vec![
            format!("{}/", base_url),
            format!("{}/page1/", base_url),
            format!("{}/page2/", base_url),
            format!("{}/page3/", base_url),
        ]
    );

    for result in &outcome.results {
        assert!(result.depth <= 2, "{} at depth {}", result.url, result.depth);
        assert_eq!(result.status_code, 200);
        assert!(result.content_length > 0);
    }

    let home = outcome
        .results
        .iter()
        .find(|r| r.url == format!("{}/", base_url))
        .unwrap();
    assert_eq!(home.title, "Home");
    assert_eq!(home.depth, 0);
    assert_eq!(
        home.links,
        vec![format!("{}/page1/", base_url), format!("{}/page2/", base_url)]
    );

    // Every page is requested once even though it is linked several times
    let requests = mock_server.received_requests().await.unwrap();
    let mut paths: Vec<String> = requests.iter().map(|r| r.url.path().to_string()).collect();
    paths.sort();
    assert_eq!(paths, vec!["/", "/page1/", "/page2/", "/page3/"]);
}

#[tokio::test]
async fn test_crawl_ignores_other_domains_and_fragments() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r##"<html><body>
        <a href="/a">A</a>
        <a href="https://other.com/b">Elsewhere</a>
        <a href="#frag">Fragment</a>
        </body></html>"##,
    )
    .await;
    mount_page(&mock_server, "/a/", "<title>A</title>").await;

    let coordinator = Coordinator::new(create_test_config(&base_url, 1)).unwrap();
    let outcome = coordinator.start().await.unwrap();

    assert_eq!(
        sorted_urls(&outcome.results),
        vec![format!("{}/", base_url), format!("{}/a/", base_url)]
    );

    let home = outcome.results.iter().find(|r| r.depth == 0).unwrap();
    assert_eq!(
        home.links,
        vec![format!("{}/a/", base_url), "https://other.com/b/".to_string()]
    );
}

#[tokio::test]
async fn test_error_pages_are_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<body>
        <a href="/missing">Missing</a>
        <a href="/broken">Broken</a>
        <a href="/data">Data</a>
        <a href="/ok">Ok</a>
        </body>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"links": ["/hidden"]}"#, "application/json"),
        )
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/ok/", "<title>Ok</title>").await;

    let coordinator = Coordinator::new(create_test_config(&base_url, 2)).unwrap();
    let outcome = coordinator.start().await.unwrap();

    assert_eq!(outcome.completion, Completion::Finished);
    assert_eq!(
        sorted_urls(&outcome.results),
        vec![format!("{}/", base_url), format!("{}/ok/", base_url)]
    );
}

#[tokio::test]
async fn test_links_resolve_against_redirect_target() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/old/">Old</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/old/"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/docs/new/"))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/docs/new/", r#"<a href="child">Child</a>"#).await;
    mount_page(&mock_server, "/docs/new/child/", "<title>Child</title>").await;

    let coordinator = Coordinator::new(create_test_config(&base_url, 3)).unwrap();
    let outcome = coordinator.start().await.unwrap();

    let old = outcome
        .results
        .iter()
        .find(|r| r.url == format!("{}/old/", base_url))
        .unwrap();
    assert_eq!(old.links, vec![format!("{}/docs/new/child/", base_url)]);
    assert!(outcome
        .results
        .iter()
        .any(|r| r.url == format!("{}/docs/new/child/", base_url) && r.depth == 2));
}

#[tokio::test]
async fn test_slow_pages_time_out() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/slow">Slow</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/slow/"))
        .respond_with(html_page("<title>Slow</title>").set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url, 2);
    config.fetch_timeout = Duration::from_millis(300);

    let coordinator = Coordinator::new(config).unwrap();
    let outcome = coordinator.start().await.unwrap();

    assert_eq!(outcome.completion, Completion::Finished);
    assert_eq!(outcome.results.len(), 1);
    assert!(outcome.elapsed < Duration::from_secs(5));
}

#[tokio::test]
async fn test_stop_during_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(html_page("<title>Slow</title>").set_delay(Duration::from_secs(30)))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url, 2);
    config.fetch_timeout = Duration::from_secs(60);

    let coordinator = Arc::new(Coordinator::new(config).unwrap());
    let running = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.start().await })
    };

    while mock_server
        .received_requests()
        .await
        .map_or(true, |requests| requests.is_empty())
    {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    tokio::time::timeout(Duration::from_secs(5), coordinator.stop())
        .await
        .expect("stop should return promptly");

    let outcome = running.await.unwrap().unwrap();
    assert_eq!(outcome.completion, Completion::Cancelled);
    assert!(outcome.results.is_empty());

    // Stopping again is a no-op
    tokio::time::timeout(Duration::from_secs(1), coordinator.stop())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_results_saved_as_json() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<title>Home</title><a href="/a">A</a>"#).await;
    mount_page(&mock_server, "/a/", "<title>A</title>").await;

    let dir = tempdir().unwrap();
    let output = dir.path().join("results.json");

    let coordinator = Coordinator::new(create_test_config(&base_url, 2))
        .unwrap()
        .with_sink(sink_for_path(&output));
    let outcome = coordinator.start().await.unwrap();
    assert!(outcome.save_error.is_none());

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(saved["count"], 2);
    assert_eq!(saved["results"].as_array().unwrap().len(), 2);
    assert!(saved["timestamp"].is_string());
}

#[tokio::test]
async fn test_results_saved_as_csv() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<title>Home</title><a href="/a">A</a><a href="/b">B</a><a href="https://other.com/">X</a>"#,
    )
    .await;
    mount_page(&mock_server, "/a/", "<title>A</title>").await;
    mount_page(&mock_server, "/b/", "<title>B</title>").await;

    let dir = tempdir().unwrap();
    let output = dir.path().join("results.csv");

    let coordinator = Coordinator::new(create_test_config(&base_url, 1))
        .unwrap()
        .with_sink(sink_for_path(&output));
    coordinator.start().await.unwrap();

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(headers, CSV_HEADER);

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);

    let home = rows.iter().find(|row| &row[0] == format!("{}/", base_url)).unwrap();
    assert_eq!(&home[1], "Home");
    assert_eq!(&home[4], "3");
    assert_eq!(&home[5], "0");
}
