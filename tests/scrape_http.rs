// tests/scrape_http.rs
//
// HttpScraper against a mock site: direct fetch, reader fallback, the
// no-fallback error path, and the redirect host guard.

use std::time::Duration;

use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use company_enricher::config::ScraperSettings;
use company_enricher::error::ScrapeError;
use company_enricher::scrape::{ContentSource, HttpScraper};

fn scraper(fallback: Option<(&str, String)>) -> HttpScraper {
    let settings = match fallback {
        Some((key, url)) => ScraperSettings {
            fallback_api_key: Some(key.to_string()),
            fallback_url: url,
        },
        None => ScraperSettings::default(),
    };
    let http = HttpScraper::client(Duration::from_secs(5)).expect("scraper client");
    HttpScraper::new(http, settings)
}

#[tokio::test]
async fn direct_fetch_returns_visible_text() {
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><head><script>track()</script></head><body><h1>Acme</h1><p>Anvils &amp; more</p></body></html>",
            "text/html",
        ))
        .expect(1)
        .mount(&site)
        .await;

    let text = scraper(None)
        .fetch(&format!("{}/", site.uri()))
        .await
        .expect("direct fetch");
    assert_eq!(text, "Acme Anvils & more");
}

#[tokio::test]
async fn failed_fetch_uses_reader_when_key_configured() {
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/blocked"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .and(path_regex("^/reader/"))
        .and(header("authorization", "Bearer reader-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Title: Acme\n\n  Rendered   text"))
        .expect(1)
        .mount(&site)
        .await;

    let text = scraper(Some(("reader-key", format!("{}/reader/", site.uri()))))
        .fetch(&format!("{}/blocked", site.uri()))
        .await
        .expect("reader fallback");
    assert_eq!(text, "Title: Acme Rendered text");
}

#[tokio::test]
async fn failed_fetch_without_key_is_an_error() {
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&site)
        .await;

    let err = scraper(None)
        .fetch(&format!("{}/", site.uri()))
        .await
        .expect_err("no fallback configured");
    assert!(matches!(err, ScrapeError::Status(500)));
}

#[tokio::test]
async fn page_without_text_is_empty_error() {
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<div><img src=x></div>", "text/html"))
        .mount(&site)
        .await;

    let err = scraper(None)
        .fetch(&format!("{}/", site.uri()))
        .await
        .expect_err("empty page");
    assert!(matches!(err, ScrapeError::Empty));
}

#[tokio::test]
async fn redirect_to_disallowed_host_is_refused() {
    let site = MockServer::start().await;
    let port = site.address().port();

    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("http://localhost:{port}/internal")),
        )
        .expect(1)
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .and(path("/internal"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>secret</p>", "text/html"))
        .expect(0)
        .mount(&site)
        .await;

    let err = scraper(None)
        .fetch(&format!("{}/moved", site.uri()))
        .await
        .expect_err("redirect must not be followed");
    assert!(matches!(err, ScrapeError::Fetch(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn redirect_to_link_local_metadata_is_refused() {
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", "http://169.254.169.254/latest/meta-data/"),
        )
        .expect(1)
        .mount(&site)
        .await;

    let err = scraper(None)
        .fetch(&format!("{}/", site.uri()))
        .await
        .expect_err("metadata endpoint must not be reached");
    assert!(matches!(err, ScrapeError::Fetch(_)), "unexpected error: {err}");
}
