//! Integration tests for the HTTP product fetcher against a mock server

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use catalog::{FetchError, FetchErrorKind, HttpProductFetcher, ProductFetcher, ProductId};
use serde_json::json;
use std::time::Duration;
use storefront_testing::helpers::init_test_tracing;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

fn fetcher(server: &MockServer) -> HttpProductFetcher {
    init_test_tracing();
    HttpProductFetcher::new(&server.uri(), TIMEOUT, "catalog-test").unwrap()
}

fn record(id: i64, category: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": format!("Item {id}"),
        "price": 12.5,
        "description": "A thing",
        "category": category,
        "image": format!("https://img.example/{id}.png"),
        "rating": { "rate": 4.2, "count": 7 }
    })
}

#[tokio::test]
async fn fetches_products_in_source_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .and(header("user-agent", "catalog-test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([
                record(3, "electronics"),
                record(1, "jewelery"),
                record(2, "electronics"),
            ])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let products = fetcher(&server).fetch_all().await.unwrap();

    let ids: Vec<ProductId> = products.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![ProductId::new(3), ProductId::new(1), ProductId::new(2)]);
    assert_eq!(products[1].image_url, "https://img.example/1.png");
    assert_eq!(products[1].rating.count, 7);
}

#[tokio::test]
async fn empty_catalog_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    assert_eq!(fetcher(&server).fetch_all().await.unwrap(), Vec::new());
}

#[tokio::test]
async fn server_error_is_transport() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let error = fetcher(&server).fetch_all().await.unwrap_err();
    assert_eq!(error.kind(), FetchErrorKind::Transport);
    assert!(error.to_string().contains("503"), "{error}");
}

#[tokio::test]
async fn unparseable_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let error = fetcher(&server).fetch_all().await.unwrap_err();
    assert_eq!(error.kind(), FetchErrorKind::MalformedData);
}

#[tokio::test]
async fn one_invalid_record_fails_the_fetch() {
    let server = MockServer::start().await;
    let mut bad = record(2, "electronics");
    bad["price"] = json!(-1.0);
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([record(1, "a"), bad])))
        .mount(&server)
        .await;

    match fetcher(&server).fetch_all().await {
        Err(FetchError::MalformedData(message)) => assert!(message.contains("record 1"), "{message}"),
        other => panic!("expected malformed data, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_server_times_out_as_transport() {
    init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let fetcher =
        HttpProductFetcher::new(&server.uri(), Duration::from_millis(100), "catalog-test").unwrap();
    let error = fetcher.fetch_all().await.unwrap_err();
    assert_eq!(error.kind(), FetchErrorKind::Transport);
}

#[tokio::test]
async fn unreachable_host_is_transport() {
    init_test_tracing();
    // Bind then release a port so nothing is listening on it
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let fetcher =
        HttpProductFetcher::new(&format!("http://127.0.0.1:{port}"), TIMEOUT, "catalog-test")
            .unwrap();
    let error = fetcher.fetch_all().await.unwrap_err();
    assert_eq!(error.kind(), FetchErrorKind::Transport);
    assert!(error.to_string().starts_with("Network error: "));
}
