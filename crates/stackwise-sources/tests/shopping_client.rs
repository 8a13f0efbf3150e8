//! Integration tests for `ShoppingClient` using wiremock HTTP mocks.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stackwise_sources::{ClientOptions, ShoppingClient, SourceError};

fn options(max_retries: u32) -> ClientOptions {
    ClientOptions {
        timeout_secs: 5,
        user_agent: "stackwise-test/0.1".to_owned(),
        max_retries,
        backoff_base_secs: 0,
    }
}

fn test_client(base_url: &str) -> ShoppingClient {
    ShoppingClient::with_base_url(Some("test-key".to_owned()), &options(0), base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn search_merges_inline_then_organic_results_in_order() {
    let server = MockServer::start().await;

    let body = json!({
        "inline_shopping_results": [
            { "title": "Milk A", "source": "Target", "price": "$4.99", "extracted_price": 4.99 }
        ],
        "shopping_results": [
            { "title": "Milk B", "source": "QFC", "price": "$5.49", "extracted_price": 5.49 },
            { "title": "Milk A", "source": "Target", "price": "$4.99", "extracted_price": 4.99 }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google_shopping"))
        .and(query_param("q", "milk"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("location", "Seattle"))
        .and(query_param("num", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let records = test_client(&server.uri())
        .search("milk", "Seattle", 2)
        .await
        .expect("search should succeed");

    let stores: Vec<_> = records.iter().map(|r| r.store.as_deref()).collect();
    assert_eq!(stores, vec![Some("Target"), Some("QFC"), Some("Target")]);
    assert_eq!(records[1].price.as_deref(), Some("$5.49"));
}

#[tokio::test]
async fn search_without_api_key_fails_before_any_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let client = ShoppingClient::with_base_url(None, &options(0), &server.uri()).unwrap();
    let result = client.search("milk", "Seattle", 10).await;

    assert!(
        matches!(result, Err(SourceError::MissingCredential("SERPAPI_KEY"))),
        "expected MissingCredential, got: {result:?}"
    );
}

#[tokio::test]
async fn search_treats_no_results_error_as_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "error": "Google hasn't returned any results for this query."
        })))
        .mount(&server)
        .await;

    let records = test_client(&server.uri())
        .search("unobtainium", "Seattle", 10)
        .await
        .expect("no-results should not be an error");
    assert!(records.is_empty());
}

#[tokio::test]
async fn search_surfaces_api_error_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "error": "Your account has run out of searches."
        })))
        .mount(&server)
        .await;

    let result = test_client(&server.uri()).search("milk", "Seattle", 10).await;
    assert!(
        matches!(result, Err(SourceError::Api { ref message, .. }) if message.contains("run out")),
        "expected Api error, got: {result:?}"
    );
}

#[tokio::test]
async fn search_reports_unauthorized_status_without_leaking_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .search("milk", "Seattle", 10)
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::UnexpectedStatus { status: 401, .. }));
    assert!(!err.to_string().contains("test-key"), "got: {err}");
}

#[tokio::test]
async fn search_retries_server_error_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "shopping_results": [{ "title": "Milk", "source": "Safeway", "extracted_price": 3.99 }]
        })))
        .mount(&server)
        .await;

    let client =
        ShoppingClient::with_base_url(Some("test-key".to_owned()), &options(2), &server.uri())
            .unwrap();
    let records = client.search("milk", "Seattle", 10).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].store.as_deref(), Some("Safeway"));
}

#[tokio::test]
async fn search_reports_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = test_client(&server.uri()).search("milk", "Seattle", 10).await;
    assert!(
        matches!(result, Err(SourceError::Deserialize { .. })),
        "expected Deserialize, got: {result:?}"
    );
}
