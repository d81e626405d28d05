//! Integration tests for request building and response classification.

use std::time::Duration as StdDuration;

use armis_client::client::{ArmisClient, ClientOptions};
use armis_client::error::ArmisError;
use chrono::{Duration, SecondsFormat, Utc};
use reqwest::{Method, StatusCode, header};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_exchange(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": {
                "access_token": "tok-123",
                "expiration_utc": (Utc::now() + Duration::hours(1))
                    .to_rfc3339_opts(SecondsFormat::Micros, false),
                "user_id": 99
            }
        })))
        .expect(times)
        .mount(server)
        .await;
}

async fn connect(server: &MockServer, options: ClientOptions) -> ArmisClient {
    ArmisClient::with_options("test-api-key", options.base_url(server.uri()))
        .await
        .expect("construction should authenticate")
}

#[tokio::test]
async fn build_request_attaches_token_and_json_headers() {
    let server = MockServer::start().await;
    mount_exchange(&server, 1).await;
    let client = connect(&server, ClientOptions::default()).await;

    let path = client.api_path("collectors/");
    assert_eq!(path, "/api/v1/collectors/");

    let body = serde_json::json!({"name": "edge"});
    let request = client
        .build_request::<(), _>(Method::POST, &path, None, Some(&body))
        .await
        .unwrap();

    assert_eq!(request.method(), &Method::POST);
    assert_eq!(request.url().path(), "/api/v1/collectors/");
    let headers = request.headers();
    assert_eq!(headers[header::AUTHORIZATION], "tok-123");
    assert!(headers[header::AUTHORIZATION].is_sensitive());
    assert_eq!(headers[header::ACCEPT], "application/json");
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");

    let sent: serde_json::Value =
        serde_json::from_slice(request.body().and_then(|b| b.as_bytes()).unwrap()).unwrap();
    assert_eq!(sent, body);
}

#[tokio::test]
async fn build_request_serializes_query_parameters() {
    let server = MockServer::start().await;
    mount_exchange(&server, 1).await;
    let client = connect(&server, ClientOptions::default()).await;

    let request = client
        .build_request::<_, ()>(
            Method::GET,
            &client.api_path("search/"),
            Some(&[("aql", "in:devices"), ("length", "10")]),
            None,
        )
        .await
        .unwrap();

    assert_eq!(request.url().query(), Some("aql=in%3Adevices&length=10"));
    assert!(request.body().is_none());
}

#[tokio::test]
async fn execute_returns_raw_body_on_success() {
    let server = MockServer::start().await;
    mount_exchange(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/reports/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("raw-report-bytes"))
        .mount(&server)
        .await;

    let client = connect(&server, ClientOptions::default()).await;
    let request = client
        .build_request::<(), ()>(Method::GET, &client.api_path("reports/"), None, None)
        .await
        .unwrap();
    let body = client.execute(request).await.unwrap();

    assert_eq!(body.as_ref(), b"raw-report-bytes");
}

#[tokio::test]
async fn non_success_status_is_api_error_with_body() {
    let server = MockServer::start().await;
    mount_exchange(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/collectors/404/"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message":"Collector not found"}"#))
        .mount(&server)
        .await;

    let client = connect(&server, ClientOptions::default()).await;
    let err = client
        .get::<serde_json::Value>(&client.api_path("collectors/404/"))
        .await
        .unwrap_err();

    match err {
        ArmisError::Api { status, body } => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert!(body.contains("Collector not found"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn unauthorized_response_is_not_retried() {
    let server = MockServer::start().await;
    // Exactly one exchange: a server-side 401 must not trigger a refresh.
    mount_exchange(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server, ClientOptions::default()).await;
    let err = client
        .get::<serde_json::Value>(&client.api_path("users/"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert!(!err.is_auth(), "an API 401 is an Api error, not an Auth error");
}

#[tokio::test]
async fn invalid_json_on_success_is_parse_error() {
    let server = MockServer::start().await;
    mount_exchange(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sites/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = connect(&server, ClientOptions::default()).await;
    let err = client
        .get::<serde_json::Value>(&client.api_path("sites/"))
        .await
        .unwrap_err();

    assert!(matches!(err, ArmisError::Parse(_)));
}

#[tokio::test]
async fn transport_timeout_is_network_error() {
    let server = MockServer::start().await;
    mount_exchange(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"success": true, "data": {}}))
                .set_delay(StdDuration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let http = reqwest::Client::builder()
        .timeout(StdDuration::from_millis(300))
        .build()
        .unwrap();
    let client = connect(&server, ClientOptions::default().http_client(http)).await;

    let err = client
        .get::<serde_json::Value>(&client.api_path("search/"))
        .await
        .unwrap_err();

    match err {
        ArmisError::Network(e) => assert!(e.is_timeout()),
        other => panic!("expected Network error, got {other:?}"),
    }
}

#[tokio::test]
async fn delete_discards_response_body() {
    let server = MockServer::start().await;
    mount_exchange(&server, 1).await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/sites/9/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server, ClientOptions::default()).await;
    client.delete(&client.api_path("sites/9/")).await.unwrap();
}

#[tokio::test]
async fn custom_api_version_changes_paths() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/access_token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": {
                "access_token": "tok-v2",
                "expiration_utc": (Utc::now() + Duration::hours(1))
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
                "user_id": 1
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server, ClientOptions::default().api_version("v2")).await;
    assert_eq!(client.api_path("users/"), "/api/v2/users/");
}
