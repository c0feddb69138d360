use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use persona_gateway::router::{self, LEGACY_CHAT_PATH};
use persona_gateway::{AppState, RateLimiter, UpstreamClient};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_app(upstream_url: &str, rate_limit: u32) -> Router {
    let upstream = UpstreamClient::new(
        reqwest::Client::new(),
        upstream_url,
        "test-api-key".to_string(),
        "2023-06-01".to_string(),
        "claude-sonnet-4-20250514".to_string(),
        1024,
        "You are Stack.".to_string(),
    );
    let rate_limiter = Arc::new(RateLimiter::new(rate_limit, Duration::from_secs(3600)));
    router::build(Arc::new(AppState::new(upstream, rate_limiter)))
}

fn chat_request(ip: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/chat")
        .header("content-type", "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn mock_upstream(reply: Value) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply))
        .mount(&mock_server)
        .await;
    mock_server
}

#[tokio::test]
async fn test_preflight_returns_cors_headers() {
    let app = create_app("http://127.0.0.1:9", 10);
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/chat")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(response.headers()["access-control-allow-methods"], "POST, OPTIONS");
    assert_eq!(response.headers()["access-control-allow-headers"], "Content-Type");
}

#[tokio::test]
async fn test_get_is_method_not_allowed() {
    let app = create_app("http://127.0.0.1:9", 10);
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/chat")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(json_body(response).await, json!({ "error": "Method not allowed" }));
}

#[tokio::test]
async fn test_chat_success_relays_upstream_body() {
    let reply = json!({
        "id": "msg_01",
        "type": "message",
        "content": [{ "type": "text", "text": "Hello!" }]
    });
    let mock_server = mock_upstream(reply.clone()).await;
    let app = create_app(&mock_server.uri(), 10);

    let response = app
        .oneshot(chat_request("1.2.3.4", r#"{"message":"Hi"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-ratelimit-remaining"], "9");
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_eq!(json_body(response).await, reply);
}

#[tokio::test]
async fn test_legacy_path_is_served() {
    let mock_server = mock_upstream(json!({ "ok": true })).await;
    let app = create_app(&mock_server.uri(), 10);

    let request = Request::builder()
        .method(Method::POST)
        .uri(LEGACY_CHAT_PATH)
        .header("client-ip", "5.6.7.8")
        .body(Body::from(r#"{"message":"Hi"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_eleventh_request_is_rate_limited() {
    let mock_server = mock_upstream(json!({ "ok": true })).await;
    let app = create_app(&mock_server.uri(), 10);

    for expected in (0..10).rev() {
        let response = app
            .clone()
            .oneshot(chat_request("1.2.3.4", r#"{"message":"Hi"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-ratelimit-remaining"], expected.to_string().as_str());
    }

    let response = app
        .clone()
        .oneshot(chat_request("1.2.3.4", r#"{"message":"Hi"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Rate limit exceeded. Please try again in an hour.", "remaining": 0 })
    );

    // another client is unaffected
    let response = app
        .oneshot(chat_request("9.9.9.9", r#"{"message":"Hi"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_message_is_bad_request() {
    let app = create_app("http://127.0.0.1:9", 10);

    let response = app
        .oneshot(chat_request("1.2.3.4", r#"{"message":123}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({ "error": "Invalid message format" }));
}

#[tokio::test]
async fn test_rejected_input_still_spends_quota() {
    let app = create_app("http://127.0.0.1:9", 1);

    let response = app
        .clone()
        .oneshot(chat_request("1.2.3.4", "not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = app
        .oneshot(chat_request("1.2.3.4", r#"{"message":"Hi"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_upstream_error_is_reported_with_details() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(529).set_body_json(json!({
            "type": "error",
            "error": { "type": "overloaded_error", "message": "Overloaded" }
        })))
        .mount(&mock_server)
        .await;
    let app = create_app(&mock_server.uri(), 10);

    let response = app
        .oneshot(chat_request("1.2.3.4", r#"{"message":"Hi"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Failed to process request. Please try again.", "details": "Overloaded" })
    );
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_app("http://127.0.0.1:9", 10);
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_counters() {
    let app = create_app("http://127.0.0.1:9", 10);
    app.clone()
        .oneshot(chat_request("1.2.3.4", r#"{"message":""}"#))
        .await
        .unwrap();

    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("persona_requests_total"));
}
