//! Router-level tests: status codes and JSON bodies for every route.

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use completion_gateway::client::CompletionClient;
use completion_gateway::error::UpstreamError;
use completion_gateway::models::{CompletionResult, PromptRequest};
use completion_gateway::rate_limit::RateLimiter;
use completion_gateway::routes::create_router;
use completion_gateway::service::CompletionService;
use completion_gateway::state::AppState;

#[derive(Clone, Copy)]
enum Behaviour {
    Reply,
    Fail,
    Panic,
}

struct FakeClient {
    behaviour: Behaviour,
    calls: AtomicUsize,
    seen: Mutex<Vec<PromptRequest>>,
}

impl FakeClient {
    fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for FakeClient {
    async fn complete(&self, request: &PromptRequest) -> Result<CompletionResult, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(request.clone());
        match self.behaviour {
            Behaviour::Reply => Ok(CompletionResult {
                text: "Hi there".to_string(),
                model: request.model().to_string(),
                usage: BTreeMap::new(),
            }),
            Behaviour::Fail => Err(UpstreamError::Status {
                status: 401,
                message: "Incorrect API key provided".to_string(),
            }),
            Behaviour::Panic => panic!("client blew up"),
        }
    }
}

fn app(client: Arc<FakeClient>, default_model: Option<&str>) -> Router {
    let service = CompletionService::new(client, RateLimiter::from_secs(0));
    let state = AppState::new(service, default_model.map(str::to_string));
    create_router(Arc::new(state))
}

fn post_generate(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/openai/generate_response")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn root_returns_welcome_message() {
    let app = app(FakeClient::new(Behaviour::Reply), None);
    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Welcome to the AI Interface for OpenAI Responses service!"
    );
}

#[tokio::test]
async fn health_reports_cache_size() {
    let app = app(FakeClient::new(Behaviour::Reply), None);
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["cache_entries"], 0);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn generate_returns_text_and_caches_it() {
    let client = FakeClient::new(Behaviour::Reply);
    let app = app(client.clone(), None);
    let body = json!({"prompt": "Hello", "model": "m1"}).to_string();

    let (status, first) = send(&app, post_generate(&body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, json!({"response": "Hi there"}));

    let (status, second) = send(&app, post_generate(&body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second, first);
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn request_fields_reach_the_client() {
    let client = FakeClient::new(Behaviour::Reply);
    let app = app(client.clone(), None);
    let body = json!({
        "prompt": "Hello",
        "model": "m1",
        "max_tokens": 12,
        "temperature": 0.3,
        "stop": ["END"]
    })
    .to_string();

    let (status, _) = send(&app, post_generate(&body)).await;
    assert_eq!(status, StatusCode::OK);

    let seen = client.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].max_tokens(), 12);
    assert_eq!(seen[0].temperature(), 0.3);
    assert_eq!(seen[0].top_p(), 1.0);
    assert_eq!(seen[0].stop(), Some(&["END".to_string()][..]));
}

#[tokio::test]
async fn missing_model_falls_back_to_configured_default() {
    let client = FakeClient::new(Behaviour::Reply);
    let app = app(client.clone(), Some("configured-model"));

    let (status, _) = send(&app, post_generate(r#"{"prompt": "Hello"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(client.seen.lock().unwrap()[0].model(), "configured-model");
}

#[tokio::test]
async fn missing_model_without_default_is_rejected() {
    let client = FakeClient::new(Behaviour::Reply);
    let app = app(client.clone(), None);

    let (status, body) = send(&app, post_generate(r#"{"prompt": "Hello"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("model"));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn blank_prompt_is_rejected_before_upstream() {
    let client = FakeClient::new(Behaviour::Reply);
    let app = app(client.clone(), Some("m1"));

    let (status, body) = send(&app, post_generate(r#"{"prompt": "   "}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["detail"],
        "Invalid request data: Prompt cannot be empty."
    );
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn out_of_range_parameter_names_the_field() {
    let client = FakeClient::new(Behaviour::Reply);
    let app = app(client.clone(), Some("m1"));

    for (field, value) in [
        ("temperature", json!(1.5)),
        ("top_p", json!(-0.1)),
        ("frequency_penalty", json!(2)),
        ("presence_penalty", json!(-1)),
        ("max_tokens", json!(0)),
    ] {
        let mut body = json!({"prompt": "Hello"});
        body[field] = value;
        let (status, resp) = send(&app, post_generate(&body.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{field}");
        assert!(resp["detail"].as_str().unwrap().contains(field), "{field}");
    }
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let client = FakeClient::new(Behaviour::Reply);
    let app = app(client.clone(), Some("m1"));

    for body in ["not json", r#"{"model": "m1"}"#, r#"{"prompt": 5}"#] {
        let (status, resp) = send(&app, post_generate(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(
            resp["detail"]
                .as_str()
                .unwrap()
                .starts_with("Invalid request data: ")
        );
    }
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn wrong_field_type_names_the_field() {
    let client = FakeClient::new(Behaviour::Reply);
    let app = app(client.clone(), Some("m1"));

    for (field, value) in [
        ("temperature", json!("hot")),
        ("max_tokens", json!(1.5)),
        ("top_p", Value::Null),
    ] {
        let mut body = json!({"prompt": "Hello"});
        body[field] = value;
        let (status, resp) = send(&app, post_generate(&body.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{field}");
        let detail = resp["detail"].as_str().unwrap();
        assert!(
            detail.starts_with(&format!("Invalid request data: {field}: ")),
            "{detail}"
        );
    }
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn upstream_failure_is_500_and_not_cached() {
    let client = FakeClient::new(Behaviour::Fail);
    let app = app(client.clone(), None);
    let body = json!({"prompt": "Hello", "model": "m1"}).to_string();

    let (status, resp) = send(&app, post_generate(&body)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = resp["detail"].as_str().unwrap();
    assert!(detail.starts_with("Error processing request: "));
    assert!(detail.contains("Incorrect API key provided"));

    send(&app, post_generate(&body)).await;
    assert_eq!(client.calls(), 2);
}

#[tokio::test]
async fn panic_becomes_generic_500() {
    let app = app(FakeClient::new(Behaviour::Panic), None);
    let body = json!({"prompt": "Hello", "model": "m1"}).to_string();

    let (status, resp) = send(&app, post_generate(&body)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp, json!({"detail": "Internal server error"}));
}

#[tokio::test]
async fn metrics_are_exposed() {
    let app = app(FakeClient::new(Behaviour::Reply), None);
    let req = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let response = app.oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let text = std::str::from_utf8(&body).unwrap();
    assert!(text.contains("completion_cache_size"));
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = app(FakeClient::new(Behaviour::Reply), None);
    let req = Request::builder()
        .uri("/")
        .header(header::ORIGIN, "http://example.com")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
