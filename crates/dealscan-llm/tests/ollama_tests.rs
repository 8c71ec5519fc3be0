//! OllamaProvider against an in-process fake Ollama server

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use dealscan_llm::{InferenceParams, LlmError, ModelProvider, ModelRequest, OllamaProvider};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
struct FakeOllama {
    status: StatusCode,
    body: Value,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl FakeOllama {
    fn new(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

async fn generate_handler(
    State(state): State<FakeOllama>,
    Json(request): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.requests.lock().unwrap().push(request);
    (state.status, Json(state.body.clone()))
}

async fn spawn_server(state: FakeOllama) -> String {
    let app = Router::new()
        .route("/api/generate", post(generate_handler))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn provider_for(url: &str) -> OllamaProvider {
    OllamaProvider::new(url, "llama3", Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_generate_returns_response_field() {
    let server = FakeOllama::new(
        StatusCode::OK,
        json!({"model": "llama3", "response": "{\"effective_date\": null}", "done": true}),
    );
    let url = spawn_server(server.clone()).await;

    let reply = provider_for(&url)
        .generate(&ModelRequest::text("Find the dates"))
        .await
        .unwrap();

    assert_eq!(reply, "{\"effective_date\": null}");
}

#[tokio::test]
async fn test_generate_sends_decoding_options() {
    let server = FakeOllama::new(StatusCode::OK, json!({"response": "ok", "done": true}));
    let url = spawn_server(server.clone()).await;
    let params = InferenceParams {
        max_tokens: 256,
        temperature: 0.0,
        top_p: 0.5,
    };

    provider_for(&url)
        .generate(&ModelRequest::text("prompt").with_params(params))
        .await
        .unwrap();

    let requests = server.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let sent = &requests[0];
    assert_eq!(sent["model"], "llama3");
    assert_eq!(sent["prompt"], "prompt");
    assert_eq!(sent["stream"], false);
    assert_eq!(sent["options"]["num_predict"], 256);
    assert_eq!(sent["options"]["top_p"], 0.5);
    assert_eq!(sent["options"]["temperature"], 0.0);
}

#[tokio::test]
async fn test_missing_model_is_model_not_available() {
    let server = FakeOllama::new(StatusCode::NOT_FOUND, json!({"error": "model 'llama3' not found"}));
    let url = spawn_server(server).await;

    let err = provider_for(&url)
        .generate(&ModelRequest::text("x"))
        .await
        .unwrap_err();

    assert!(matches!(err, LlmError::ModelNotAvailable(model) if model == "llama3"));
}

#[tokio::test]
async fn test_too_many_requests_is_rate_limited() {
    let server = FakeOllama::new(StatusCode::TOO_MANY_REQUESTS, json!({"error": "busy"}));
    let url = spawn_server(server).await;

    let err = provider_for(&url)
        .generate(&ModelRequest::text("x"))
        .await
        .unwrap_err();

    assert!(matches!(err, LlmError::RateLimitExceeded));
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let server = FakeOllama::new(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "oom"}));
    let url = spawn_server(server.clone()).await;

    let err = provider_for(&url)
        .generate(&ModelRequest::text("x"))
        .await
        .unwrap_err();

    match err {
        LlmError::Communication(message) => assert!(message.contains("500")),
        other => panic!("expected communication error, got {:?}", other),
    }
    assert_eq!(server.requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let server = FakeOllama::new(StatusCode::OK, json!({"unexpected": true}));
    let url = spawn_server(server).await;

    let err = provider_for(&url)
        .generate(&ModelRequest::text("x"))
        .await
        .unwrap_err();

    assert!(matches!(err, LlmError::InvalidResponse(_)));
}
