use super::*;
use crate::testing::{CAPTURED_PAGE, StubProvider, computer_reply, test_config, test_state, text_reply};
use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

struct Harness {
    state: Arc<AppState>,
    router: Router,
    dir: TempDir,
}

fn harness(provider: StubProvider) -> Harness {
    let dir = TempDir::new().unwrap();
    let state = test_state(test_config(), provider, dir.path());
    Harness {
        router: create_router(state.clone()),
        state,
        dir,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(router, request).await;
    (status, serde_json::from_str(&body).unwrap())
}

async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body) = send(router, request).await;
    (status, serde_json::from_str(&body).unwrap())
}

async fn wait_until_free(state: &AppState) {
    for _ in 0..300 {
        if !state.sessions.gate().is_busy() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("gate was never released");
}

#[tokio::test]
async fn test_health() {
    let h = harness(StubProvider::default());
    let (status, body) = get_json(&h.router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "SitePilot");
    assert_eq!(body["busy"], false);
}

#[tokio::test]
async fn test_service_info_lists_registered_endpoints() {
    let h = harness(StubProvider::default());
    let (status, body) = get_json(&h.router, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert!(body["endpoints"]["navigate"].is_string());
    assert_eq!(body["registered_endpoints"], json!(["whatsnew"]));
}

#[tokio::test]
async fn test_navigate_requires_website() {
    let h = harness(StubProvider::default());

    let (status, body) = post_json(&h.router, "/navigate", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing 'website' parameter in request body");

    let (status, body) = post_json(&h.router, "/navigate", json!({"website": "   "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Website input cannot be empty");
    assert!(!h.state.sessions.gate().is_busy());
}

#[tokio::test]
async fn test_navigate_starts_session_and_holds_gate() {
    let h = harness(StubProvider::default());

    let (status, body) = post_json(&h.router, "/navigate", json!({"website": "Go to https://www.github.com"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "started");
    assert_eq!(body["extracted_website"], "github.com");
    assert_eq!(body["target_url"], "github.com");
    assert_eq!(body["extraction_method"], "direct_url");
    assert_eq!(body["original_input"], "Go to https://www.github.com");
    assert!(body["warning"].as_str().unwrap().contains("top-left corner"));

    let (status, body) = post_json(&h.router, "/navigate", json!({"website": "google.com"})).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["status"], "busy");
    assert_eq!(body["error"], "Agent is currently busy. Please try again later.");
}

#[tokio::test]
async fn test_navigate_unresolvable_input() {
    let h = harness(StubProvider::replying(&["UNCLEAR"]));

    let (status, body) = post_json(&h.router, "/navigate", json!({"website": "what is the weather?"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Could not identify a website"));
    assert!(!h.state.sessions.gate().is_busy());
}

#[tokio::test]
async fn test_extract_website() {
    let h = harness(StubProvider::replying(&["GitHub"]));

    let (status, body) = post_json(&h.router, "/extract-website", json!({"text": "visit example.org now"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["extracted_website"], "example.org");
    assert_eq!(body["extraction_method"], "direct_url");
    assert_eq!(body["status"], "success");

    let (status, body) = post_json(&h.router, "/extract-website", json!({"text": "take me to the code place"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["extracted_website"], "github.com");
    assert_eq!(body["extraction_method"], "model_extraction");
}

#[tokio::test]
async fn test_extract_website_failure() {
    let h = harness(StubProvider::replying(&["UNCLEAR"]));

    let (status, body) = post_json(&h.router, "/extract-website", json!({"text": "hello there"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "failed");
    assert_eq!(body["extracted_website"], Value::Null);
    assert_eq!(body["original_input"], "hello there");

    let (status, body) = post_json(&h.router, "/extract-website", json!({"website": "wrong field"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing 'text' parameter in request body");
}

#[tokio::test]
async fn test_create_endpoint_validation() {
    let h = harness(StubProvider::default());

    let (status, body) = post_json(&h.router, "/create-endpoint", json!({"request": "new things"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Both 'request' and 'endpoint' are required.");

    let (status, body) = post_json(
        &h.router,
        "/create-endpoint",
        json!({"request": "new things at example.com", "endpoint": "/!!.json"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Provided endpoint slug contains no valid characters.");
    assert!(!h.state.sessions.gate().is_busy());
}

#[tokio::test]
async fn test_create_endpoint_busy() {
    let h = harness(StubProvider::default());
    let _held = h.state.sessions.gate().try_acquire().unwrap();

    let (status, body) = post_json(
        &h.router,
        "/create-endpoint",
        json!({"request": "new things at example.com", "endpoint": "things"}),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["status"], "busy");
}

#[tokio::test]
async fn test_create_endpoint_then_serve() {
    let h = harness(StubProvider::new(vec![
        computer_reply("toolu_1", json!({"action": "capture_html"})),
        text_reply("Captured."),
        text_reply("[{\"product_name\": \"Mochi\", \"price\": \"$4.99\"}]"),
    ]));

    let (status, body) = post_json(
        &h.router,
        "/create-endpoint",
        json!({"request": "new products at example.com", "endpoint": "/Snacks.json"}),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["endpoint"], "snacks");
    assert_eq!(body["message"], "Endpoint creation for '/snacks' started.");

    wait_until_free(&h.state).await;

    let (status, body) = get_json(&h.router, "/snacks").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["product_name"], "Mochi");
    assert!(h.dir.path().join("snacks.json").exists());
    assert!(CAPTURED_PAGE.contains("Mochi"));
}

#[tokio::test]
async fn test_refresh_endpoint_requires_endpoint() {
    let h = harness(StubProvider::default());

    let (status, body) = post_json(&h.router, "/refresh-endpoint", json!({"request": "anything"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "'endpoint' field is required");
}

#[tokio::test]
async fn test_refresh_endpoint_accepted() {
    let h = harness(StubProvider::default());

    let (status, body) = post_json(&h.router, "/refresh-endpoint", json!({"endpoint": "WhatsNew"})).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["endpoint"], "whatsnew");
    assert_eq!(body["status"], "started");
    wait_until_free(&h.state).await;
}

#[tokio::test]
async fn test_serve_endpoint_errors() {
    let h = harness(StubProvider::default());

    let (status, body) = get_json(&h.router, "/whatsnew").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Data file not found. Try refreshing the endpoint.");

    let (status, _) = get_json(&h.router, "/never-created").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_serve_corrupt_endpoint() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("deals.json"), "{not json").unwrap();
    let state = test_state(test_config(), StubProvider::default(), dir.path());
    let router = create_router(state);

    let (status, body) = get_json(&router, "/deals").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("Failed to read JSON"));
}

#[tokio::test]
async fn test_generate_docs_json() {
    let h = harness(StubProvider::replying(&["# Snacks API\n"]));

    let (status, body) = post_json(
        &h.router,
        "/generate-docs",
        json!({"request": "new products at example.com", "endpoint": "Snacks"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["documentation"], "# Snacks API");
    assert_eq!(body["endpoint_slug"], "snacks");
    assert_eq!(body["website_url"], "example.com");
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn test_generate_docs_errors() {
    let h = harness(StubProvider::failing());

    let (status, body) = post_json(&h.router, "/generate-docs", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing 'request' parameter in request body");

    let (status, body) = post_json(&h.router, "/generate-docs", json!({"request": "example.com"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("Failed to generate documentation"));
}

#[tokio::test]
async fn test_generate_docs_stream() {
    let h = harness(StubProvider::streaming(&["# API", " docs"]));
    let request = Request::builder()
        .uri("/generate-docs?request=example.com&endpoint=deals")
        .body(Body::empty())
        .unwrap();

    let response = h.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let events: Vec<Value> = String::from_utf8(bytes.to_vec())
        .unwrap()
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).unwrap())
        .collect();

    let types: Vec<&str> = events.iter().map(|e| e["type"].as_str().unwrap()).collect();
    assert_eq!(types, vec!["start", "chunk", "chunk", "complete"]);
    assert_eq!(events[2]["partial_content"], "# API docs");
    assert_eq!(events[3]["documentation"], "# API docs");
    assert_eq!(events[3]["endpoint_slug"], "deals");
}

#[tokio::test]
async fn test_generate_docs_stream_errors() {
    let h = harness(StubProvider::failing());

    let (status, body) = send(&h.router, Request::builder().uri("/generate-docs").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"type\":\"error\""));
    assert!(body.contains("Missing 'request' parameter"));

    let (_, body) = send(
        &h.router,
        Request::builder()
            .uri("/generate-docs?request=example.com")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert!(body.contains("\"type\":\"start\""));
    assert!(body.contains("Failed to generate documentation"));
}
