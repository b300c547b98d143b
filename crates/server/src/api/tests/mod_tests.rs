use super::*;
use axum::{body, body::Body, http::Request};
use server_api::{
    testing::{sample_tag, sample_ticket, FakeBackend},
    ApiContext,
};
use tower::ServiceExt;

fn test_app(backend: &FakeBackend) -> Router {
    let api = ApiContext::new(Arc::new(backend.clone()));
    build_router(Arc::new(AppState { api }), &Settings::default())
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_str(&body_text(response).await).expect("json")
}

/// `data:` payloads of an SSE body, parsed as JSON.
fn sse_messages(body: &str) -> Vec<Value> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).expect("event json"))
        .collect()
}

fn post_action(body: Value) -> Request<Body> {
    Request::post("/api/a2ui/action")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn action(name: &str, context: Value) -> Value {
    json!({
        "name": name,
        "surfaceId": "main",
        "sourceComponentId": "btn",
        "timestamp": "2024-03-01T08:30:00Z",
        "context": context,
    })
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = test_app(&FakeBackend::new());
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"status": "healthy"}));
}

#[tokio::test]
async fn stream_emits_page_as_message_events() {
    let backend = FakeBackend::new().with_ticket(sample_ticket("t1", "Printer jam"));
    let app = test_app(&backend);
    let request = Request::get("/api/a2ui/stream?path=/tickets")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("text/event-stream")
    );

    let body = body_text(response).await;
    assert_eq!(body.matches("event: message").count(), 5);
    let messages = sse_messages(&body);
    assert!(messages[0].get("surfaceUpdate").is_some());
    assert_eq!(
        messages[4],
        json!({"beginRendering": {"surfaceId": "main", "root": "app-layout"}})
    );
}

#[tokio::test]
async fn stream_path_query_overrides_outer_params() {
    let backend = FakeBackend::new()
        .with_ticket(sample_ticket("t1", "Printer jam"))
        .with_ticket(sample_ticket("t2", "Wifi down"));
    let app = test_app(&backend);
    let request = Request::get("/api/a2ui/stream?path=%2Ftickets%3Fsearch%3DWifi&search=Printer")
        .body(Body::empty())
        .expect("request");
    let body = body_text(app.oneshot(request).await.expect("response")).await;
    assert!(body.contains("Wifi down"));
    assert!(!body.contains("Printer jam"));
}

#[tokio::test]
async fn stream_without_path_renders_list() {
    let app = test_app(&FakeBackend::new());
    let request = Request::get("/api/a2ui/stream")
        .body(Body::empty())
        .expect("request");
    let body = body_text(app.oneshot(request).await.expect("response")).await;
    assert!(body.contains("tickets-page"));
}

#[tokio::test]
async fn stream_renders_error_page_on_backend_failure() {
    let app = test_app(&FakeBackend::new());
    let request = Request::get("/api/a2ui/stream?path=/tickets/missing")
        .body(Body::empty())
        .expect("request");
    let body = body_text(app.oneshot(request).await.expect("response")).await;
    assert!(body.contains("error-page"));
    assert!(body.contains("app-layout"));
}

#[tokio::test]
async fn action_returns_navigation() {
    let app = test_app(&FakeBackend::new());
    let response = app
        .oneshot(post_action(action("view_ticket", json!({"id": "t1"}))))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"success": true, "result": {"navigate": "/tickets/t1"}})
    );
}

#[tokio::test]
async fn action_failure_is_reported_in_body() {
    let backend = FakeBackend::new().with_tag(sample_tag("g1", "bug", true));
    let app = test_app(&backend);
    let response = app
        .oneshot(post_action(action("create_tag", json!({"form": {"name": "bug"}}))))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"success": false, "error": "操作失败：资源冲突（名称可能已存在）"})
    );
}

#[tokio::test]
async fn malformed_action_is_rejected() {
    let app = test_app(&FakeBackend::new());
    let response = app
        .oneshot(post_action(json!({"name": "retry"})))
        .await
        .expect("response");
    assert!(response.status().is_client_error());
    let error = body_json(response).await;
    assert_eq!(error["code"], "validation");
}

#[tokio::test]
async fn oversized_body_is_refused() {
    let app = test_app(&FakeBackend::new());
    let request = Request::post("/api/a2ui/action")
        .header("content-type", "application/json")
        .header("content-length", (MAX_BODY_BYTES + 1).to_string())
        .body(Body::from(vec![b' '; MAX_BODY_BYTES + 1]))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn cors_allows_configured_origins_only() {
    let app = test_app(&FakeBackend::new());
    let preflight = |origin: &str| {
        Request::builder()
            .method("OPTIONS")
            .uri("/api/a2ui/action")
            .header("origin", origin)
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .expect("request")
    };

    let allowed = app
        .clone()
        .oneshot(preflight("http://localhost:5173"))
        .await
        .expect("response");
    assert_eq!(
        allowed
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:5173")
    );
    assert_eq!(
        allowed
            .headers()
            .get("access-control-allow-credentials")
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );

    let denied = app
        .oneshot(preflight("https://evil.example"))
        .await
        .expect("response");
    assert!(denied.headers().get("access-control-allow-origin").is_none());
}

#[test]
fn cors_layer_skips_invalid_origins() {
    // Must not panic on a wildcard or a header-invalid value.
    let _ = cors_layer(&["*".to_string(), "bad\norigin".to_string()]);
}
