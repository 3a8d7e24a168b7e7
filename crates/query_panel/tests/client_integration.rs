//! Integration tests for the HTTP client against an in-process axum backend.

use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use query_panel::{ClientError, QueryClient};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Serve `app` on an ephemeral port and return its base URL.
async fn spawn_backend(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Backend that records each `/query` request (content type, raw body) and
/// replies with `reply`.
async fn recording_backend(reply: Value) -> (String, Arc<Mutex<Vec<(String, String)>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let app = Router::new().route(
        "/query",
        post(move |headers: HeaderMap, body: String| {
            let sink = sink.clone();
            let reply = reply.clone();
            async move {
                let content_type = headers
                    .get("content-type")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                sink.lock().unwrap().push((content_type, body));
                Json(reply)
            }
        }),
    );
    (spawn_backend(app).await, seen)
}

#[tokio::test]
async fn query_posts_json_and_reads_answer() {
    let (url, seen) = recording_backend(json!({"answer": "42"})).await;
    let client = QueryClient::new(&url).unwrap();

    let response = client.query("what is six times seven").await.unwrap();
    assert_eq!(response.display_text(), "42");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "application/json");
    let body: Value = serde_json::from_str(&seen[0].1).unwrap();
    assert_eq!(body, json!({"query": "what is six times seven"}));
}

#[tokio::test]
async fn empty_query_is_sent_as_is() {
    let (url, seen) = recording_backend(json!({"message": "empty"})).await;
    let client = QueryClient::new(&url).unwrap();

    client.query("").await.unwrap();

    let body: Value = serde_json::from_str(&seen.lock().unwrap()[0].1).unwrap();
    assert_eq!(body, json!({"query": ""}));
}

#[tokio::test]
async fn extra_response_fields_are_ignored() {
    let (url, _) = recording_backend(json!({
        "refined_query": "total sales by region",
        "query_hints": {"tables": ["sales"]}
    }))
    .await;
    let client = QueryClient::new(&url).unwrap();

    let response = client.query("sales?").await.unwrap();
    assert_eq!(response.answer, None);
    assert_eq!(response.message, None);
    assert_eq!(response.display_text(), "");
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let app = Router::new().route(
        "/query",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let client = QueryClient::new(&spawn_backend(app).await).unwrap();

    match client.query("q").await {
        Err(ClientError::Status { status, body }) => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let app = Router::new().route("/query", post(|| async { "not json" }));
    let client = QueryClient::new(&spawn_backend(app).await).unwrap();

    let err = client.query("q").await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)), "got {:?}", err);
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = QueryClient::new(&format!("http://127.0.0.1:{}", port)).unwrap();

    let err = client.query("q").await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)), "got {:?}", err);
}

#[tokio::test]
async fn list_tables_and_schema() {
    let app = Router::new()
        .route(
            "/tables",
            get(|| async {
                Json(json!([
                    {"table_name": "sales", "table_description": "Daily sales"},
                    {"table_name": "regions"}
                ]))
            }),
        )
        .route(
            "/tables/{name}/schema",
            get(|axum::extract::Path(name): axum::extract::Path<String>| async move {
                if name == "sales" {
                    Json(json!([{"name": "amount", "type": "DOUBLE"}]))
                } else {
                    Json(json!({"error": format!("Table '{}' not found", name)}))
                }
            }),
        );
    let client = QueryClient::new(&spawn_backend(app).await).unwrap();

    let tables = client.list_tables().await.unwrap();
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0].table_name, "sales");
    assert_eq!(tables[0].table_description.as_deref(), Some("Daily sales"));
    assert_eq!(tables[1].table_description, None);

    let schema = client.table_schema("sales").await.unwrap();
    assert_eq!(schema, json!([{"name": "amount", "type": "DOUBLE"}]));

    match client.table_schema("missing").await {
        Err(ClientError::Backend(message)) => assert_eq!(message, "Table 'missing' not found"),
        other => panic!("expected backend error, got {:?}", other),
    }
}
