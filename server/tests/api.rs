mod common;

use std::sync::Arc;

use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use todo_core::{Credentials, IdPolicy};
use todo_server::{app, AppState, DocumentStore, FileStore, RemoteCollection, ResponseStyle};
use tower::ServiceExt;

use common::start_mock;

async fn send(app: &Router, request: Request<String>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

fn file_app(dir: &TempDir, policy: IdPolicy) -> Router {
    let store = FileStore::new(dir.path().join("todos.json"), policy);
    app(AppState::new(Arc::new(store), ResponseStyle::Legacy))
}

// --- file backend, legacy responses ---

#[tokio::test]
async fn create_applies_defaults() {
    let dir = TempDir::new().unwrap();
    let app = file_app(&dir, IdPolicy::Counter);

    let (status, todo) = send(&app, json_request("POST", "/api/todos", r#"{"text":"buy milk"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(todo["id"], 1);
    assert_eq!(todo["text"], "buy milk");
    assert_eq!(todo["completed"], false);
    assert_eq!(todo["priority"], "medium");
    assert_eq!(todo["category"], "general");
    assert!(todo["due_date"].is_null());
    assert!(todo["created_at"].is_string());
}

#[tokio::test]
async fn create_without_text_is_a_bad_request() {
    let dir = TempDir::new().unwrap();
    let app = file_app(&dir, IdPolicy::Counter);

    let (status, body) = send(&app, json_request("POST", "/api/todos", r#"{"priority":"high"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing required field `text`");

    let (status, body) = send(&app, json_request("POST", "/api/todos", "{oops")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, todos) = send(&app, empty_request("GET", "/api/todos")).await;
    assert_eq!(todos, json!([]));
}

#[tokio::test]
async fn list_filters_by_user() {
    let dir = TempDir::new().unwrap();
    let app = file_app(&dir, IdPolicy::Counter);
    send(&app, json_request("POST", "/api/todos", r#"{"text":"a","user_id":"ann"}"#)).await;
    send(&app, json_request("POST", "/api/todos", r#"{"text":"b","user_id":"bob"}"#)).await;
    send(&app, json_request("POST", "/todos", r#"{"text":"c","user":"ann"}"#)).await;

    let (status, todos) = send(&app, empty_request("GET", "/api/todos?user_id=ann")).await;
    assert_eq!(status, StatusCode::OK);
    let texts: Vec<_> = todos.as_array().unwrap().iter().map(|t| t["text"].clone()).collect();
    assert_eq!(texts, vec![json!("a"), json!("c")]);

    let (_, todos) = send(&app, empty_request("GET", "/todos?user=bob")).await;
    assert_eq!(todos.as_array().unwrap().len(), 1);

    let (_, todos) = send(&app, empty_request("GET", "/api/todos")).await;
    assert_eq!(todos.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn update_merges_fields_and_acknowledges() {
    let dir = TempDir::new().unwrap();
    let app = file_app(&dir, IdPolicy::Counter);
    send(&app, json_request("POST", "/api/todos", r#"{"text":"walk dog","category":"home"}"#)).await;

    let (status, ack) = send(&app, json_request("PUT", "/api/todos/1", r#"{"completed":true,"dueDate":"friday"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, json!({ "success": true }));

    let (_, todo) = send(&app, empty_request("GET", "/api/todos/1")).await;
    assert_eq!(todo["completed"], true);
    assert_eq!(todo["due_date"], "friday");
    assert_eq!(todo["text"], "walk dog");
    assert_eq!(todo["category"], "home");
}

#[tokio::test]
async fn update_of_missing_id_acknowledges_without_change() {
    let dir = TempDir::new().unwrap();
    let app = file_app(&dir, IdPolicy::Counter);
    send(&app, json_request("POST", "/api/todos", r#"{"text":"a"}"#)).await;
    let (_, before) = send(&app, empty_request("GET", "/api/todos")).await;

    let (status, ack) = send(&app, json_request("PUT", "/api/todos/42", r#"{"text":"ghost"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, json!({ "success": true }));

    let (_, after) = send(&app, empty_request("GET", "/api/todos")).await;
    assert_eq!(after, before);
}

#[tokio::test]
async fn scoped_mutations_silently_skip_other_owners() {
    let dir = TempDir::new().unwrap();
    let app = file_app(&dir, IdPolicy::Counter);
    send(&app, json_request("POST", "/api/todos", r#"{"text":"mine","user_id":"ann"}"#)).await;

    let (status, ack) = send(&app, json_request("PUT", "/api/todos/1?user_id=bob", r#"{"text":"theirs"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, json!({ "success": true }));
    let (status, _) = send(&app, empty_request("DELETE", "/api/todos/1?user_id=bob")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, todo) = send(&app, empty_request("GET", "/api/todos/1")).await;
    assert_eq!(todo["text"], "mine");

    send(&app, empty_request("DELETE", "/api/todos/1?user_id=ann")).await;
    let (status, _) = send(&app, empty_request("GET", "/api/todos/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn length_policy_restarts_at_one_after_deleting_everything() {
    let dir = TempDir::new().unwrap();
    let app = file_app(&dir, IdPolicy::Length);
    send(&app, json_request("POST", "/api/todos", r#"{"text":"a"}"#)).await;
    send(&app, json_request("POST", "/api/todos", r#"{"text":"b"}"#)).await;

    for id in [1, 2] {
        let (status, ack) = send(&app, empty_request("DELETE", &format!("/api/todos/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack, json!({ "success": true }));
    }
    let (_, todos) = send(&app, empty_request("GET", "/api/todos")).await;
    assert_eq!(todos, json!([]));

    let (_, todo) = send(&app, json_request("POST", "/api/todos", r#"{"text":"c"}"#)).await;
    assert_eq!(todo["id"], 1);
}

#[tokio::test]
async fn delete_of_missing_id_acknowledges() {
    let dir = TempDir::new().unwrap();
    let app = file_app(&dir, IdPolicy::Counter);

    let (status, ack) = send(&app, empty_request("DELETE", "/todos/7")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, json!({ "success": true }));
}

#[tokio::test]
async fn non_numeric_id_is_a_bad_request_on_file_backend() {
    let dir = TempDir::new().unwrap();
    let app = file_app(&dir, IdPolicy::Counter);

    let (status, body) = send(&app, empty_request("DELETE", "/api/todos/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid todo id: abc");
}

#[tokio::test]
async fn body_without_json_content_type_is_unsupported_media_type() {
    let dir = TempDir::new().unwrap();
    let app = file_app(&dir, IdPolicy::Counter);

    let request = Request::builder()
        .method("POST")
        .uri("/api/todos")
        .body(r#"{"text":"buy milk"}"#.to_string())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body["error"].is_string());

    let (_, todos) = send(&app, empty_request("GET", "/api/todos")).await;
    assert_eq!(todos, json!([]));
}

#[tokio::test]
async fn malformed_owner_query_is_a_json_bad_request() {
    let dir = TempDir::new().unwrap();
    let app = file_app(&dir, IdPolicy::Counter);

    let (status, body) = send(&app, empty_request("GET", "/api/todos?user=ann&user_id=bob")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("query string"));

    let (status, body) = send(&app, empty_request("DELETE", "/api/todos/1?user_id=a&user_id=b")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn file_written_by_older_versions_is_served() {
    let dir = TempDir::new().unwrap();
    let raw = json!([{
        "id": 1,
        "user_id": "ann",
        "text": "buy milk",
        "completed": false,
        "priority": "medium",
        "category": "general",
        "created_at": "2024-05-01T12:34:56.789012",
        "due_date": null,
        "starred": true
    }]);
    std::fs::write(dir.path().join("todos.json"), raw.to_string()).unwrap();
    let app = file_app(&dir, IdPolicy::Counter);

    let (status, todos) = send(&app, empty_request("GET", "/api/todos?user_id=ann")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(todos, raw);

    let (status, _) = send(&app, json_request("PUT", "/api/todos/1", r#"{"completed":true}"#)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, todo) = send(&app, empty_request("GET", "/api/todos/1")).await;
    assert_eq!(todo["completed"], true);
    assert_eq!(todo["created_at"], "2024-05-01T12:34:56.789012");
    assert_eq!(todo["starred"], true);
}

#[tokio::test]
async fn corrupt_data_file_is_a_server_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("todos.json"), "not json").unwrap();
    let app = file_app(&dir, IdPolicy::Counter);

    let (status, body) = send(&app, empty_request("GET", "/api/todos")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("could not parse"));
}

#[tokio::test]
async fn index_serves_html() {
    let dir = TempDir::new().unwrap();
    let app = file_app(&dir, IdPolicy::Counter);

    let response = app.oneshot(empty_request("GET", "/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[http::header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(String::from_utf8_lossy(&bytes).contains("/api/todos"));
}

// --- document backend over a live mock server, rest responses ---

fn document_app(endpoint: String) -> Router {
    let credentials = Credentials {
        endpoint,
        project_id: "demo".to_string(),
        api_key: Some("k3y".to_string()),
    };
    let collection = RemoteCollection::from_credentials(&credentials, "todos");
    let store = DocumentStore::new(Arc::new(collection));
    app(AppState::new(Arc::new(store), ResponseStyle::Rest))
}

#[tokio::test]
async fn document_backend_lifecycle() {
    let app = document_app(start_mock(Some("k3y")));

    // create
    let (status, created) = send(&app, json_request("POST", "/todos", r#"{"text":"buy milk","user":"ann","dueDate":"mon"}"#)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["completed"], false);
    assert_eq!(created["priority"], "medium");
    assert_eq!(created["category"], "");
    assert_eq!(created["due_date"], "mon");
    assert!(created.get("created_at").is_none());
    let id = created["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    send(&app, json_request("POST", "/todos", r#"{"text":"walk dog","user":"bob"}"#)).await;

    // scoped list
    let (status, todos) = send(&app, empty_request("GET", "/todos?user=ann")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(todos.as_array().unwrap().len(), 1);
    assert_eq!(todos[0]["id"], id.as_str());
    assert_eq!(todos[0]["user_id"], "ann");

    // unscoped list returns everything
    let (_, todos) = send(&app, empty_request("GET", "/todos")).await;
    assert_eq!(todos.as_array().unwrap().len(), 2);

    // update
    let (status, ack) = send(&app, json_request("PUT", &format!("/todos/{id}"), r#"{"completed":true}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, json!({ "status": "updated" }));
    let (_, todo) = send(&app, empty_request("GET", &format!("/todos/{id}"))).await;
    assert_eq!(todo["completed"], true);
    assert_eq!(todo["text"], "buy milk");

    // update of a missing document surfaces the backend's not-found
    let (status, body) = send(&app, json_request("PUT", "/todos/ghost", r#"{"completed":true}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    // missing text
    let (status, _) = send(&app, json_request("POST", "/todos", r#"{"user":"ann"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // delete, then again: no existence check
    for _ in 0..2 {
        let (status, ack) = send(&app, empty_request("DELETE", &format!("/todos/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack, json!({ "status": "deleted" }));
    }
    let (_, todos) = send(&app, empty_request("GET", "/todos?user=ann")).await;
    assert_eq!(todos, json!([]));
}

#[tokio::test]
async fn unreachable_document_backend_is_a_bad_gateway() {
    // bind then drop to get a port nothing listens on
    let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let app = document_app(format!("http://{addr}"));

    let (status, body) = send(&app, empty_request("GET", "/todos")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].is_string());
}
