//! Content endpoints under `/api/posts/`
//!
//! Every method lands in one dispatcher. The trailing path is the content
//! id; it is parsed only for methods that need it, after the method check.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::{ContentRequest, Message, MessageData, ValidationError};

/// Operation selected by method and path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostRoute {
    Fetch(i32),
    Create,
    Update(i32),
    Delete(i32),
}

/// Classify a request by method and the path text after `/api/posts/`.
///
/// POST ignores the path entirely. Unsupported methods are rejected before
/// the id is looked at.
pub fn classify(method: &Method, tail: &str) -> Result<PostRoute, ApiError> {
    let id = || tail.parse::<i32>().map_err(|_| ApiError::InvalidId);

    match *method {
        Method::GET => Ok(PostRoute::Fetch(id()?)),
        Method::POST => Ok(PostRoute::Create),
        Method::PUT => Ok(PostRoute::Update(id()?)),
        Method::DELETE => Ok(PostRoute::Delete(id()?)),
        _ => Err(ApiError::MethodNotAllowed),
    }
}

/// Answer a rejected write with the validation message
fn rejected(err: ValidationError) -> Message {
    tracing::debug!(field = err.field(), "content rejected: {}", err);
    Message::new(err.to_string())
}

async fn handle(state: &AppState, route: PostRoute, body: &[u8]) -> Result<Response, ApiError> {
    let response = match route {
        PostRoute::Fetch(id) => {
            let contents = state.store.fetch_by_id(id).await?;
            Json(MessageData::success(contents)).into_response()
        }
        PostRoute::Create => {
            let request: ContentRequest = serde_json::from_slice(body)?;
            let message = match request.validate() {
                Ok(content) => {
                    state.store.create(content).await?;
                    Message::new("success create")
                }
                Err(err) => rejected(err),
            };
            Json(message).into_response()
        }
        PostRoute::Update(id) => {
            let request: ContentRequest = serde_json::from_slice(body)?;
            let message = match request.validate() {
                Ok(content) => {
                    state.store.update(id, content).await?;
                    Message::new("success update")
                }
                Err(err) => rejected(err),
            };
            Json(message).into_response()
        }
        PostRoute::Delete(id) => {
            state.store.delete(id).await?;
            Json(Message::new("success delete")).into_response()
        }
    };

    Ok(response)
}

/// ANY /api/posts/
async fn dispatch_root(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Bytes,
) -> Result<Response, ApiError> {
    handle(&state, classify(&method, "")?, &body).await
}

/// ANY /api/posts/{id}
async fn dispatch_id(
    State(state): State<Arc<AppState>>,
    method: Method,
    Path(tail): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    handle(&state, classify(&method, &tail)?, &body).await
}

/// Content routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/posts/", any(dispatch_root))
        .route("/api/posts/{*id}", any(dispatch_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ContentStore, MemoryContentStore, StoreError};
    use crate::http::server::build_router;
    use crate::models::{Content, NewContent};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(store: Arc<MemoryContentStore>) -> Router {
        build_router(AppState::new(store))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let body = match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(Request::builder().method(method).uri(uri).body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes) = send(app, method, uri, body).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_body(tags: &[&str], status: &str) -> Value {
        json!({ "title": "T", "content": "C", "status": status, "tags": tags })
    }

    #[test]
    fn classify_methods() {
        assert_eq!(classify(&Method::GET, "7").unwrap(), PostRoute::Fetch(7));
        assert_eq!(classify(&Method::POST, "junk").unwrap(), PostRoute::Create);
        assert_eq!(classify(&Method::PUT, "3").unwrap(), PostRoute::Update(3));
        assert_eq!(classify(&Method::DELETE, "-1").unwrap(), PostRoute::Delete(-1));
    }

    #[test]
    fn classify_rejects_bad_ids() {
        for tail in ["", "abc", "1/2", "1.5", "99999999999"] {
            assert!(matches!(classify(&Method::GET, tail), Err(ApiError::InvalidId)));
        }
    }

    #[test]
    fn classify_checks_method_before_id() {
        assert!(matches!(
            classify(&Method::PATCH, "abc"),
            Err(ApiError::MethodNotAllowed)
        ));
    }

    #[tokio::test]
    async fn create_then_get() {
        let store = Arc::new(MemoryContentStore::new());
        let app = app(store.clone());

        let (status, body) = send_json(&app, "POST", "/api/posts/", Some(post_body(&["x"], "draft"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "Message": "success create" }));

        let (status, body) = send_json(&app, "GET", "/api/posts/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Message"], "success");
        let data = body["Data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["id"], 1);
        assert_eq!(data[0]["title"], "T");
        assert_eq!(data[0]["content"], "C");
        assert_eq!(data[0]["tags"], json!(["x"]));
        assert_eq!(data[0]["status"], "draft");
        assert!(data[0]["publish"].is_string());
    }

    #[tokio::test]
    async fn post_ignores_path_id() {
        let store = Arc::new(MemoryContentStore::new());
        let app = app(store.clone());

        let (status, _) = send_json(&app, "POST", "/api/posts/77", Some(post_body(&[], "publish"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.fetch_by_id(1).await.unwrap().len(), 1);
        assert!(store.fetch_by_id(77).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn untagged_content_reads_empty_tag_list() {
        let store = Arc::new(MemoryContentStore::new());
        let app = app(store);

        send_json(&app, "POST", "/api/posts/", Some(json!({ "title": "T", "content": "C", "status": "draft" }))).await;

        let (_, body) = send_json(&app, "GET", "/api/posts/1", None).await;
        assert_eq!(body["Data"][0]["tags"], json!([]));
    }

    #[tokio::test]
    async fn status_is_case_insensitive_and_stored_lowercase() {
        let store = Arc::new(MemoryContentStore::new());
        let app = app(store);

        send_json(&app, "POST", "/api/posts/", Some(post_body(&[], "PUBLISH"))).await;

        let (_, body) = send_json(&app, "GET", "/api/posts/1", None).await;
        assert_eq!(body["Data"][0]["status"], "publish");
    }

    #[tokio::test]
    async fn missing_status_is_rejected_and_not_persisted() {
        let store = Arc::new(MemoryContentStore::new());
        let app = app(store.clone());

        let (status, body) = send_json(
            &app,
            "POST",
            "/api/posts/",
            Some(json!({ "title": "T", "content": "C" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "Message": "error input Status must (draft / publish)" }));
        assert!(store.fetch_by_id(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_status_is_rejected() {
        let store = Arc::new(MemoryContentStore::new());
        let app = app(store.clone());

        let (_, body) = send_json(&app, "POST", "/api/posts/", Some(post_body(&["x"], "archived"))).await;
        assert_eq!(body["Message"], "error input Status must (draft / publish)");
        assert!(store.tag_labels().await.is_empty());
    }

    #[tokio::test]
    async fn empty_title_is_rejected_first() {
        let store = Arc::new(MemoryContentStore::new());
        let app = app(store.clone());

        let (_, body) = send_json(
            &app,
            "POST",
            "/api/posts/",
            Some(json!({ "title": "", "content": "C", "status": "" })),
        )
        .await;
        assert_eq!(body, json!({ "Message": "error input" }));
        assert!(store.fetch_by_id(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn null_fields_are_validated_like_missing_ones() {
        let store = Arc::new(MemoryContentStore::new());
        let app = app(store.clone());

        let (status, body) = send_json(
            &app,
            "POST",
            "/api/posts/",
            Some(json!({ "title": "T", "content": "C", "status": null })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "Message": "error input Status must (draft / publish)" }));

        let (status, body) = send_json(
            &app,
            "POST",
            "/api/posts/",
            Some(json!({ "title": null, "content": "C", "status": "draft" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "Message": "error input" }));

        let (status, body) = send_json(
            &app,
            "PUT",
            "/api/posts/1",
            Some(json!({ "title": "T", "content": null, "status": "draft", "tags": null })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "Message": "error input" }));
        assert!(store.fetch_by_id(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_body_is_400() {
        let store = Arc::new(MemoryContentStore::new());
        let app = app(store);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/posts/")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn repeated_labels_link_once() {
        let store = Arc::new(MemoryContentStore::new());
        let app = app(store.clone());

        let (_, body) = send_json(&app, "POST", "/api/posts/", Some(post_body(&["Go", "go"], "draft"))).await;
        assert_eq!(body["Message"], "success create");
        assert_eq!(store.link_count(1).await, 1);
        assert_eq!(store.tag_labels().await, vec!["Go"]);
    }

    #[tokio::test]
    async fn update_replaces_tags() {
        let store = Arc::new(MemoryContentStore::new());
        let app = app(store.clone());

        send_json(&app, "POST", "/api/posts/", Some(post_body(&["a", "b"], "draft"))).await;

        let (status, body) = send_json(
            &app,
            "PUT",
            "/api/posts/1",
            Some(json!({ "title": "T2", "content": "C2", "status": "publish", "tags": ["c"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "Message": "success update" }));

        let (_, body) = send_json(&app, "GET", "/api/posts/1", None).await;
        let content = &body["Data"][0];
        assert_eq!(content["title"], "T2");
        assert_eq!(content["content"], "C2");
        assert_eq!(content["status"], "publish");
        assert_eq!(content["tags"], json!(["c"]));
        assert_eq!(store.tag_labels().await, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn update_validates_body() {
        let store = Arc::new(MemoryContentStore::new());
        let app = app(store.clone());

        send_json(&app, "POST", "/api/posts/", Some(post_body(&["a"], "draft"))).await;

        let (_, body) = send_json(&app, "PUT", "/api/posts/1", Some(post_body(&[], "nope"))).await;
        assert_eq!(body["Message"], "error input Status must (draft / publish)");
        assert_eq!(store.fetch_by_id(1).await.unwrap()[0].tags, vec!["a"]);
    }

    #[tokio::test]
    async fn update_with_bad_id_is_400() {
        let store = Arc::new(MemoryContentStore::new());
        let app = app(store);

        let (status, body) = send(&app, "PUT", "/api/posts/x", Some(post_body(&[], "draft"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, b"Invalid ID");
    }

    #[tokio::test]
    async fn delete_is_repeatable() {
        let store = Arc::new(MemoryContentStore::new());
        let app = app(store.clone());

        send_json(&app, "POST", "/api/posts/", Some(post_body(&["x"], "draft"))).await;

        for _ in 0..2 {
            let (status, body) = send_json(&app, "DELETE", "/api/posts/1", None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!({ "Message": "success delete" }));
        }

        let (_, body) = send_json(&app, "GET", "/api/posts/1", None).await;
        assert_eq!(body["Data"], json!([]));
        assert_eq!(store.link_count(1).await, 0);
    }

    #[tokio::test]
    async fn get_with_non_numeric_id_is_400() {
        let app = app(Arc::new(MemoryContentStore::new()));

        let (status, body) = send(&app, "GET", "/api/posts/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, b"Invalid ID");

        let (status, _) = send(&app, "GET", "/api/posts/", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn other_methods_are_405() {
        let app = app(Arc::new(MemoryContentStore::new()));

        for method in ["PATCH", "HEAD", "OPTIONS"] {
            let (status, _) = send(&app, method, "/api/posts/1", None).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{}", method);
        }
    }

    struct FailingStore;

    #[async_trait]
    impl ContentStore for FailingStore {
        async fn fetch_by_id(&self, _id: i32) -> Result<Vec<Content>, StoreError> {
            Err(StoreError::Constraint("connection refused".into()))
        }

        async fn create(&self, _content: NewContent) -> Result<i32, StoreError> {
            Err(StoreError::Constraint("connection refused".into()))
        }

        async fn update(&self, _id: i32, _content: NewContent) -> Result<(), StoreError> {
            Err(StoreError::Constraint("connection refused".into()))
        }

        async fn delete(&self, _id: i32) -> Result<(), StoreError> {
            Err(StoreError::Constraint("connection refused".into()))
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Constraint("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn storage_failure_is_500_with_raw_message() {
        let app = build_router(AppState::new(Arc::new(FailingStore)));

        let (status, body) = send(&app, "GET", "/api/posts/1", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, b"connection refused");

        let (status, _) = send(&app, "POST", "/api/posts/", Some(post_body(&[], "draft"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = send(&app, "DELETE", "/api/posts/1", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn validation_short_circuits_storage() {
        let app = build_router(AppState::new(Arc::new(FailingStore)));

        let (status, body) = send_json(&app, "PUT", "/api/posts/1", Some(post_body(&[], ""))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Message"], "error input Status must (draft / publish)");
    }
}
