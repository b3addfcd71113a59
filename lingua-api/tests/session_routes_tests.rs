//! Session document boundary tests: glossary and prefs over HTTP

mod helpers;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use helpers::*;
use lingua_api::RouterOptions;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_fresh_session_returns_empty_documents() {
    let app = test_app(ScriptedGateway::replying("")).await;

    let response = send(&app, get("/sessions/new-session/glossary")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));

    let response = send(&app, get("/sessions/new-session/prefs")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({}));
}

#[tokio::test]
async fn test_glossary_round_trip() {
    let app = test_app(ScriptedGateway::replying("")).await;
    let glossary = json!(["synergy", {"term": "circle back", "severity": 2}, "leverage"]);

    for _ in 0..2 {
        let response = send(&app, post_json("/sessions/s1/glossary", &json!({"glossary": glossary}))).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(body_bytes(response).await.is_empty());
    }

    let response = send(&app, get("/sessions/s1/glossary")).await;
    assert_eq!(body_json(response).await, glossary);
}

#[tokio::test]
async fn test_non_list_glossary_stored_as_empty() {
    let app = test_app(ScriptedGateway::replying("")).await;
    send(&app, post_json("/sessions/s1/glossary", &json!({"glossary": ["a"]}))).await;

    for body in [r#"{"glossary": "synergy"}"#, r#"{"other": []}"#, "not json"] {
        let response = send(&app, post_raw("/sessions/s1/glossary", body)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, get("/sessions/s1/glossary")).await;
        assert_eq!(body_json(response).await, json!([]), "after {:?}", body);
    }
}

#[tokio::test]
async fn test_prefs_round_trip_and_normalization() {
    let app = test_app(ScriptedGateway::replying("")).await;
    let prefs = json!({"audience": "Executives", "tone": "Formal", "extra": {"nested": [1, 2]}});

    let response = send(&app, post_json("/sessions/s1/prefs", &prefs)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(body_json(send(&app, get("/sessions/s1/prefs")).await).await, prefs);

    send(&app, post_json("/sessions/s1/prefs", &json!(["not", "a", "map"]))).await;
    assert_eq!(body_json(send(&app, get("/sessions/s1/prefs")).await).await, json!({}));
}

#[tokio::test]
async fn test_sessions_do_not_share_documents() {
    let app = test_app(ScriptedGateway::replying("")).await;

    send(&app, post_json("/sessions/a/glossary", &json!({"glossary": ["alpha"]}))).await;

    assert_eq!(body_json(send(&app, get("/sessions/a/glossary")).await).await, json!(["alpha"]));
    assert_eq!(body_json(send(&app, get("/sessions/b/glossary")).await).await, json!([]));
    assert_eq!(body_json(send(&app, get("/sessions/a/prefs")).await).await, json!({}));
}

#[tokio::test]
async fn test_other_methods_and_paths_are_not_found() {
    let app = test_app(ScriptedGateway::replying("")).await;

    for (method, uri) in [
        (Method::PUT, "/sessions/s1/glossary"),
        (Method::DELETE, "/sessions/s1/prefs"),
        (Method::GET, "/sessions/s1/history"),
        (Method::POST, "/sessions/s1"),
    ] {
        let request = Request::builder()
            .method(method.clone())
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = send(&app, request).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{} {}", method, uri);
        assert_eq!(body_json(response).await, json!({"error": "not found"}));
    }
}

#[tokio::test]
async fn test_storage_failure_is_service_unavailable() {
    let app = app_with(Arc::new(FailingStore), ScriptedGateway::replying(""), with_sessions());

    let response = send(&app, get("/sessions/s1/glossary")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await, json!({"error": "storage unavailable"}));

    let response = send(&app, post_json("/sessions/s1/prefs", &json!({"tone": "Formal"}))).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_session_routes_not_mounted_by_default() {
    let app = app_with(memory_store().await, ScriptedGateway::replying(""), RouterOptions::default());

    let response = send(&app, get("/sessions/s1/glossary")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, post_json("/sessions/s1/prefs", &json!({"tone": "Formal"}))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({"error": "not found"}));
}

#[tokio::test]
async fn test_documents_persist_in_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("lingua.db");

    {
        let pool = lingua_api::db::init_database_pool(&db_path).await.unwrap();
        let store = Arc::new(lingua_api::db::SqliteDocumentStore::new(pool));
        let app = app_with(store, ScriptedGateway::replying(""), with_sessions());
        send(&app, post_json("/sessions/s1/glossary", &json!({"glossary": ["kept"]}))).await;
    }

    let pool = lingua_api::db::init_database_pool(&db_path).await.unwrap();
    let store = Arc::new(lingua_api::db::SqliteDocumentStore::new(pool));
    let app = app_with(store, ScriptedGateway::replying(""), with_sessions());

    assert_eq!(body_json(send(&app, get("/sessions/s1/glossary")).await).await, json!(["kept"]));
}
