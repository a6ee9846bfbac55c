//! Integration tests for the hosted session table client
//!
//! Uses wiremock to stand in for the PostgREST endpoint.

use serde_json::json;
use wiremock::{
    matchers::{body_json, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use strategy_facilitator::config::HostedTableConfig;
use strategy_facilitator::error::StorageError;
use strategy_facilitator::llm::RetryPolicy;
use strategy_facilitator::storage::{HostedSessionStore, SessionSnapshot, SessionStore};

const TABLE_PATH: &str = "/rest/v1/sessions";

fn create_store(base_url: &str) -> HostedSessionStore {
    HostedSessionStore::new(
        &HostedTableConfig {
            url: base_url.to_string(),
            api_key: "anon-key".to_string(),
            table: "sessions".to_string(),
        },
        5000,
    )
    .expect("Failed to create store")
}

#[tokio::test]
async fn test_list_sessions() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .and(query_param("select", "id,name"))
        .and(query_param("order", "created_at.desc"))
        .and(header("apikey", "anon-key"))
        .and(header("Authorization", "Bearer anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 2, "name": "Newer"},
            {"id": 1, "name": "Older"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = create_store(&mock_server.uri());
    let sessions = store.list_sessions().await.unwrap();

    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].id, "2");
    assert_eq!(sessions[0].name, "Newer");
}

#[tokio::test]
async fn test_insert_session() {
    let mock_server = MockServer::start().await;
    let snapshot = SessionSnapshot {
        problem: "Churn".to_string(),
        context: "SaaS".to_string(),
        ..Default::default()
    };

    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .and(header("Prefer", "return=representation"))
        .and(body_json(json!({
            "name": "Saved",
            "content": serde_json::to_value(&snapshot).unwrap()
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!([{"id": 7, "name": "Saved"}])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = create_store(&mock_server.uri());
    let summary = store.insert_session("Saved", &snapshot).await.unwrap();

    assert_eq!(summary.id, "7");
    assert_eq!(summary.name, "Saved");
}

#[tokio::test]
async fn test_fetch_session_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .and(query_param("select", "content"))
        .and(query_param("id", "eq.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "content": {
                "problem": "Churn",
                "context": null,
                "activeFramework": "5 Whys",
                "answers": null
            }
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = create_store(&mock_server.uri());
    let snapshot = store.fetch_session_content("7").await.unwrap();

    assert_eq!(snapshot.problem, "Churn");
    assert_eq!(snapshot.context, "");
    assert_eq!(snapshot.active_framework.as_deref(), Some("5 Whys"));
    assert!(snapshot.answers.is_empty());
}

#[tokio::test]
async fn test_fetch_missing_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let store = create_store(&mock_server.uri());
    let result = store.fetch_session_content("99").await;

    assert!(matches!(result, Err(StorageError::SessionNotFound { .. })));
}

#[tokio::test]
async fn test_delete_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(TABLE_PATH))
        .and(query_param("id", "eq.7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = create_store(&mock_server.uri());
    store.delete_session("7").await.unwrap();
}

#[tokio::test]
async fn test_error_status_surfaces_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("JWT expired"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = create_store(&mock_server.uri());
    let err = store.list_sessions().await.unwrap_err();

    assert_eq!(err.to_string(), "Hosted table error: 401 - JWT expired");
}

#[tokio::test]
async fn test_retry_policy_applies_to_store_calls() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let retry = RetryPolicy::new(2, 5, 0, |e: &StorageError| {
        matches!(e, StorageError::Hosted { status: 503, .. })
    });
    let store = create_store(&mock_server.uri()).with_retry_policy(retry);

    assert!(store.list_sessions().await.unwrap().is_empty());
}
