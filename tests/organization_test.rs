mod common;

use common::{assert_authenticated, no_content, not_found, tester};
use pipes_provider::testing::{assert_plan_creates, assert_plan_updates_in_place};
use pipes_provider::ProviderError;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn org_body(handle: &str, display_name: &str) -> serde_json::Value {
    json!({
        "id": "o_cgdnm6e5ak7ik1i0t6n0",
        "handle": handle,
        "display_name": display_name,
        "url": "https://acme.example.com",
        "avatar_url": null,
        "created_at": "2024-02-01T10:00:00Z",
        "updated_at": "2024-02-01T10:00:00Z",
        "version_id": 1
    })
}

#[tokio::test]
async fn test_organization_create_and_read() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v0/org"))
        .and(header("authorization", format!("Bearer {}", common::TOKEN).as_str()))
        .and(body_json(json!({"handle": "acme", "display_name": "Acme Corp"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(org_body("acme", "Acme Corp")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v0/org/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(org_body("acme", "Acme Corp")))
        .mount(&server)
        .await;

    let tester = tester(&server, None).await;
    let config = json!({"handle": "acme", "display_name": "Acme Corp"});

    let plan = tester.plan_create("pipes_organization", config.clone()).await.unwrap();
    assert_plan_creates(&plan);

    let state = tester.lifecycle_create("pipes_organization", config).await.unwrap();
    assert_eq!(state["id"], "acme");
    assert_eq!(state["organization_id"], "o_cgdnm6e5ak7ik1i0t6n0");
    assert_eq!(state["url"], "https://acme.example.com");
    assert_eq!(state["version_id"], 1);
    assert!(state["avatar_url"].is_null());

    assert_authenticated(&server).await;
}

#[tokio::test]
async fn test_organization_update_sends_changed_fields_only() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v0/org/acme"))
        .and(body_json(json!({"handle": "acme-corp", "display_name": "Acme Corporation"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(org_body("acme-corp", "Acme Corporation")),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v0/org/acme-corp"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(org_body("acme-corp", "Acme Corporation")),
        )
        .mount(&server)
        .await;

    let tester = tester(&server, None).await;
    let prior = json!({
        "id": "acme",
        "handle": "acme",
        "display_name": "Acme Corp",
        "url": "https://acme.example.com",
        "avatar_url": null,
        "organization_id": "o_cgdnm6e5ak7ik1i0t6n0",
        "created_at": "2024-02-01T10:00:00Z",
        "updated_at": "2024-02-01T10:00:00Z",
        "version_id": 1
    });
    let proposed = json!({"handle": "acme-corp", "display_name": "Acme Corporation"});

    let plan = tester
        .plan_update("pipes_organization", prior.clone(), proposed.clone())
        .await
        .unwrap();
    assert_plan_updates_in_place(&plan);

    let state = tester
        .lifecycle_update("pipes_organization", prior, proposed)
        .await
        .unwrap();
    assert_eq!(state["id"], "acme-corp");
    assert_eq!(state["display_name"], "Acme Corporation");
}

#[tokio::test]
async fn test_organization_read_missing_returns_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/org/gone"))
        .respond_with(not_found())
        .mount(&server)
        .await;

    let tester = tester(&server, None).await;
    let state = tester
        .read("pipes_organization", json!({"id": "gone", "handle": "gone"}))
        .await
        .unwrap();
    assert!(state.is_none());
}

#[tokio::test]
async fn test_organization_delete() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v0/org/acme"))
        .respond_with(no_content())
        .expect(1)
        .mount(&server)
        .await;

    let tester = tester(&server, None).await;
    tester
        .lifecycle_delete("pipes_organization", json!({"id": "acme", "handle": "acme"}))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_organization_import() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/org/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(org_body("acme", "Acme Corp")))
        .mount(&server)
        .await;

    let tester = tester(&server, None).await;
    let state = tester.import("pipes_organization", "acme").await.unwrap();
    assert_eq!(state["handle"], "acme");
    assert_eq!(state["display_name"], "Acme Corp");
}

#[tokio::test]
async fn test_import_missing_organization_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/org/nope"))
        .respond_with(not_found())
        .mount(&server)
        .await;

    let tester = tester(&server, None).await;
    let err = tester.import("pipes_organization", "nope").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_api_error_message_is_preserved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v0/org"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "status": 409,
            "title": "Conflict",
            "detail": "Handle acme is already in use."
        })))
        .mount(&server)
        .await;

    let tester = tester(&server, None).await;
    let err = tester
        .create("pipes_organization", json!({"handle": "acme"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::AlreadyExists(ref msg) if msg == "Handle acme is already in use."));
}

#[tokio::test]
async fn test_organization_data_source() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/org/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(org_body("acme", "Acme Corp")))
        .mount(&server)
        .await;

    let tester = tester(&server, None).await;
    tester
        .validate_data_source_config("pipes_organization", json!({"handle": "acme"}))
        .await
        .unwrap();
    let state = tester
        .read_data_source("pipes_organization", json!({"handle": "acme"}))
        .await
        .unwrap();
    assert_eq!(state["organization_id"], "o_cgdnm6e5ak7ik1i0t6n0");
    assert_eq!(state["display_name"], "Acme Corp");
}
