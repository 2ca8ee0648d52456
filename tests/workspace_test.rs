mod common;

use common::{mount_actor, no_content, not_found, tester, ACTOR};
use pipes_provider::testing::{assert_plan_replaces, assert_plan_updates_in_place};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn workspace_body(handle: &str) -> Value {
    json!({
        "id": "w_cgdnm6e5ak7ik1i0t6p0",
        "handle": handle,
        "identity_id": "o_cgdnm6e5ak7ik1i0t6n0",
        "instance_type": "db1.shared",
        "desired_state": "enabled",
        "state": "enabled",
        "hive": "usea1-shared-0001",
        "host": "acme-dev.usea1.db.pipes.turbot.com",
        "database_name": "abc123",
        "db_volume_size_bytes": 1073741824,
        "created_at": "2024-02-01T10:00:00Z",
        "updated_at": "2024-02-01T10:00:00Z",
        "version_id": 2
    })
}

#[tokio::test]
async fn test_workspace_in_resource_organization() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v0/org/acme/workspace"))
        .and(body_json(json!({"handle": "dev", "instance_type": "db1.shared"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(workspace_body("dev")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v0/org/acme/workspace/dev"))
        .respond_with(ResponseTemplate::new(200).set_body_json(workspace_body("dev")))
        .mount(&server)
        .await;

    let tester = tester(&server, Some("other")).await;
    let state = tester
        .lifecycle_create(
            "pipes_workspace",
            json!({"organization": "acme", "handle": "dev", "instance_type": "db1.shared"}),
        )
        .await
        .unwrap();

    assert_eq!(state["id"], "acme/dev");
    assert_eq!(state["organization"], "acme");
    assert_eq!(state["workspace_id"], "w_cgdnm6e5ak7ik1i0t6p0");
    assert_eq!(state["workspace_state"], "enabled");
    assert_eq!(state["db_volume_size_bytes"], 1073741824);
    common::assert_authenticated(&server).await;
}

#[tokio::test]
async fn test_workspace_in_provider_organization() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v0/org/acme/workspace"))
        .and(body_json(json!({"handle": "dev"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(workspace_body("dev")))
        .expect(1)
        .mount(&server)
        .await;

    let tester = tester(&server, Some("acme")).await;
    let state = tester
        .create("pipes_workspace", json!({"handle": "dev"}))
        .await
        .unwrap();
    assert_eq!(state["organization"], "acme");
    assert_eq!(state["id"], "acme/dev");
}

#[tokio::test]
async fn test_workspace_owned_by_actor() {
    let server = MockServer::start().await;
    mount_actor(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v0/user/jane/workspace"))
        .respond_with(ResponseTemplate::new(201).set_body_json(workspace_body("dev")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v0/user/jane/workspace/dev"))
        .respond_with(ResponseTemplate::new(200).set_body_json(workspace_body("dev")))
        .expect(1)
        .mount(&server)
        .await;

    let tester = tester(&server, None).await;
    let created = tester
        .create("pipes_workspace", json!({"handle": "dev"}))
        .await
        .unwrap();
    assert!(created["organization"].is_null());
    assert_eq!(created["id"], format!("{}/dev", ACTOR));

    // The actor is cached, so the refresh does not fetch it again.
    let refreshed = tester.read_existing("pipes_workspace", created).await.unwrap();
    assert_eq!(refreshed["hive"], "usea1-shared-0001");
}

#[tokio::test]
async fn test_workspace_rename_is_in_place() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v0/org/acme/workspace/dev"))
        .and(body_json(json!({"handle": "staging"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(workspace_body("staging")))
        .expect(1)
        .mount(&server)
        .await;

    let tester = tester(&server, None).await;
    let mut prior = workspace_body("dev");
    let workspace_state = prior.as_object_mut().unwrap().remove("state").unwrap();
    prior["workspace_state"] = workspace_state;
    prior["organization"] = json!("acme");
    prior["id"] = json!("acme/dev");
    let proposed = json!({"organization": "acme", "handle": "staging"});

    let plan = tester
        .plan_update("pipes_workspace", prior.clone(), proposed)
        .await
        .unwrap();
    assert_plan_updates_in_place(&plan);

    let state = tester
        .update("pipes_workspace", prior, plan.planned_state)
        .await
        .unwrap();
    assert_eq!(state["id"], "acme/staging");
    assert_eq!(state["handle"], "staging");
}

#[tokio::test]
async fn test_workspace_organization_change_replaces() {
    let server = MockServer::start().await;
    let tester = tester(&server, None).await;
    let prior = json!({"id": "acme/dev", "organization": "acme", "handle": "dev", "workspace_id": "w_1"});

    let plan = tester
        .plan_update("pipes_workspace", prior, json!({"organization": "globex", "handle": "dev"}))
        .await
        .unwrap();
    assert_plan_replaces(&plan);
}

#[tokio::test]
async fn test_workspace_import_resolves_owner() {
    let server = MockServer::start().await;
    mount_actor(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v0/user/jane/workspace/dev"))
        .respond_with(ResponseTemplate::new(200).set_body_json(workspace_body("dev")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v0/org/acme/workspace/dev"))
        .respond_with(ResponseTemplate::new(200).set_body_json(workspace_body("dev")))
        .expect(1)
        .mount(&server)
        .await;

    let tester = tester(&server, None).await;

    let user_owned = tester.import("pipes_workspace", "jane/dev").await.unwrap();
    assert!(user_owned["organization"].is_null());
    assert_eq!(user_owned["id"], "jane/dev");

    let org_owned = tester.import("pipes_workspace", "acme/dev").await.unwrap();
    assert_eq!(org_owned["organization"], "acme");
    assert_eq!(org_owned["id"], "acme/dev");
}

#[tokio::test]
async fn test_workspace_import_rejects_malformed_id() {
    let server = MockServer::start().await;
    let tester = tester(&server, None).await;
    let err = tester.import("pipes_workspace", "dev").await.unwrap_err();
    assert!(err.to_string().contains("{owner}/{workspace_handle}"));
}

#[tokio::test]
async fn test_workspace_deleted_outside() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/org/acme/workspace/dev"))
        .respond_with(not_found())
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v0/org/acme/workspace/dev"))
        .respond_with(no_content())
        .expect(1)
        .mount(&server)
        .await;

    let tester = tester(&server, None).await;
    let state = json!({"id": "acme/dev", "organization": "acme", "handle": "dev"});
    assert!(tester.read("pipes_workspace", state.clone()).await.unwrap().is_none());
    tester.delete("pipes_workspace", state).await.unwrap();
}

#[tokio::test]
async fn test_user_workspace_stays_with_user_under_provider_organization() {
    let server = MockServer::start().await;
    mount_actor(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v0/user/jane/workspace/dev"))
        .respond_with(ResponseTemplate::new(200).set_body_json(workspace_body("dev")))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v0/user/jane/workspace/dev"))
        .respond_with(no_content())
        .expect(1)
        .mount(&server)
        .await;

    let tester = tester(&server, Some("acme")).await;
    let state = json!({"id": "jane/dev", "organization": null, "handle": "dev"});

    let refreshed = tester.read_existing("pipes_workspace", state).await.unwrap();
    assert!(refreshed["organization"].is_null());
    assert_eq!(refreshed["id"], "jane/dev");

    let imported = tester.import("pipes_workspace", "jane/dev").await.unwrap();
    assert!(imported["organization"].is_null());

    tester.delete("pipes_workspace", refreshed).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| !r.url.path().starts_with("/api/v0/org/")));
}
