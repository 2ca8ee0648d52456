mod common;

use common::{no_content, tester};
use pipes_provider::testing::{assert_error_contains, assert_plan_does_not_change_attribute};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pipeline_body(title: &str, schedule: &str) -> Value {
    json!({
        "id": "p_cgdnm6e5ak7ik1i0t6u0",
        "title": title,
        "pipeline": "pipeline.snapshot_dashboard",
        "frequency": {"type": "interval", "schedule": schedule},
        "args": {"resource": "aws_compliance.benchmark.cis_v150"},
        "tags": {"env": "prod"},
        "workspace_id": "w_cgdnm6e5ak7ik1i0t6p0",
        "identity_id": "o_cgdnm6e5ak7ik1i0t6n0",
        "last_process_id": "pp_cgdnm6e5ak7ik1i0t6v0",
        "created_at": "2024-02-01T10:00:00Z",
        "updated_at": "2024-02-01T10:00:00Z",
        "version_id": 1
    })
}

fn snapshot_body(visibility: &str) -> Value {
    json!({
        "id": "snap_cgdnm6e5ak7ik1i0t6w0",
        "title": "AWS Compliance",
        "dashboard_name": "aws_compliance.benchmark.cis_v150",
        "dashboard_title": "CIS v1.5.0",
        "schema_version": "20221222",
        "state": "available",
        "visibility": visibility,
        "tags": null,
        "workspace_id": "w_cgdnm6e5ak7ik1i0t6p0",
        "identity_id": "o_cgdnm6e5ak7ik1i0t6n0",
        "created_at": "2024-02-01T10:00:00Z",
        "updated_at": "2024-02-01T10:00:00Z",
        "version_id": 1
    })
}

#[tokio::test]
async fn test_pipeline_create() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v0/org/acme/workspace/dev/pipeline"))
        .and(body_json(json!({
            "title": "Daily CIS",
            "pipeline": "pipeline.snapshot_dashboard",
            "frequency": {"type": "interval", "schedule": "daily"},
            "args": {"resource": "aws_compliance.benchmark.cis_v150"},
            "tags": {"env": "prod"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(pipeline_body("Daily CIS", "daily")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v0/org/acme/workspace/dev/pipeline/p_cgdnm6e5ak7ik1i0t6u0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pipeline_body("Daily CIS", "daily")))
        .mount(&server)
        .await;

    let tester = tester(&server, Some("acme")).await;
    let args = "{ \"resource\": \"aws_compliance.benchmark.cis_v150\" }";
    let config = json!({
        "workspace_handle": "dev",
        "title": "Daily CIS",
        "pipeline": "pipeline.snapshot_dashboard",
        "frequency": {"type": "interval", "schedule": "daily"},
        "args": args,
        "tags": "{\"env\": \"prod\"}"
    });
    tester
        .validate_resource_config("pipes_workspace_pipeline", config.clone())
        .await
        .unwrap();

    let state = tester
        .lifecycle_create("pipes_workspace_pipeline", config.clone())
        .await
        .unwrap();
    assert_eq!(state["id"], "acme/dev/p_cgdnm6e5ak7ik1i0t6u0");
    assert_eq!(state["frequency"], json!({"type": "interval", "schedule": "daily"}));
    assert_eq!(state["last_process_id"], "pp_cgdnm6e5ak7ik1i0t6v0");
    // Equivalent JSON keeps the configured text, so the next plan is clean.
    assert_eq!(state["args"], args);

    let plan = tester
        .plan_update("pipes_workspace_pipeline", state, config)
        .await
        .unwrap();
    assert_plan_does_not_change_attribute(&plan, "args");
    assert_plan_does_not_change_attribute(&plan, "tags");
}

#[tokio::test]
async fn test_pipeline_frequency_update() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v0/org/acme/workspace/dev/pipeline/p_cgdnm6e5ak7ik1i0t6u0"))
        .and(body_json(json!({"frequency": {"type": "interval", "schedule": "weekly"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(pipeline_body("Daily CIS", "weekly")))
        .expect(1)
        .mount(&server)
        .await;

    let tester = tester(&server, None).await;
    let prior = json!({
        "organization": "acme",
        "workspace_handle": "dev",
        "pipeline_id": "p_cgdnm6e5ak7ik1i0t6u0",
        "title": "Daily CIS",
        "pipeline": "pipeline.snapshot_dashboard",
        "frequency": {"type": "interval", "schedule": "daily"},
        "args": "{\"resource\":\"aws_compliance.benchmark.cis_v150\"}",
        "tags": "{\"env\":\"prod\"}"
    });
    let mut planned = prior.clone();
    planned["frequency"]["schedule"] = json!("weekly");

    let state = tester
        .update("pipes_workspace_pipeline", prior, planned)
        .await
        .unwrap();
    assert_eq!(state["frequency"]["schedule"], "weekly");
}

#[tokio::test]
async fn test_pipeline_requires_frequency() {
    let server = MockServer::start().await;
    let tester = tester(&server, Some("acme")).await;
    let diagnostics = tester
        .resource_config_diagnostics(
            "pipes_workspace_pipeline",
            json!({"workspace_handle": "dev", "title": "Daily CIS", "pipeline": "pipeline.snapshot_dashboard"}),
        )
        .await
        .unwrap();
    assert_error_contains(&diagnostics, "frequency");
}

#[tokio::test]
async fn test_snapshot_create_and_update() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v0/org/acme/workspace/dev/snapshot"))
        .and(body_json(json!({
            "data": {"schema_version": "20221222", "panels": {}},
            "visibility": "workspace"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(snapshot_body("workspace")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v0/org/acme/workspace/dev/snapshot/snap_cgdnm6e5ak7ik1i0t6w0"))
        .and(body_json(json!({"visibility": "anyone_with_link"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body("anyone_with_link")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v0/org/acme/workspace/dev/snapshot/snap_cgdnm6e5ak7ik1i0t6w0"))
        .respond_with(no_content())
        .expect(1)
        .mount(&server)
        .await;

    let tester = tester(&server, Some("acme")).await;
    let data = "{\"schema_version\": \"20221222\", \"panels\": {}}";
    let created = tester
        .create(
            "pipes_workspace_snapshot",
            json!({"workspace_handle": "dev", "data": data, "visibility": "workspace"}),
        )
        .await
        .unwrap();
    assert_eq!(created["data"], data);
    assert_eq!(created["dashboard_name"], "aws_compliance.benchmark.cis_v150");
    assert!(created["tags"].is_null());

    let mut planned = created.clone();
    planned["visibility"] = json!("anyone_with_link");
    let updated = tester
        .update("pipes_workspace_snapshot", created, planned)
        .await
        .unwrap();
    assert_eq!(updated["visibility"], "anyone_with_link");

    tester.delete("pipes_workspace_snapshot", updated).await.unwrap();
}

#[tokio::test]
async fn test_snapshot_rejects_unknown_visibility() {
    let server = MockServer::start().await;
    let tester = tester(&server, Some("acme")).await;
    let diagnostics = tester
        .resource_config_diagnostics(
            "pipes_workspace_snapshot",
            json!({"workspace_handle": "dev", "data": "{}", "visibility": "public"}),
        )
        .await
        .unwrap();
    assert_error_contains(&diagnostics, "anyone_with_link");
}

#[tokio::test]
async fn test_pipeline_invalid_json_caught_before_apply() {
    let server = MockServer::start().await;
    let tester = tester(&server, Some("acme")).await;
    let diagnostics = tester
        .resource_config_diagnostics(
            "pipes_workspace_pipeline",
            json!({
                "workspace_handle": "dev",
                "title": "Daily CIS",
                "pipeline": "pipeline.snapshot_dashboard",
                "frequency": {"type": "interval", "schedule": "daily"},
                "args": "{resource",
                "tags": "[\"prod\"]"
            }),
        )
        .await
        .unwrap();

    let attributes: Vec<_> = diagnostics
        .iter()
        .filter_map(|d| d.attribute.as_deref())
        .collect();
    assert_eq!(attributes, vec!["args", "tags"]);
    assert_error_contains(&diagnostics, "must be a JSON object");
    assert!(server.received_requests().await.unwrap().is_empty());
}
