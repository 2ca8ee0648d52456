#![allow(dead_code)]

use std::time::Duration;

use pipes_provider::retry::RetryPolicy;
use pipes_provider::testing::ProviderTester;
use pipes_provider::PipesProvider;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "tpt_c6f5tmpe4mv9appio5rg";
pub const ACTOR: &str = "jane";

pub fn fast_retries() -> RetryPolicy {
    RetryPolicy::new(
        Duration::from_secs(5),
        Duration::from_millis(5),
        Duration::from_millis(20),
    )
}

/// A provider configured against the mock server.
pub async fn tester(server: &MockServer, organization: Option<&str>) -> ProviderTester<PipesProvider> {
    let tester = ProviderTester::new(PipesProvider::with_retry_policy(fast_retries()));
    let mut config = json!({"host": server.uri(), "token": TOKEN});
    if let Some(org) = organization {
        config["organization"] = json!(org);
    }
    tester.configure(config).await.expect("configure");
    tester
}

pub fn actor_body() -> Value {
    json!({
        "id": "u_cgdnm6e5ak7ik1i0t6mg",
        "handle": ACTOR,
        "display_name": "Jane Doe",
        "email": "jane@example.com",
        "status": "accepted",
        "avatar_url": "https://avatars.example.com/jane",
        "url": "https://jane.example.com",
        "created_at": "2024-01-10T09:00:00Z",
        "updated_at": "2024-01-10T09:00:00Z",
        "version_id": 3
    })
}

/// Serve `GET /actor`, expecting it to be fetched at most once.
pub async fn mount_actor(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v0/actor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(actor_body()))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

pub fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "status": 404,
        "title": "Not Found",
        "detail": "Not found"
    }))
}

pub fn no_content() -> ResponseTemplate {
    ResponseTemplate::new(204)
}

/// Assert every request the server saw carried the bearer token.
pub async fn assert_authenticated(server: &MockServer) {
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(!requests.is_empty(), "no requests reached the mock server");
    for request in requests {
        let auth = request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert_eq!(auth, format!("Bearer {}", TOKEN), "{} {}", request.method, request.url);
    }
}
