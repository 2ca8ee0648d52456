//! Round trip through the gRPC server with the generated client.

mod common;

use common::{actor_body, TOKEN};
use pipes_provider::generated::diagnostic::Severity;
use pipes_provider::generated::provider_client::ProviderClient;
use pipes_provider::generated::{
    ConfigureRequest, GetMetadataRequest, ReadDataSourceRequest, ReadRequest,
};
use pipes_provider::{serve_with_shutdown, PipesProvider, ServeOptions};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_grpc_round_trip() {
    let api = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/actor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(actor_body()))
        .mount(&api)
        .await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let server = serve_with_shutdown(
        PipesProvider::new(),
        listener,
        async {
            shutdown_rx.await.ok();
        },
        ServeOptions::default(),
    );

    let client = async {
        let mut client = ProviderClient::connect(format!("http://{}", addr))
            .await
            .unwrap();

        let metadata = client
            .get_metadata(GetMetadataRequest {})
            .await
            .unwrap()
            .into_inner();
        assert!(metadata.resources.contains(&"pipes_workspace".to_string()));
        assert_eq!(metadata.data_sources, vec!["pipes_organization", "pipes_user"]);

        // Resource calls report an error diagnostic until configure has run.
        let read = client
            .read(ReadRequest {
                resource_type: "pipes_workspace".to_string(),
                current_state: serde_json::to_vec(&json!({"workspace_handle": "dev"})).unwrap(),
            })
            .await
            .unwrap()
            .into_inner();
        assert_eq!(read.diagnostics.len(), 1);
        assert_eq!(read.diagnostics[0].severity, Severity::Error as i32);
        assert!(read.diagnostics[0].summary.contains("not been configured"));

        let configured = client
            .configure(ConfigureRequest {
                host_version: "1.0.0".to_string(),
                config: serde_json::to_vec(&json!({"host": api.uri(), "token": TOKEN})).unwrap(),
            })
            .await
            .unwrap()
            .into_inner();
        assert!(configured.diagnostics.is_empty());

        let user = client
            .read_data_source(ReadDataSourceRequest {
                data_source_type: "pipes_user".to_string(),
                config: b"{}".to_vec(),
            })
            .await
            .unwrap()
            .into_inner();
        assert!(user.diagnostics.is_empty());
        let state: Value = serde_json::from_slice(&user.state).unwrap();
        assert_eq!(state["handle"], "jane");

        shutdown_tx.send(()).unwrap();
    };

    let (served, ()) = tokio::join!(server, client);
    assert!(served.is_ok());
}
