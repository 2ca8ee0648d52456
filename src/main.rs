use pipes_provider::{init_logging, serve, PipesProvider};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Pipes provider");
    serve(PipesProvider::new()).await
}
