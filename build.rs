//! Build script for proto compilation.
//!
//! Compiles `proto/provider.proto` into `OUT_DIR`, where `src/lib.rs` picks
//! it up through `tonic::include_proto!`. Both the server and the client are
//! generated; the client is only used by the round-trip tests.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_prost_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&["proto/provider.proto"], &["proto"])?;

    println!("cargo:rerun-if-changed=proto/provider.proto");

    Ok(())
}
