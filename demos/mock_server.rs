//! Serve canned responses from a JSON route document.
//!
//! ```text
//! cargo run --example mock_server -- routes.json [port] [latency-ms]
//! ```
//!
//! Files in `./assets` are served under `/assets/`.

use std::env;

use flowhttp::mock::{load_document, register_document};
use flowhttp::server::{Flow, ServerConfig};
use flowhttp::{AccessLog, Assets, Latency, NotFound};
use log::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: mock_server <routes.json> [port] [latency-ms]");
        std::process::exit(2);
    };
    let port = args.next().map(|p| p.parse()).transpose()?.unwrap_or(5000);
    let latency = args.next().map(|ms| ms.parse()).transpose()?;

    let document = load_document(&path).await?;

    let mut flow = Flow::new();
    flow.use_middleware(AccessLog).use_middleware(Assets::new("assets", "assets"));
    if let Some(ms) = latency {
        flow.use_middleware(Latency::from_millis(ms));
    }
    let count = register_document(&mut flow, &document);
    flow.use_router().use_middleware(NotFound);
    info!("Loaded {count} routes from {path}");

    let server = flow.bind(ServerConfig::with_port(port)).await?;
    server.run().await?;
    Ok(())
}
