//! A small server showing routes, interceptors and the JSON helpers.

use std::time::Duration;

use flowhttp::{AccessLog, Latency, NotFound};
use flowhttp::server::{Flow, ServerConfig};
use log::info;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize the logger
    env_logger::init();

    let mut flow = Flow::new();
    flow.use_middleware(AccessLog)
        .use_middleware(Latency::new(Some(Duration::from_millis(5))));

    // Plain text response
    flow.get("/ping", |ctx| {
        Box::pin(async move {
            ctx.set_body("pong");
            Ok(())
        })
    });

    // Query parameters and attributes
    flow.get("/hello", |ctx| {
        Box::pin(async move {
            let name = ctx
                .param("name")
                .and_then(|v| v.as_str())
                .unwrap_or("World")
                .to_string();
            ctx.set_body(format!("Hello, {name}!"));
            Ok(())
        })
    });

    // JSON body in, JSON body out
    flow.post("/echo", |ctx| {
        Box::pin(async move {
            let received = ctx.request_body().cloned().unwrap_or_default();
            ctx.json(201, &json!({ "received": received, "ip": ctx.ip() }))
        })
    });

    flow.use_router().use_middleware(NotFound);

    let config = ServerConfig {
        addr: "127.0.0.1:8081".parse()?,
        ..ServerConfig::default()
    };
    let server = flow.bind(config).await?;
    info!("Try: curl http://{}/ping", server.local_addr()?);
    server.run().await?;

    Ok(())
}
