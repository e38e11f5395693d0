//! Serves `Hello World!` to every HTTP/0.9 request.
//!
//! ```text
//! cargo run --example hello_world [config.json]
//! printf 'GET /hello\r\n' | nc 127.0.0.1 9000
//! ```

use h09::handlers::{Logged, Text};
use h09::{Config, Server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_json(&std::fs::read_to_string(path)?)?,
        None => Config::default(),
    };

    let server = Server::bind(config, Logged::new(Text::new("Hello World!"))).await?;

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    Ok(())
}
