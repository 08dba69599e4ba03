//! Serve the trust shield API until Ctrl+C.
//!
//! Usage: `cargo run --bin trustshield`
//!
//! State lives under `TRUSTSHIELD_HOME` (default `./.trustshield`), where
//! `trustshield.json` is created on first start.

use std::path::PathBuf;

use trustshield::server::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let _ = dotenvy::from_path(std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env"));

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let home = std::env::var_os("TRUSTSHIELD_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".trustshield"));

    let mut server = match Server::new(home).await {
        Ok(server) => server,
        Err(error) => {
            tracing::error!("failed to start server: {error}");
            std::process::exit(1);
        }
    };
    println!("Trust shield listening on http://{}", server.addr());
    println!("Press Ctrl+C to stop");

    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to wait for Ctrl+C: {error}");
    }
    tracing::info!("shutting down");
    let _ = server.shutdown();
}
