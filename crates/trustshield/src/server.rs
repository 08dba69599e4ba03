use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};

use crate::config::EngineConfig;
use crate::engine::TrustEngine;

pub mod admin;
pub mod audit;
pub mod error;
pub mod events;
pub mod openapi;
pub mod session;

pub struct Server {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    engine: Arc<TrustEngine>,
}

impl Server {
    /// Loads (or creates) the config under `home` and serves on the
    /// configured bind address.
    pub async fn new(home: PathBuf) -> Result<Self, String> {
        let config = EngineConfig::load_or_create(&home).map_err(|error| error.to_string())?;
        let bind = config.server.bind.clone();
        let engine = TrustEngine::builder(config)
            .home(home)
            .build()
            .map_err(|error| error.to_string())?;
        Self::start(Arc::new(engine), &bind).await
    }

    pub async fn start(engine: Arc<TrustEngine>, bind: &str) -> Result<Self, String> {
        let app = router(engine.clone());
        let listener = TcpListener::bind(bind)
            .await
            .map_err(|error| error.to_string())?;
        let addr = listener
            .local_addr()
            .map_err(|error| error.to_string())?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });
        tracing::info!("trust shield listening on {addr}");

        Ok(Server {
            addr,
            shutdown: Some(shutdown_tx),
            engine,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn shutdown(&mut self) -> Result<(), String> {
        if let Some(sender) = self.shutdown.take() {
            sender
                .send(())
                .map_err(|_| "failed to send server shutdown signal".to_string())
        } else {
            Ok(())
        }
    }

    pub fn engine(&self) -> &Arc<TrustEngine> {
        &self.engine
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

pub fn router(engine: Arc<TrustEngine>) -> Router {
    let state = Arc::new(ServerState { engine });
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    Router::new()
        .route("/health", get(health))
        .route("/score", get(audit::global_score))
        .route("/catalog", get(session::catalog))
        .route("/sessions", post(session::open_session))
        .route("/sessions/:id", get(session::session_snapshot))
        .route("/sessions/:id/login", post(session::login))
        .route("/sessions/:id/otp", post(session::submit_otp))
        .route("/sessions/:id/logout", post(session::logout))
        .route("/sessions/:id/cart", post(session::add_to_cart))
        .route("/sessions/:id/checkout", post(session::checkout))
        .route("/admin/zero-trust", post(admin::zero_trust))
        .route("/admin/firmware/scan", post(admin::firmware_scan))
        .route("/admin/logs/refresh", post(admin::refresh_logs))
        .route("/admin/honeypot", post(admin::honeypot))
        .route(
            "/admin/payments",
            post(admin::record_payment).get(admin::list_payments),
        )
        .route("/audit", get(audit::audit_tail))
        .route("/audit/stream", get(events::stream_events))
        .with_state(state)
        .layer(cors)
}

async fn health() -> &'static str {
    "ok"
}

pub(crate) struct ServerState {
    pub(crate) engine: Arc<TrustEngine>,
}
