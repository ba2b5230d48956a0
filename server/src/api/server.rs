//! API server initialization

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::middleware::{self, AllowedOrigins};
use super::routes::{self, QueryApiState, health};
use crate::core::CoreApp;
use crate::core::constants::{DEFAULT_BODY_LIMIT, RESOURCES_PREFIX, SHUTDOWN_TIMEOUT_SECS};

/// Full application router: data routes at `/` and under the resources
/// prefix, plus health, 404 logging and the shared layers
pub fn build_router(state: QueryApiState, allowed_origins: &AllowedOrigins) -> Router {
    let resources = routes::routes();

    Router::new()
        .route("/api/v1/health", get(health::health))
        .merge(resources.clone())
        .nest(RESOURCES_PREFIX, resources)
        .fallback(middleware::handle_404)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(middleware::cors(allowed_origins))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
}

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Returns CoreApp once the listener has drained
    pub async fn start(self) -> Result<CoreApp> {
        let Self { app } = self;

        let host = app.config.server.host.clone();
        let port = app.config.server.port;
        let addr = SocketAddr::new(host.parse()?, port);

        let state = QueryApiState::new(app.backend.clone(), app.config.query.clone())
            .with_debug(app.config.debug);
        let router = build_router(state, &AllowedOrigins::new(&host, port));

        let listener = TcpListener::bind(addr).await?;
        tracing::debug!(%addr, "Listening");

        let mut server = tokio::spawn(
            axum::serve(listener, router)
                .with_graceful_shutdown(app.shutdown.wait())
                .into_future(),
        );

        let mut shutdown_rx = app.shutdown.subscribe();
        tokio::select! {
            res = &mut server => {
                res??;
                return Ok(app);
            }
            _ = shutdown_rx.wait_for(|&v| v) => {}
        }

        match tokio::time::timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS), server).await {
            Ok(res) => res??,
            Err(_) => tracing::warn!(
                timeout_secs = SHUTDOWN_TIMEOUT_SECS,
                "In-flight requests did not finish before shutdown timeout"
            ),
        }
        Ok(app)
    }
}
