//! HTTP Server implementation
//!
//! This module provides the HTTP server using the Axum framework with:
//! - Configurable host/port binding
//! - Graceful shutdown handling
//! - CORS support
//! - Per-request trace IDs and tracing

use crate::api::handlers::AppState;
use crate::api::middleware::trace_id_middleware;
use crate::api::routes::build_api_routes;
use crate::auth::jwt::TokenService;
use crate::core::config::{Config, ServerConfig};
use crate::db::manager::DatabaseManager;
use crate::db::repository::{HabitRepository, UserRepository};
use axum::{middleware, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// HTTP API Server
pub struct ApiServer {
    router: Router,
    config: ServerConfig,
}

impl ApiServer {
    /// Create a new API server with the given configuration and database manager
    pub fn new(config: Config, db: Arc<DatabaseManager>) -> anyhow::Result<Self> {
        let server_config = config.server.clone();

        let router = Self::build_router(config, db)?;

        Ok(Self {
            router,
            config: server_config,
        })
    }

    /// Build the Axum router with all routes and middleware
    fn build_router(config: Config, db: Arc<DatabaseManager>) -> anyhow::Result<Router> {
        // The token service is constructed once from explicit config; an
        // empty secret already failed config validation before we get here.
        let tokens = Arc::new(TokenService::new(
            &config.security.jwt_secret,
            config.security.token_expiry_minutes,
        )?);

        let app_state = AppState {
            user_repo: Arc::new(UserRepository::new(db.clone())),
            habit_repo: Arc::new(HabitRepository::new(db)),
            tokens,
            bcrypt_cost: config.security.bcrypt_cost,
        };

        let router = build_api_routes(app_state).layer(
            ServiceBuilder::new()
                // Trace ID middleware for request tracking
                .layer(middleware::from_fn(trace_id_middleware))
                // Tracing for all requests
                .layer(TraceLayer::new_for_http())
                // CORS support
                .layer(Self::build_cors_layer(&config.security.allowed_origins)),
        );

        Ok(router)
    }

    /// Build CORS layer from allowed origins configuration
    fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
        use tower_http::cors::Any;

        let cors = CorsLayer::new();

        if allowed_origins.contains(&"*".to_string()) {
            cors.allow_origin(Any).allow_methods(Any).allow_headers(Any)
        } else {
            let origins: Vec<_> = allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            cors.allow_origin(origins).allow_methods(Any).allow_headers(Any)
        }
    }

    /// Start the HTTP server and listen for requests
    ///
    /// This method will block until the server is shut down gracefully.
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let socket_addr: SocketAddr = addr.parse()?;

        info!(
            host = %self.config.host,
            port = self.config.port,
            max_connections = self.config.max_connections,
            request_timeout = self.config.request_timeout,
            "Starting HTTP server"
        );

        let listener = tokio::net::TcpListener::bind(socket_addr).await?;

        info!(addr = %socket_addr, "HTTP server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("HTTP server shut down gracefully");

        Ok(())
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Initiating graceful shutdown...");
}
