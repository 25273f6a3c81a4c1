//! Server instance management

use axum::http::HeaderValue;
use axum::Router;
use lecatalogue::LazyStorage;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::handlers::{create_router, AppState};

/// LeServe HTTP server
///
/// Owns the configuration and a lazily opened catalog. The catalog file
/// is not touched until the first request needs it, so a server can
/// start before the catalog has been built.
pub struct LeServeServer {
    /// Server configuration
    config: ServerConfig,

    /// Catalog shared by every request
    storage: Arc<LazyStorage>,
}

impl LeServeServer {
    /// Create new server instance
    ///
    /// # Returns
    ///
    /// `Result<LeServeServer, ApiError>` - Server, or an error if the
    /// configuration is invalid
    pub fn new(config: ServerConfig) -> Result<Self, ApiError> {
        if let Err(e) = config.validate() {
            return Err(ApiError::internal(format!("Invalid config: {:#}", e)));
        }

        let storage = Arc::new(LazyStorage::new(config.storage_config()));

        Ok(Self { config, storage })
    }

    /// Get socket address for binding
    pub fn socket_addr(&self) -> Result<SocketAddr, ApiError> {
        self.config
            .socket_addr()
            .map_err(|e| ApiError::internal(format!("{:#}", e)))
    }

    /// Build the application with middleware from the configuration
    pub fn app(&self) -> Router {
        let state = AppState::with_storage(Arc::clone(&self.storage), self.config.clone());
        let app = create_router()
            .with_state(state)
            .layer(cors_layer(&self.config.cors_origins));

        if self.config.enable_logging {
            app.layer(TraceLayer::new_for_http())
        } else {
            app
        }
    }

    /// Start server and run until a shutdown signal arrives
    pub async fn start(&self) -> Result<(), ApiError> {
        let addr = self.socket_addr()?;
        let app = self.app();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| {
                error!("Failed to bind to {}: {:?}", addr, e);
                ApiError::internal(format!("Failed to bind to {}: {}", addr, e))
            })?;

        info!("Server listening on: {}", self.server_url());
        info!("Catalog: {}", self.config.db_path);

        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_shutdown())
            .await
            .map_err(|e| ApiError::internal(format!("Server error: {}", e)))
    }

    /// Shared catalog handle
    #[must_use]
    pub fn storage(&self) -> Arc<LazyStorage> {
        Arc::clone(&self.storage)
    }

    /// Get server URL
    #[must_use]
    pub fn server_url(&self) -> String {
        self.config.server_url()
    }
}

/// CORS policy for the configured origins; `*` allows any origin
fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|origin| origin == "*") {
        return base.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    base.allow_origin(parsed)
}

/// Resolve once Ctrl+C or SIGTERM is received
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix;
        match unix::signal(unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received TERM signal");
            }
            Err(e) => {
                error!("Failed to install TERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
