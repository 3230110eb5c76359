//! Application startup and lifecycle management.
//!
//! Model initialization happens here, once, before the listener accepts
//! traffic. Initialization failure is non-fatal: the service starts in
//! fallback-only mode.

use crate::config::GitaConfig;
use crate::error::AppError;
use crate::handlers::{chat, health};
use crate::services::metrics;
use crate::services::providers::gemini::GeminiTextProvider;
use crate::services::providers::TextProvider;
use crate::services::FallbackPool;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Shared application state. The provider handle is built once and read
/// thereafter; its absence is a valid, expected state.
#[derive(Clone)]
pub struct AppState {
    pub provider: Option<Arc<dyn TextProvider>>,
    pub fallbacks: FallbackPool,
}

/// Authenticate, enumerate models, and build the provider handle.
///
/// Any failure (missing key, network, no capable models) is logged and
/// yields `None`; the service still starts and serves requests from the
/// fallback pool. No retries, no re-initialization.
pub async fn initialize_model(config: &GitaConfig) -> Option<Arc<dyn TextProvider>> {
    let api_key = match &config.google.api_key {
        Some(key) => key,
        None => {
            tracing::warn!("GOOGLE_API_KEY not set, serving fallback responses only");
            return None;
        }
    };

    let timeout = Duration::from_secs(config.google.timeout_secs);
    match GeminiTextProvider::discover(api_key, timeout).await {
        Ok(provider) => {
            tracing::info!(model = %provider.model(), "Model initialized successfully");
            Some(Arc::new(provider))
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                "Error configuring Gemini API, serving fallback responses only"
            );
            None
        }
    }
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration, including
    /// remote model initialization.
    pub async fn build(config: GitaConfig) -> Result<Self, AppError> {
        let provider = initialize_model(&config).await;
        Self::with_provider(config, provider).await
    }

    /// Build with an explicit provider handle (or its absence). Tests
    /// use this to inject present, absent, or failing providers.
    pub async fn with_provider(
        config: GitaConfig,
        provider: Option<Arc<dyn TextProvider>>,
    ) -> Result<Self, AppError> {
        metrics::init_metrics();

        let state = AppState {
            provider,
            fallbacks: FallbackPool::new(),
        };

        let router = build_router(state, &config.server.static_dir);

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.http.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("gita-service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

fn build_router(state: AppState, static_dir: &str) -> Router {
    // Cross-origin requests are allowed on the whole /api surface, as
    // the chat page expects. Restrict before any production rollout.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/chat", post(chat::chat))
        .route("/test", get(health::api_test))
        .layer(cors)
        .with_state(state);

    let assets = Path::new(static_dir);

    Router::new()
        .route_service("/", ServeFile::new(assets.join("index.html")))
        .route_service("/styles.css", ServeFile::new(assets.join("styles.css")))
        .route_service("/script.js", ServeFile::new(assets.join("script.js")))
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .nest("/api", api)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| Uuid::new_v4().to_string());

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
