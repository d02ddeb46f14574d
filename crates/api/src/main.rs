//! Maktaba REST API
//!
//! The entry point for all external API requests.
//! Handles:
//! - Authentication and authorization
//! - Rate limiting
//! - Request routing
//! - Observability (logging, metrics, tracing)

mod extract;
mod handlers;
mod middleware;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use maktaba_common::{
    auth::JwtManager,
    config::AppConfig,
    db::{DbPool, Repository},
    errors::AppError,
    metrics as app_metrics,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub repo: Repository,
    pub jwt: JwtManager,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));
    if config.observability.json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    info!("Starting Maktaba API v{}", maktaba_common::VERSION);

    let config = Arc::new(config);

    // Initialize metrics
    if config.observability.metrics_port != 0 {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to install metrics exporter: {}", e),
            })?;
    }
    app_metrics::register_metrics();

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;
    let repo = Repository::new(db.clone());

    let jwt_secret = config
        .auth
        .jwt_secret
        .clone()
        .ok_or_else(|| AppError::Configuration {
            message: "auth.jwt_secret is not set".to_string(),
        })?;
    let jwt = JwtManager::new(&jwt_secret, config.auth.jwt_expiration_secs);

    // Create app state
    let state = AppState {
        config: config.clone(),
        db,
        repo,
        jwt,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // API routes
    let api_routes = Router::new()
        // Health endpoints (no auth)
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        // Auth endpoints
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        // User endpoints
        .route("/users/{id}", get(handlers::users::get_profile))
        .route("/users/{id}/followers", get(handlers::follows::list_followers))
        .route("/users/{id}/following", get(handlers::follows::list_following))
        // Book endpoints
        .route("/books", get(handlers::books::list_books))
        .route("/books", post(handlers::books::create_book))
        .route("/books/{id}", get(handlers::books::get_book))
        .route("/books/{id}", put(handlers::books::update_book))
        .route("/books/{id}", delete(handlers::books::delete_book))
        // Search endpoints
        .route("/search/suggest", get(handlers::search::suggest))
        // Review endpoints; GET takes a book id, the others a review id
        .route("/reviews", post(handlers::reviews::create_review))
        .route(
            "/reviews/{id}",
            get(handlers::reviews::get_reviews)
                .put(handlers::reviews::update_review)
                .delete(handlers::reviews::delete_review),
        )
        .route("/reviews/{id}/like", post(handlers::reviews::toggle_like))
        .route("/reviews/{id}/reply", post(handlers::reviews::create_reply))
        .route("/replies/{id}", delete(handlers::reviews::delete_reply))
        // Highlight endpoints
        .route("/highlights", post(handlers::highlights::create_highlight))
        .route("/highlights/{id}", get(handlers::highlights::get_highlights))
        .route(
            "/highlights/{id}/like",
            post(handlers::highlights::toggle_like),
        )
        // Shelf endpoints
        .route("/shelves", post(handlers::shelves::set_shelf))
        .route("/shelves/user/{id}", get(handlers::shelves::get_user_shelf))
        // Follow endpoints
        .route("/follows/{id}", post(handlers::follows::follow))
        .route("/follows/{id}", delete(handlers::follows::unfollow))
        // Admin endpoints
        .route("/admin/books", get(handlers::admin::list_books))
        .route("/admin/books/{id}/review", put(handlers::admin::review_book));

    let mut app = Router::new().nest("/api", api_routes);

    // Rate limiting (config-gated)
    if state.config.rate_limit.enabled {
        let limit = state.config.rate_limit.requests_per_second;
        let limiter = middleware::rate_limit::create_rate_limiter(
            limit,
            state.config.rate_limit.burst,
        );
        app = app.layer(axum::middleware::from_fn(
            move |request: axum::extract::Request, next: axum::middleware::Next| {
                let limiter = limiter.clone();
                async move {
                    middleware::rate_limit::rate_limit_middleware(request, next, limiter, limit)
                        .await
                }
            },
        ));
    }

    // Compose the app
    app.layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
