use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::OpenApi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod credentials;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;

// Content pipeline and page rendering.
pub mod markdown;
pub mod sanitize;
pub mod validation;
pub mod views;

// Routing split by access level (Public, Admin).
pub mod routes;
use routes::{admin, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use repository::{RepositoryState, SqliteRepository};

/// ApiDoc
///
/// OpenAPI description of every route, generated from the `#[utoipa::path]`
/// annotations on the handlers. Served as JSON at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_posts, handlers::view_post, handlers::like_post,
        handlers::login_page, handlers::register_page, handlers::register,
        handlers::login, handlers::logout, handlers::dashboard,
        handlers::new_post_page, handlers::create_post, handlers::edit_post_page,
        handlers::update_post, handlers::delete_post
    ),
    components(
        schemas(
            models::Post, models::PostDetail, models::RegisterForm,
            models::LoginForm, models::PostForm,
        )
    ),
    tags(
        (name = "inkblog", description = "Server-rendered blog with admin authoring")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// Shared, cheaply clonable container for the repository and the loaded
/// configuration. Handlers take the whole state or pull a part via `FromRef`.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: all SQL goes through here.
    pub repo: RepositoryState,
    /// Configuration: loaded once at startup, never mutated.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing tree, applies global and scoped middleware, and
/// registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Public Routes: identity is resolved but never required.
        .merge(public::public_routes())
        // Admin Routes: anonymous requests are redirected to /login before the
        // handler runs.
        .merge(admin::admin_routes().route_layer(middleware::from_fn(auth::require_admin)))
        // Identity resolution runs for every route, so both routers (and the
        // page layout) see the same `AuthContext`.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::resolve_identity,
        ))
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: one span per request, tagged with its ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: echo x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the tracing span for a request from its method, URI and `x-request-id`,
/// so every log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
