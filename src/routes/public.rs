use crate::{ApiDoc, AppState, handlers};
use axum::{
    Json, Router,
    routing::{get, post},
};
use utoipa::OpenApi;

/// Public Router Module
///
/// Pages for anonymous readers plus the account flow. Every handler still
/// receives the resolved `AuthContext`, which decides what the layout shows.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /api-docs/openapi.json
        // Machine-readable description of every route.
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        // GET /
        // All posts, newest first.
        .route("/", get(handlers::list_posts))
        // GET /posts/{id}
        // One post with its author; content rendered from markdown.
        .route("/posts/{id}", get(handlers::view_post))
        // POST /posts/{id}/like
        // Increments the like counter. Answers 401 (not a redirect) when anonymous.
        .route("/posts/{id}/like", post(handlers::like_post))
        // GET|POST /register
        .route("/register", get(handlers::register_page).post(handlers::register))
        // GET|POST /login
        .route("/login", get(handlers::login_page).post(handlers::login))
        // GET /logout
        // Clears the identity cookie.
        .route("/logout", get(handlers::logout))
}
