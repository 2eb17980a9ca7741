use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Admin Router Module
///
/// Post authoring. The router is wrapped in the `require_admin` route layer, so an
/// anonymous browser is sent to `/login` before any handler runs. Beyond being
/// logged in there is no ownership check: any admin may edit or delete any post.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin
        // Dashboard listing the posts written by the current admin.
        .route("/admin", get(handlers::dashboard))
        // GET /admin/posts/new
        .route("/admin/posts/new", get(handlers::new_post_page))
        // POST /admin/create-post
        // Sanitize, validate, insert; redirects to the dashboard.
        .route("/admin/create-post", post(handlers::create_post))
        // POST /admin/posts/{id}
        // Sanitize, validate, update; redirects to the home page.
        .route("/admin/posts/{id}", post(handlers::update_post))
        // GET /admin/posts/{id}/edit
        .route("/admin/posts/{id}/edit", get(handlers::edit_post_page))
        // POST /admin/posts/{id}/delete
        // Redirects to the dashboard whether or not the post existed.
        .route("/admin/posts/{id}/delete", post(handlers::delete_post))
}
