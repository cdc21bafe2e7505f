//! API endpoints.

mod auth;
mod comments;
mod follows;
mod likes;
mod posts;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/posts", posts::router())
        .nest("/comments", comments::router())
        .nest("/likes", likes::router())
        .nest("/follows", follows::router())
}
