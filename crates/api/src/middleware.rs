//! API middleware.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use framez_core::{CommentService, EngagementService, PostService, UserService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub engagement_service: EngagementService,
}

/// Authentication middleware.
///
/// Resolves a bearer token into the caller's user row and stores it in the
/// request extensions for the extractors. Requests without a valid token
/// pass through anonymously; endpoints decide whether that is acceptable.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                if let Ok(user) = state.user_service.authenticate_by_token(token).await {
                    req.extensions_mut().insert(user);
                }
            }
        }
    }

    next.run(req).await
}
