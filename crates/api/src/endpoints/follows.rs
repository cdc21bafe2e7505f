//! Follow toggle endpoints.

use axum::{extract::State, routing::post, Json, Router};
use framez_common::AppResult;
use serde::Deserialize;

use crate::{
    endpoints::likes::ToggleResponse,
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Follow request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub user_id: String,
}

/// Toggle the caller following a user.
async fn toggle(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> AppResult<ApiResponse<ToggleResponse>> {
    let active = state
        .engagement_service
        .toggle_follow(&user.id, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(ToggleResponse { active }))
}

/// Is-following query: false for anonymous callers, never an error.
async fn is_following(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> AppResult<ApiResponse<bool>> {
    let Some(user) = user else {
        return Ok(ApiResponse::ok(false));
    };

    let following = state
        .engagement_service
        .is_following(&user.id, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(following))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/toggle", post(toggle))
        .route("/is-following", post(is_following))
}
