//! Like toggle endpoints (posts and comments).

use axum::{extract::State, routing::post, Json, Router};
use framez_common::AppResult;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Toggle state response shared by all engagement toggles.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    /// True when the edge now exists (liked / following).
    pub active: bool,
}

/// Post like request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostLikeRequest {
    pub post_id: String,
}

/// Toggle the caller's like on a post.
async fn toggle_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PostLikeRequest>,
) -> AppResult<ApiResponse<ToggleResponse>> {
    let active = state
        .engagement_service
        .toggle_post_like(&user.id, &req.post_id)
        .await?;
    Ok(ApiResponse::ok(ToggleResponse { active }))
}

/// Has-liked query: false for anonymous callers, never an error.
async fn has_liked_post(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<PostLikeRequest>,
) -> AppResult<ApiResponse<bool>> {
    let Some(user) = user else {
        return Ok(ApiResponse::ok(false));
    };

    let liked = state
        .engagement_service
        .has_liked_post(&user.id, &req.post_id)
        .await?;
    Ok(ApiResponse::ok(liked))
}

/// Batch liked-post check request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedPostIdsRequest {
    pub post_ids: Vec<String>,
}

/// Which of the given posts the caller has liked (empty for anonymous).
async fn liked_post_ids(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<LikedPostIdsRequest>,
) -> AppResult<ApiResponse<Vec<String>>> {
    let Some(user) = user else {
        return Ok(ApiResponse::ok(vec![]));
    };

    let liked = state
        .engagement_service
        .find_liked_post_ids(&user.id, &req.post_ids)
        .await?;
    Ok(ApiResponse::ok(liked))
}

/// Comment like request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentLikeRequest {
    pub comment_id: String,
}

/// Toggle the caller's like on a comment.
async fn toggle_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CommentLikeRequest>,
) -> AppResult<ApiResponse<ToggleResponse>> {
    let active = state
        .engagement_service
        .toggle_comment_like(&user.id, &req.comment_id)
        .await?;
    Ok(ApiResponse::ok(ToggleResponse { active }))
}

/// Has-liked query for comments: false for anonymous callers.
async fn has_liked_comment(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<CommentLikeRequest>,
) -> AppResult<ApiResponse<bool>> {
    let Some(user) = user else {
        return Ok(ApiResponse::ok(false));
    };

    let liked = state
        .engagement_service
        .has_liked_comment(&user.id, &req.comment_id)
        .await?;
    Ok(ApiResponse::ok(liked))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/toggle-post", post(toggle_post))
        .route("/toggle-comment", post(toggle_comment))
        .route("/has-liked-post", post(has_liked_post))
        .route("/has-liked-comment", post(has_liked_comment))
        .route("/liked-post-ids", post(liked_post_ids))
}
