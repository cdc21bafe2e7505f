//! Comment endpoints.

use axum::{extract::State, routing::post, Json, Router};
use framez_common::AppResult;
use framez_core::CommentWithAuthor;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create comment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub post_id: String,
    pub text: String,
}

/// Create comment response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentResponse {
    pub id: String,
}

/// Create a comment on a post.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<ApiResponse<CreateCommentResponse>> {
    let comment = state
        .comment_service
        .create(&req.post_id, &user.id, &req.text)
        .await?;
    Ok(ApiResponse::ok(CreateCommentResponse { id: comment.id }))
}

/// Comment listing request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByPostRequest {
    pub post_id: String,
}

/// Get comments on a post, newest first, with author snapshots.
async fn by_post(
    State(state): State<AppState>,
    Json(req): Json<ByPostRequest>,
) -> AppResult<ApiResponse<Vec<CommentWithAuthor>>> {
    let comments = state.comment_service.find_by_post(&req.post_id).await?;
    Ok(ApiResponse::ok(comments))
}

/// Delete request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    pub comment_id: String,
}

/// Delete a comment (author only).
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DeleteRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .comment_service
        .delete(&req.comment_id, &user.id)
        .await?;
    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/by-post", post(by_post))
        .route("/delete", post(delete))
}
