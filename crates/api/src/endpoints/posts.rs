//! Post endpoints.

use axum::{extract::State, routing::post, Json, Router};
use framez_common::AppResult;
use framez_core::{CreatePostInput, LikeWithUser, PostWithAuthor};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

const fn default_limit() -> u64 {
    50
}

/// Create post response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostResponse {
    pub id: String,
}

/// Create a new post.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreatePostInput>,
) -> AppResult<ApiResponse<CreatePostResponse>> {
    let post = state.post_service.create(&user.id, req).await?;
    Ok(ApiResponse::ok(CreatePostResponse { id: post.id }))
}

/// Feed request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
}

/// Get the global feed, newest first, with author snapshots.
async fn feed(
    State(state): State<AppState>,
    Json(req): Json<FeedRequest>,
) -> AppResult<ApiResponse<Vec<PostWithAuthor>>> {
    let limit = req.limit.min(100);
    let posts = state.post_service.get_feed(limit).await?;
    Ok(ApiResponse::ok(posts))
}

/// Posts-by-author request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByAuthorRequest {
    pub author_id: String,
}

/// Get all posts by one author, newest first.
async fn by_author(
    State(state): State<AppState>,
    Json(req): Json<ByAuthorRequest>,
) -> AppResult<ApiResponse<Vec<framez_db::entities::post::Model>>> {
    let posts = state.post_service.find_by_author(&req.author_id).await?;
    Ok(ApiResponse::ok(posts))
}

/// Single post request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowRequest {
    pub post_id: String,
}

/// Get a single post with author snapshot, or null if absent.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<ShowRequest>,
) -> AppResult<ApiResponse<Option<PostWithAuthor>>> {
    let post = state.post_service.get_with_author(&req.post_id).await?;
    Ok(ApiResponse::ok(post))
}

/// Caption update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCaptionRequest {
    pub post_id: String,
    pub caption: String,
}

/// Update a post's caption (author only).
async fn update_caption(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateCaptionRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .post_service
        .update_caption(&req.post_id, &user.id, req.caption)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Delete request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    pub post_id: String,
}

/// Delete a post and everything hanging off it (author only).
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DeleteRequest>,
) -> AppResult<ApiResponse<()>> {
    state.post_service.delete(&req.post_id, &user.id).await?;
    Ok(ApiResponse::ok(()))
}

/// Like listing request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLikesRequest {
    pub post_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

/// Get users who liked a post.
async fn likes(
    State(state): State<AppState>,
    Json(req): Json<ListLikesRequest>,
) -> AppResult<ApiResponse<Vec<LikeWithUser>>> {
    let limit = req.limit.min(100);
    let likes = state
        .engagement_service
        .list_post_likes(&req.post_id, limit)
        .await?;
    Ok(ApiResponse::ok(likes))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/feed", post(feed))
        .route("/by-author", post(by_author))
        .route("/show", post(show))
        .route("/update-caption", post(update_caption))
        .route("/delete", post(delete))
        .route("/likes", post(likes))
}
