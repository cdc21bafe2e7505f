//! User directory endpoints.

use axum::{extract::State, routing::post, Json, Router};
use framez_common::AppResult;
use framez_core::{Availability, ProfileSummary, UpsertProfileInput};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

const fn default_limit() -> u64 {
    50
}

/// Public user response (never exposes email, token, or password hash).
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub handle: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub followers_count: i32,
    pub following_count: i32,
    pub created_at: String,
}

impl From<framez_db::entities::user::Model> for UserResponse {
    fn from(u: framez_db::entities::user::Model) -> Self {
        Self {
            id: u.id,
            handle: u.handle,
            name: u.name,
            avatar_url: u.avatar_url,
            bio: u.bio,
            followers_count: u.followers_count,
            following_count: u.following_count,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// The caller's own profile, email included.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    pub email: String,
    #[serde(flatten)]
    pub user: UserResponse,
}

/// Get the caller's own profile, or null when anonymous.
async fn me(MaybeAuthUser(user): MaybeAuthUser) -> ApiResponse<Option<CurrentUserResponse>> {
    ApiResponse::ok(user.map(|u| CurrentUserResponse {
        email: u.email.clone(),
        user: u.into(),
    }))
}

/// Lookup by id request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowRequest {
    pub user_id: String,
}

/// Get a user by ID, or null if absent.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<ShowRequest>,
) -> AppResult<ApiResponse<Option<UserResponse>>> {
    let user = state.user_service.find_by_id(&req.user_id).await?;
    Ok(ApiResponse::ok(user.map(Into::into)))
}

/// Lookup by handle request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByHandleRequest {
    pub handle: String,
}

/// Get a user by handle (case-sensitive exact match), or null if absent.
async fn by_handle(
    State(state): State<AppState>,
    Json(req): Json<ByHandleRequest>,
) -> AppResult<ApiResponse<Option<UserResponse>>> {
    let user = state.user_service.find_by_handle(&req.handle).await?;
    Ok(ApiResponse::ok(user.map(Into::into)))
}

/// Create or update the caller's profile.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpsertProfileInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let updated = state.user_service.upsert_profile(&user.id, req).await?;
    Ok(ApiResponse::ok(updated.into()))
}

/// Handle availability probe request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckHandleRequest {
    pub handle: String,
}

/// Check whether a handle is free (advisory; commit can still conflict).
async fn check_handle(
    State(state): State<AppState>,
    Json(req): Json<CheckHandleRequest>,
) -> AppResult<ApiResponse<Availability>> {
    let availability = state.user_service.check_handle_available(&req.handle).await?;
    Ok(ApiResponse::ok(availability))
}

/// Email availability probe request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckEmailRequest {
    pub email: String,
}

/// Check whether an email is free (advisory; commit can still conflict).
async fn check_email(
    State(state): State<AppState>,
    Json(req): Json<CheckEmailRequest>,
) -> AppResult<ApiResponse<Availability>> {
    let availability = state.user_service.check_email_available(&req.email).await?;
    Ok(ApiResponse::ok(availability))
}

/// Follower listing request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFollowRequest {
    pub user_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

/// Get a user's followers.
async fn followers(
    State(state): State<AppState>,
    Json(req): Json<ListFollowRequest>,
) -> AppResult<ApiResponse<Vec<ProfileSummary>>> {
    let limit = req.limit.min(100);
    let followers = state
        .engagement_service
        .get_followers(&req.user_id, limit)
        .await?;
    Ok(ApiResponse::ok(followers))
}

/// Get the users a user is following.
async fn following(
    State(state): State<AppState>,
    Json(req): Json<ListFollowRequest>,
) -> AppResult<ApiResponse<Vec<ProfileSummary>>> {
    let limit = req.limit.min(100);
    let following = state
        .engagement_service
        .get_following(&req.user_id, limit)
        .await?;
    Ok(ApiResponse::ok(following))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", post(me))
        .route("/show", post(show))
        .route("/by-handle", post(by_handle))
        .route("/update", post(update))
        .route("/check-handle", post(check_handle))
        .route("/check-email", post(check_email))
        .route("/followers", post(followers))
        .route("/following", post(following))
}
