//! Engagement service.
//!
//! Likes on posts, likes on comments, and follows are all the same shape:
//! a unique (actor, target) edge row plus a denormalized counter on the
//! target. One toggle algorithm runs for all three, parameterized over an
//! [`EngagementEdge`] descriptor; the follow descriptor moves a second
//! counter (the actor's `following_count`) in the same call.
//!
//! Counters are only ever moved by this toggle path or repaired by the
//! reconciliation routines at the bottom; reads trust the stored value.

use std::collections::HashMap;

use crate::services::user::UserSnapshot;
use async_trait::async_trait;
use framez_common::{AppError, AppResult, IdGenerator};
use framez_db::{
    entities::{comment_like, follow, post_like, user},
    repositories::{
        CommentLikeRepository, CommentRepository, FollowRepository, PostLikeRepository,
        PostRepository, UserRepository,
    },
};
use sea_orm::Set;
use serde::Serialize;

/// Engagement service for business logic.
#[derive(Clone)]
pub struct EngagementService {
    post_like_repo: PostLikeRepository,
    comment_like_repo: CommentLikeRepository,
    follow_repo: FollowRepository,
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// One edge table / counter pair the toggle algorithm can run against.
#[async_trait]
trait EngagementEdge {
    /// Edge kind label for logs.
    fn kind(&self) -> &'static str;

    /// Point lookup by the unique (actor, target) pair.
    async fn exists(&self, actor_id: &str, target_id: &str) -> AppResult<bool>;

    /// Insert a new edge row.
    async fn insert(&self, edge_id: String, actor_id: &str, target_id: &str) -> AppResult<()>;

    /// Remove the edge row for the pair.
    async fn remove(&self, actor_id: &str, target_id: &str) -> AppResult<()>;

    /// Move the owning counter(s) up by one.
    async fn increment_counters(&self, actor_id: &str, target_id: &str) -> AppResult<()>;

    /// Move the owning counter(s) down by one, floored at zero.
    async fn decrement_counters(&self, actor_id: &str, target_id: &str) -> AppResult<()>;
}

/// Like edge enriched with the liker's public profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeWithUser {
    #[serde(flatten)]
    pub like: post_like::Model,
    pub user: Option<UserSnapshot>,
}

/// Public profile fields returned by follower/following listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub id: String,
    pub name: Option<String>,
    pub handle: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub followers_count: i32,
    pub following_count: i32,
}

impl From<user::Model> for ProfileSummary {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            name: u.name,
            handle: u.handle,
            avatar_url: u.avatar_url,
            bio: u.bio,
            followers_count: u.followers_count,
            following_count: u.following_count,
        }
    }
}

/// Counters recomputed for a post by reconciliation.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCounters {
    pub likes_count: i32,
    pub comments_count: i32,
}

/// Counters recomputed for a user by reconciliation.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCounters {
    pub followers_count: i32,
    pub following_count: i32,
}

impl EngagementService {
    /// Create a new engagement service.
    #[must_use]
    pub fn new(
        post_like_repo: PostLikeRepository,
        comment_like_repo: CommentLikeRepository,
        follow_repo: FollowRepository,
        post_repo: PostRepository,
        comment_repo: CommentRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            post_like_repo,
            comment_like_repo,
            follow_repo,
            post_repo,
            comment_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// The shared toggle: delete the edge and decrement if it exists, insert
    /// and increment if it does not. Returns the new state (true = edge now
    /// exists). The last-applied toggle wins under concurrent calls.
    async fn toggle<E: EngagementEdge + Sync>(
        &self,
        edge: &E,
        actor_id: &str,
        target_id: &str,
    ) -> AppResult<bool> {
        if edge.exists(actor_id, target_id).await? {
            edge.remove(actor_id, target_id).await?;
            edge.decrement_counters(actor_id, target_id).await?;
            tracing::debug!(
                kind = edge.kind(),
                actor_id = %actor_id,
                target_id = %target_id,
                "Removed engagement edge"
            );
            Ok(false)
        } else {
            edge.insert(self.id_gen.generate(), actor_id, target_id)
                .await?;
            edge.increment_counters(actor_id, target_id).await?;
            tracing::debug!(
                kind = edge.kind(),
                actor_id = %actor_id,
                target_id = %target_id,
                "Created engagement edge"
            );
            Ok(true)
        }
    }

    // ==================== Post likes ====================

    /// Toggle the caller's like on a post. Returns the new state.
    pub async fn toggle_post_like(&self, caller_id: &str, post_id: &str) -> AppResult<bool> {
        self.post_repo.get_by_id(post_id).await?;

        let edge = PostLikeEdge {
            likes: &self.post_like_repo,
            posts: &self.post_repo,
        };
        self.toggle(&edge, caller_id, post_id).await
    }

    /// Check if a user has liked a post.
    pub async fn has_liked_post(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        self.post_like_repo.has_liked(post_id, user_id).await
    }

    /// Which of the given posts a user has liked (for batch UI checks).
    pub async fn find_liked_post_ids(
        &self,
        user_id: &str,
        post_ids: &[String],
    ) -> AppResult<Vec<String>> {
        let liked = self.post_like_repo.find_post_ids_by_user(user_id).await?;
        Ok(liked
            .into_iter()
            .filter(|id| post_ids.contains(id))
            .collect())
    }

    /// Get users who liked a post, in insertion order.
    pub async fn list_post_likes(&self, post_id: &str, limit: u64) -> AppResult<Vec<LikeWithUser>> {
        let likes = self.post_like_repo.find_by_post(post_id, limit).await?;

        let mut user_ids: Vec<String> = likes.iter().map(|l| l.user_id.clone()).collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let users: HashMap<String, UserSnapshot> = self
            .user_repo
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), UserSnapshot::from(u)))
            .collect();

        Ok(likes
            .into_iter()
            .map(|like| {
                let user = users.get(&like.user_id).cloned();
                LikeWithUser { like, user }
            })
            .collect())
    }

    // ==================== Comment likes ====================

    /// Toggle the caller's like on a comment. Returns the new state.
    pub async fn toggle_comment_like(&self, caller_id: &str, comment_id: &str) -> AppResult<bool> {
        self.comment_repo.get_by_id(comment_id).await?;

        let edge = CommentLikeEdge {
            likes: &self.comment_like_repo,
            comments: &self.comment_repo,
        };
        self.toggle(&edge, caller_id, comment_id).await
    }

    /// Check if a user has liked a comment.
    pub async fn has_liked_comment(&self, user_id: &str, comment_id: &str) -> AppResult<bool> {
        self.comment_like_repo.has_liked(comment_id, user_id).await
    }

    // ==================== Follows ====================

    /// Toggle the caller following a user. Returns the new state.
    ///
    /// Moves both the followee's `followers_count` and the caller's
    /// `following_count` in the same direction in the same call.
    pub async fn toggle_follow(&self, caller_id: &str, user_id: &str) -> AppResult<bool> {
        // Can't follow yourself
        if caller_id == user_id {
            return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
        }

        self.user_repo.get_by_id(user_id).await?;

        let edge = FollowEdge {
            follows: &self.follow_repo,
            users: &self.user_repo,
        };
        self.toggle(&edge, caller_id, user_id).await
    }

    /// Check if a user is following another.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        self.follow_repo.is_following(follower_id, followee_id).await
    }

    /// Get a user's followers, in insertion order, as profile summaries.
    ///
    /// Followers whose user row has vanished are dropped from the listing.
    pub async fn get_followers(&self, user_id: &str, limit: u64) -> AppResult<Vec<ProfileSummary>> {
        let edges = self.follow_repo.find_followers(user_id, limit).await?;
        let ids: Vec<String> = edges.iter().map(|e| e.follower_id.clone()).collect();
        self.resolve_profiles(&ids).await
    }

    /// Get the users a user is following, in insertion order.
    pub async fn get_following(&self, user_id: &str, limit: u64) -> AppResult<Vec<ProfileSummary>> {
        let edges = self.follow_repo.find_following(user_id, limit).await?;
        let ids: Vec<String> = edges.iter().map(|e| e.followee_id.clone()).collect();
        self.resolve_profiles(&ids).await
    }

    /// Resolve user ids to profile summaries, preserving input order and
    /// skipping ids that no longer resolve.
    async fn resolve_profiles(&self, ids: &[String]) -> AppResult<Vec<ProfileSummary>> {
        let mut unique = ids.to_vec();
        unique.sort_unstable();
        unique.dedup();

        let mut users: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&unique)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(ids
            .iter()
            .filter_map(|id| users.remove(id).map(ProfileSummary::from))
            .collect())
    }

    // ==================== Reconciliation ====================

    /// Recompute a post's counters from its edge tables and overwrite the
    /// stored values. Repair tool, never part of the hot path.
    pub async fn reconcile_post_counters(&self, post_id: &str) -> AppResult<PostCounters> {
        self.post_repo.get_by_id(post_id).await?;

        let likes = saturating_count(self.post_like_repo.count_by_post(post_id).await?);
        let comments = saturating_count(self.comment_repo.count_by_post(post_id).await?);

        self.post_repo.set_likes_count(post_id, likes).await?;
        self.post_repo.set_comments_count(post_id, comments).await?;

        tracing::info!(post_id = %post_id, likes, comments, "Reconciled post counters");
        Ok(PostCounters {
            likes_count: likes,
            comments_count: comments,
        })
    }

    /// Recompute a comment's like counter from its edge table.
    pub async fn reconcile_comment_counters(&self, comment_id: &str) -> AppResult<i32> {
        self.comment_repo.get_by_id(comment_id).await?;

        let likes = saturating_count(self.comment_like_repo.count_by_comment(comment_id).await?);
        self.comment_repo.set_likes_count(comment_id, likes).await?;

        tracing::info!(comment_id = %comment_id, likes, "Reconciled comment counters");
        Ok(likes)
    }

    /// Recompute a user's follower/following counters from the follow table.
    pub async fn reconcile_user_counters(&self, user_id: &str) -> AppResult<UserCounters> {
        self.user_repo.get_by_id(user_id).await?;

        let followers = saturating_count(self.follow_repo.count_followers(user_id).await?);
        let following = saturating_count(self.follow_repo.count_following(user_id).await?);

        self.user_repo.set_followers_count(user_id, followers).await?;
        self.user_repo.set_following_count(user_id, following).await?;

        tracing::info!(user_id = %user_id, followers, following, "Reconciled user counters");
        Ok(UserCounters {
            followers_count: followers,
            following_count: following,
        })
    }
}

/// Clamp an edge count into the i32 counter column.
fn saturating_count(count: u64) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

// ==================== Edge descriptors ====================

struct PostLikeEdge<'a> {
    likes: &'a PostLikeRepository,
    posts: &'a PostRepository,
}

#[async_trait]
impl EngagementEdge for PostLikeEdge<'_> {
    fn kind(&self) -> &'static str {
        "post_like"
    }

    async fn exists(&self, actor_id: &str, target_id: &str) -> AppResult<bool> {
        self.likes.has_liked(target_id, actor_id).await
    }

    async fn insert(&self, edge_id: String, actor_id: &str, target_id: &str) -> AppResult<()> {
        let model = post_like::ActiveModel {
            id: Set(edge_id),
            post_id: Set(target_id.to_string()),
            user_id: Set(actor_id.to_string()),
            ..Default::default()
        };
        self.likes.create(model).await?;
        Ok(())
    }

    async fn remove(&self, actor_id: &str, target_id: &str) -> AppResult<()> {
        self.likes.delete_by_pair(target_id, actor_id).await
    }

    async fn increment_counters(&self, _actor_id: &str, target_id: &str) -> AppResult<()> {
        self.posts.increment_likes_count(target_id).await
    }

    async fn decrement_counters(&self, _actor_id: &str, target_id: &str) -> AppResult<()> {
        self.posts.decrement_likes_count(target_id).await
    }
}

struct CommentLikeEdge<'a> {
    likes: &'a CommentLikeRepository,
    comments: &'a CommentRepository,
}

#[async_trait]
impl EngagementEdge for CommentLikeEdge<'_> {
    fn kind(&self) -> &'static str {
        "comment_like"
    }

    async fn exists(&self, actor_id: &str, target_id: &str) -> AppResult<bool> {
        self.likes.has_liked(target_id, actor_id).await
    }

    async fn insert(&self, edge_id: String, actor_id: &str, target_id: &str) -> AppResult<()> {
        let model = comment_like::ActiveModel {
            id: Set(edge_id),
            comment_id: Set(target_id.to_string()),
            user_id: Set(actor_id.to_string()),
            ..Default::default()
        };
        self.likes.create(model).await?;
        Ok(())
    }

    async fn remove(&self, actor_id: &str, target_id: &str) -> AppResult<()> {
        self.likes.delete_by_pair(target_id, actor_id).await
    }

    async fn increment_counters(&self, _actor_id: &str, target_id: &str) -> AppResult<()> {
        self.comments.increment_likes_count(target_id).await
    }

    async fn decrement_counters(&self, _actor_id: &str, target_id: &str) -> AppResult<()> {
        self.comments.decrement_likes_count(target_id).await
    }
}

struct FollowEdge<'a> {
    follows: &'a FollowRepository,
    users: &'a UserRepository,
}

#[async_trait]
impl EngagementEdge for FollowEdge<'_> {
    fn kind(&self) -> &'static str {
        "follow"
    }

    async fn exists(&self, actor_id: &str, target_id: &str) -> AppResult<bool> {
        self.follows.is_following(actor_id, target_id).await
    }

    async fn insert(&self, edge_id: String, actor_id: &str, target_id: &str) -> AppResult<()> {
        let model = follow::ActiveModel {
            id: Set(edge_id),
            follower_id: Set(actor_id.to_string()),
            followee_id: Set(target_id.to_string()),
            ..Default::default()
        };
        self.follows.create(model).await?;
        Ok(())
    }

    async fn remove(&self, actor_id: &str, target_id: &str) -> AppResult<()> {
        self.follows.delete_by_pair(actor_id, target_id).await
    }

    async fn increment_counters(&self, actor_id: &str, target_id: &str) -> AppResult<()> {
        self.users.increment_followers_count(target_id).await?;
        self.users.increment_following_count(actor_id).await?;
        Ok(())
    }

    async fn decrement_counters(&self, actor_id: &str, target_id: &str) -> AppResult<()> {
        self.users.decrement_followers_count(target_id).await?;
        self.users.decrement_following_count(actor_id).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use framez_db::entities::{comment, post};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_user(id: &str, handle: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            handle: Some(handle.to_string()),
            email: format!("{handle}@example.com"),
            password_hash: "hash".to_string(),
            token: None,
            name: Some("Test User".to_string()),
            avatar_url: None,
            bio: None,
            followers_count: 0,
            following_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_post(id: &str, author_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            caption: Some("hello".to_string()),
            image_url: None,
            likes_count: 0,
            comments_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_comment(id: &str, post_id: &str, author_id: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            post_id: post_id.to_string(),
            author_id: author_id.to_string(),
            text: "Nice shot!".to_string(),
            likes_count: 0,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_like(id: &str, post_id: &str, user_id: &str) -> post_like::Model {
        post_like::Model {
            id: id.to_string(),
            post_id: post_id.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn create_test_follow(id: &str, follower_id: &str, followee_id: &str) -> follow::Model {
        follow::Model {
            id: id.to_string(),
            follower_id: follower_id.to_string(),
            followee_id: followee_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn mock_db() -> Arc<sea_orm::DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn exec_ok(rows: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: rows,
        }
    }

    struct ServiceDbs {
        post_like: Arc<sea_orm::DatabaseConnection>,
        comment_like: Arc<sea_orm::DatabaseConnection>,
        follow: Arc<sea_orm::DatabaseConnection>,
        post: Arc<sea_orm::DatabaseConnection>,
        comment: Arc<sea_orm::DatabaseConnection>,
        user: Arc<sea_orm::DatabaseConnection>,
    }

    impl Default for ServiceDbs {
        fn default() -> Self {
            Self {
                post_like: mock_db(),
                comment_like: mock_db(),
                follow: mock_db(),
                post: mock_db(),
                comment: mock_db(),
                user: mock_db(),
            }
        }
    }

    fn build_service(dbs: ServiceDbs) -> EngagementService {
        EngagementService::new(
            PostLikeRepository::new(dbs.post_like),
            CommentLikeRepository::new(dbs.comment_like),
            FollowRepository::new(dbs.follow),
            PostRepository::new(dbs.post),
            CommentRepository::new(dbs.comment),
            UserRepository::new(dbs.user),
        )
    }

    #[tokio::test]
    async fn test_toggle_follow_yourself_returns_error() {
        let service = build_service(ServiceDbs::default());
        let result = service.toggle_follow("user1", "user1").await;

        assert!(result.is_err());
        match result {
            Err(AppError::BadRequest(msg)) => {
                assert!(msg.contains("Cannot follow yourself"));
            }
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_toggle_follow_unknown_target_returns_error() {
        let dbs = ServiceDbs {
            user: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([Vec::<user::Model>::new()])
                    .into_connection(),
            ),
            ..ServiceDbs::default()
        };

        let service = build_service(dbs);
        let result = service.toggle_follow("user1", "ghost").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_toggle_follow_creates_edge_and_moves_both_counters() {
        let target = create_test_user("user2", "bob");
        let edge = create_test_follow("f1", "user1", "user2");

        let dbs = ServiceDbs {
            user: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[target]])
                    // followers_count(user2) + following_count(user1)
                    .append_exec_results([exec_ok(1), exec_ok(1)])
                    .into_connection(),
            ),
            follow: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    // exists lookup misses, then the insert returns the row
                    .append_query_results([Vec::<follow::Model>::new(), vec![edge]])
                    .append_exec_results([exec_ok(1)])
                    .into_connection(),
            ),
            ..ServiceDbs::default()
        };

        let service = build_service(dbs);
        let active = service.toggle_follow("user1", "user2").await.unwrap();

        assert!(active);
    }

    #[tokio::test]
    async fn test_toggle_follow_existing_edge_removes_it() {
        let target = create_test_user("user2", "bob");
        let edge = create_test_follow("f1", "user1", "user2");

        let dbs = ServiceDbs {
            user: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[target]])
                    .append_exec_results([exec_ok(1), exec_ok(1)])
                    .into_connection(),
            ),
            follow: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    // exists lookup hits, remove re-resolves the pair
                    .append_query_results([vec![edge.clone()], vec![edge]])
                    .append_exec_results([exec_ok(1)])
                    .into_connection(),
            ),
            ..ServiceDbs::default()
        };

        let service = build_service(dbs);
        let active = service.toggle_follow("user1", "user2").await.unwrap();

        assert!(!active);
    }

    #[tokio::test]
    async fn test_toggle_post_like_missing_post_returns_error() {
        let dbs = ServiceDbs {
            post: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([Vec::<post::Model>::new()])
                    .into_connection(),
            ),
            ..ServiceDbs::default()
        };

        let service = build_service(dbs);
        let result = service.toggle_post_like("user1", "nonexistent").await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_toggle_post_like_creates_edge() {
        let post = create_test_post("post1", "author1");
        let like = create_test_like("l1", "post1", "user1");

        let dbs = ServiceDbs {
            post: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[post]])
                    .append_exec_results([exec_ok(1)])
                    .into_connection(),
            ),
            post_like: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([Vec::<post_like::Model>::new(), vec![like]])
                    .append_exec_results([exec_ok(1)])
                    .into_connection(),
            ),
            ..ServiceDbs::default()
        };

        let service = build_service(dbs);
        let active = service.toggle_post_like("user1", "post1").await.unwrap();

        assert!(active);
    }

    #[tokio::test]
    async fn test_toggle_post_like_existing_edge_removes_it() {
        let post = create_test_post("post1", "author1");
        let like = create_test_like("l1", "post1", "user1");

        let dbs = ServiceDbs {
            post: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[post]])
                    .append_exec_results([exec_ok(1)])
                    .into_connection(),
            ),
            post_like: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    // second toggle: exists hits, remove re-resolves
                    .append_query_results([vec![like.clone()], vec![like]])
                    .append_exec_results([exec_ok(1)])
                    .into_connection(),
            ),
            ..ServiceDbs::default()
        };

        let service = build_service(dbs);
        let active = service.toggle_post_like("user1", "post1").await.unwrap();

        assert!(!active);
    }

    #[tokio::test]
    async fn test_toggle_comment_like_missing_comment_returns_error() {
        let dbs = ServiceDbs {
            comment: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([Vec::<comment::Model>::new()])
                    .into_connection(),
            ),
            ..ServiceDbs::default()
        };

        let service = build_service(dbs);
        let result = service.toggle_comment_like("user1", "nonexistent").await;

        assert!(matches!(result, Err(AppError::CommentNotFound(_))));
    }

    #[tokio::test]
    async fn test_toggle_comment_like_creates_edge() {
        let comment = create_test_comment("c1", "post1", "author1");
        let like = comment_like::Model {
            id: "cl1".to_string(),
            comment_id: "c1".to_string(),
            user_id: "user1".to_string(),
            created_at: Utc::now().into(),
        };

        let dbs = ServiceDbs {
            comment: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[comment]])
                    .append_exec_results([exec_ok(1)])
                    .into_connection(),
            ),
            comment_like: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([Vec::<comment_like::Model>::new(), vec![like]])
                    .append_exec_results([exec_ok(1)])
                    .into_connection(),
            ),
            ..ServiceDbs::default()
        };

        let service = build_service(dbs);
        let active = service.toggle_comment_like("user1", "c1").await.unwrap();

        assert!(active);
    }

    #[tokio::test]
    async fn test_has_liked_post_false_when_no_edge() {
        let dbs = ServiceDbs {
            post_like: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([Vec::<post_like::Model>::new()])
                    .into_connection(),
            ),
            ..ServiceDbs::default()
        };

        let service = build_service(dbs);
        assert!(!service.has_liked_post("user1", "post1").await.unwrap());
    }

    #[tokio::test]
    async fn test_is_following_true_when_edge_exists() {
        let edge = create_test_follow("f1", "user1", "user2");

        let dbs = ServiceDbs {
            follow: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[edge]])
                    .into_connection(),
            ),
            ..ServiceDbs::default()
        };

        let service = build_service(dbs);
        assert!(service.is_following("user1", "user2").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_post_likes_enriches_users() {
        let l1 = create_test_like("l1", "post1", "user1");
        let l2 = create_test_like("l2", "post1", "ghost");
        let u1 = create_test_user("user1", "alice");

        let dbs = ServiceDbs {
            post_like: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[l1, l2]])
                    .into_connection(),
            ),
            user: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[u1]])
                    .into_connection(),
            ),
            ..ServiceDbs::default()
        };

        let service = build_service(dbs);
        let likes = service.list_post_likes("post1", 50).await.unwrap();

        assert_eq!(likes.len(), 2);
        assert!(likes[0].user.is_some());
        // A liker whose user row has vanished still appears, with no profile
        assert!(likes[1].user.is_none());
    }

    #[tokio::test]
    async fn test_get_followers_drops_vanished_users() {
        let f1 = create_test_follow("f1", "user2", "user1");
        let f2 = create_test_follow("f2", "ghost", "user1");
        let u2 = create_test_user("user2", "bob");

        let dbs = ServiceDbs {
            follow: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[f1, f2]])
                    .into_connection(),
            ),
            user: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[u2]])
                    .into_connection(),
            ),
            ..ServiceDbs::default()
        };

        let service = build_service(dbs);
        let followers = service.get_followers("user1", 50).await.unwrap();

        assert_eq!(followers.len(), 1);
        assert_eq!(followers[0].handle.as_deref(), Some("bob"));
    }

    // Helper: count queries come back as a single `num_items` column.
    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        let mut row = std::collections::BTreeMap::new();
        row.insert("num_items", sea_orm::Value::from(n));
        row
    }

    #[tokio::test]
    async fn test_reconcile_post_counters_matches_edge_counts() {
        let post = create_test_post("post1", "author1");

        let dbs = ServiceDbs {
            post: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[post]])
                    // set_likes_count + set_comments_count overwrites
                    .append_exec_results([exec_ok(1), exec_ok(1)])
                    .into_connection(),
            ),
            post_like: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[count_row(5)]])
                    .into_connection(),
            ),
            comment: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[count_row(2)]])
                    .into_connection(),
            ),
            ..ServiceDbs::default()
        };

        let service = build_service(dbs);
        let counters = service.reconcile_post_counters("post1").await.unwrap();

        assert_eq!(counters.likes_count, 5);
        assert_eq!(counters.comments_count, 2);
    }

    #[tokio::test]
    async fn test_reconcile_user_counters_matches_edge_counts() {
        let user = create_test_user("user1", "alice");

        let dbs = ServiceDbs {
            user: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[user]])
                    .append_exec_results([exec_ok(1), exec_ok(1)])
                    .into_connection(),
            ),
            follow: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[count_row(3)], [count_row(7)]])
                    .into_connection(),
            ),
            ..ServiceDbs::default()
        };

        let service = build_service(dbs);
        let counters = service.reconcile_user_counters("user1").await.unwrap();

        assert_eq!(counters.followers_count, 3);
        assert_eq!(counters.following_count, 7);
    }

    #[test]
    fn test_saturating_count_clamps() {
        assert_eq!(saturating_count(0), 0);
        assert_eq!(saturating_count(42), 42);
        assert_eq!(saturating_count(u64::MAX), i32::MAX);
    }
}
