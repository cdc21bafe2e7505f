//! Post service.

use std::collections::HashMap;

use crate::services::user::UserSnapshot;
use framez_common::{AppError, AppResult, IdGenerator};
use framez_db::{
    entities::post,
    repositories::{
        CommentLikeRepository, CommentRepository, PostLikeRepository, PostRepository,
        UserRepository,
    },
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    post_like_repo: PostLikeRepository,
    comment_like_repo: CommentLikeRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for creating a new post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    #[validate(length(max = 2200))]
    pub caption: Option<String>,

    /// Image reference produced by the upload step, never a byte stream.
    #[validate(length(max = 1024))]
    pub image_url: Option<String>,
}

/// Post with a snapshot of its author's public profile.
///
/// A missing author yields `author: None` rather than failing the read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostWithAuthor {
    #[serde(flatten)]
    pub post: post::Model,
    pub author: Option<UserSnapshot>,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        comment_repo: CommentRepository,
        post_like_repo: PostLikeRepository,
        comment_like_repo: CommentLikeRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            post_repo,
            comment_repo,
            post_like_repo,
            comment_like_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a new post.
    pub async fn create(&self, author_id: &str, input: CreatePostInput) -> AppResult<post::Model> {
        input.validate()?;

        // A post needs something to show
        if input.caption.is_none() && input.image_url.is_none() {
            return Err(AppError::BadRequest(
                "Post must have either a caption or an image".to_string(),
            ));
        }

        // Verify the author exists
        self.user_repo.get_by_id(author_id).await?;

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author_id.to_string()),
            caption: Set(input.caption),
            image_url: Set(input.image_url),
            ..Default::default()
        };

        let post = self.post_repo.create(model).await?;
        tracing::debug!(post_id = %post.id, author_id = %author_id, "Created post");
        Ok(post)
    }

    /// Get the global feed, newest first, with author snapshots.
    pub async fn get_feed(&self, limit: u64) -> AppResult<Vec<PostWithAuthor>> {
        let posts = self.post_repo.find_recent(limit).await?;
        self.attach_authors(posts).await
    }

    /// Get all posts by one author, newest first.
    pub async fn find_by_author(&self, author_id: &str) -> AppResult<Vec<post::Model>> {
        self.post_repo.find_by_author(author_id).await
    }

    /// Get a single post with its author snapshot, or `None` if absent.
    pub async fn get_with_author(&self, post_id: &str) -> AppResult<Option<PostWithAuthor>> {
        let Some(post) = self.post_repo.find_by_id(post_id).await? else {
            return Ok(None);
        };

        let author = self
            .user_repo
            .find_by_id(&post.author_id)
            .await?
            .map(UserSnapshot::from);

        Ok(Some(PostWithAuthor { post, author }))
    }

    /// Update a post's caption. Only the author may edit.
    pub async fn update_caption(
        &self,
        post_id: &str,
        caller_id: &str,
        caption: String,
    ) -> AppResult<post::Model> {
        let post = self.post_repo.get_by_id(post_id).await?;

        if post.author_id != caller_id {
            return Err(AppError::Forbidden(
                "Not authorized to update this post".to_string(),
            ));
        }

        let mut active: post::ActiveModel = post.into();
        active.caption = Set(Some(caption));
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.post_repo.update(active).await
    }

    /// Delete a post. Only the author may delete.
    ///
    /// Cascades: removes the post's comments, the likes on those comments,
    /// and the likes on the post itself, so no edge can point at a deleted
    /// post.
    pub async fn delete(&self, post_id: &str, caller_id: &str) -> AppResult<()> {
        let post = self.post_repo.get_by_id(post_id).await?;

        if post.author_id != caller_id {
            return Err(AppError::Forbidden(
                "Not authorized to delete this post".to_string(),
            ));
        }

        let comment_ids = self.comment_repo.find_ids_by_post(post_id).await?;
        let comment_likes = self
            .comment_like_repo
            .delete_by_comments(&comment_ids)
            .await?;
        let comments = self.comment_repo.delete_by_post(post_id).await?;
        let likes = self.post_like_repo.delete_by_post(post_id).await?;

        self.post_repo.delete(post_id).await?;

        tracing::debug!(
            post_id = %post_id,
            comments,
            likes,
            comment_likes,
            "Deleted post and dependents"
        );
        Ok(())
    }

    /// Attach author snapshots to a page of posts with one batched lookup.
    async fn attach_authors(&self, posts: Vec<post::Model>) -> AppResult<Vec<PostWithAuthor>> {
        let mut author_ids: Vec<String> = posts.iter().map(|p| p.author_id.clone()).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors: HashMap<String, UserSnapshot> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), UserSnapshot::from(u)))
            .collect();

        Ok(posts
            .into_iter()
            .map(|post| {
                let author = authors.get(&post.author_id).cloned();
                PostWithAuthor { post, author }
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use framez_db::entities::user;
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

    fn create_test_post(id: &str, author_id: &str, caption: Option<&str>) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            caption: caption.map(ToString::to_string),
            image_url: None,
            likes_count: 0,
            comments_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(
        post_db: Arc<sea_orm::DatabaseConnection>,
        user_db: Arc<sea_orm::DatabaseConnection>,
    ) -> PostService {
        let aux = || Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        PostService::new(
            PostRepository::new(post_db),
            CommentRepository::new(aux()),
            PostLikeRepository::new(aux()),
            CommentLikeRepository::new(aux()),
            UserRepository::new(user_db),
        )
    }

    #[tokio::test]
    async fn test_create_without_caption_or_image_fails() {
        let post_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(post_db, user_db);
        let result = service
            .create(
                "user1",
                CreatePostInput {
                    caption: None,
                    image_url: None,
                },
            )
            .await;

        assert!(result.is_err());
        match result {
            Err(AppError::BadRequest(msg)) => {
                assert!(msg.contains("caption or an image"));
            }
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_create_unknown_author_fails() {
        let post_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let service = service_with(post_db, user_db);
        let result = service
            .create(
                "ghost",
                CreatePostInput {
                    caption: Some("hello".to_string()),
                    image_url: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_create_with_caption_only() {
        let post = create_test_post("post1", "user1", Some("hello"));
        let author = create_test_user("user1", "alice");

        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[author]])
                .into_connection(),
        );

        let service = service_with(post_db, user_db);
        let result = service
            .create(
                "user1",
                CreatePostInput {
                    caption: Some("hello".to_string()),
                    image_url: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(result.caption.as_deref(), Some("hello"));
        assert_eq!(result.likes_count, 0);
        assert_eq!(result.comments_count, 0);
    }

    #[tokio::test]
    async fn test_get_with_author_missing_post_returns_none() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(post_db, user_db);
        let result = service.get_with_author("nonexistent").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_get_with_author_missing_author_yields_null_author() {
        let post = create_test_post("post1", "ghost", Some("orphan"));

        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let service = service_with(post_db, user_db);
        let result = service.get_with_author("post1").await.unwrap().unwrap();

        assert!(result.author.is_none());
        assert_eq!(result.post.id, "post1");
    }

    #[tokio::test]
    async fn test_get_feed_attaches_authors() {
        let p1 = create_test_post("post2", "user1", Some("newer"));
        let p2 = create_test_post("post1", "user1", Some("older"));
        let author = create_test_user("user1", "alice");

        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[p1, p2]])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[author]])
                .into_connection(),
        );

        let service = service_with(post_db, user_db);
        let feed = service.get_feed(50).await.unwrap();

        assert_eq!(feed.len(), 2);
        assert!(feed.iter().all(|p| p.author.is_some()));
        assert_eq!(
            feed[0].author.as_ref().unwrap().handle.as_deref(),
            Some("alice")
        );
    }

    #[tokio::test]
    async fn test_update_caption_not_author_forbidden() {
        let post = create_test_post("post1", "user1", Some("original"));

        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .into_connection(),
        );
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(post_db, user_db);
        let result = service
            .update_caption("post1", "user2", "hijacked".to_string())
            .await;

        assert!(result.is_err());
        match result {
            Err(AppError::Forbidden(msg)) => assert!(msg.contains("Not authorized")),
            _ => panic!("Expected Forbidden error"),
        }
    }

    #[tokio::test]
    async fn test_update_caption_missing_post_not_found() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(post_db, user_db);
        let result = service
            .update_caption("nonexistent", "user1", "new".to_string())
            .await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_not_author_forbidden() {
        let post = create_test_post("post1", "user1", Some("keep out"));

        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .into_connection(),
        );
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(post_db, user_db);
        let result = service.delete("post1", "user2").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_cascades_dependents() {
        let post = create_test_post("post1", "user1", Some("bye"));

        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![id_row("c1"), id_row("c2")]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );
        let post_like_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 3,
                }])
                .into_connection(),
        );
        let comment_like_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = PostService::new(
            PostRepository::new(post_db),
            CommentRepository::new(comment_db),
            PostLikeRepository::new(post_like_db),
            CommentLikeRepository::new(comment_like_db),
            UserRepository::new(user_db),
        );

        assert!(service.delete("post1", "user1").await.is_ok());
    }

    // Helper: the comment-id projection query returns bare string rows.
    fn id_row(id: &str) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        let mut row = std::collections::BTreeMap::new();
        row.insert("id", sea_orm::Value::from(id));
        row
    }
}
