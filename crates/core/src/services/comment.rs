//! Comment service.

use std::collections::HashMap;

use crate::services::user::UserSnapshot;
use framez_common::{AppError, AppResult, IdGenerator};
use framez_db::{
    entities::comment,
    repositories::{
        CommentLikeRepository, CommentRepository, PostRepository, UserRepository,
    },
};
use sea_orm::Set;
use serde::Serialize;

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    comment_like_repo: CommentLikeRepository,
    post_repo: PostRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Comment with a snapshot of its author's public profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: comment::Model,
    pub author: Option<UserSnapshot>,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub fn new(
        comment_repo: CommentRepository,
        comment_like_repo: CommentLikeRepository,
        post_repo: PostRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            comment_repo,
            comment_like_repo,
            post_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a comment on a post.
    ///
    /// The parent counter increment is best-effort: a post deleted mid-flight
    /// makes the increment a no-op rather than failing the insert.
    pub async fn create(
        &self,
        post_id: &str,
        author_id: &str,
        text: &str,
    ) -> AppResult<comment::Model> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(AppError::BadRequest("Comment cannot be empty".to_string()));
        }

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post_id.to_string()),
            author_id: Set(author_id.to_string()),
            text: Set(trimmed.to_string()),
            ..Default::default()
        };

        let comment = self.comment_repo.create(model).await?;

        self.post_repo.increment_comments_count(post_id).await?;

        tracing::debug!(comment_id = %comment.id, post_id = %post_id, "Created comment");
        Ok(comment)
    }

    /// Get comments on a post, newest first, with author snapshots.
    pub async fn find_by_post(&self, post_id: &str) -> AppResult<Vec<CommentWithAuthor>> {
        let comments = self.comment_repo.find_by_post(post_id).await?;

        let mut author_ids: Vec<String> = comments.iter().map(|c| c.author_id.clone()).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors: HashMap<String, UserSnapshot> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), UserSnapshot::from(u)))
            .collect();

        Ok(comments
            .into_iter()
            .map(|comment| {
                let author = authors.get(&comment.author_id).cloned();
                CommentWithAuthor { comment, author }
            })
            .collect())
    }

    /// Delete a comment. Only the author may delete.
    ///
    /// Removes the comment's like edges, then the comment, then gives the
    /// parent post back one comment slot (floored at zero).
    pub async fn delete(&self, comment_id: &str, caller_id: &str) -> AppResult<()> {
        let comment = self.comment_repo.get_by_id(comment_id).await?;

        if comment.author_id != caller_id {
            return Err(AppError::Forbidden(
                "Not authorized to delete this comment".to_string(),
            ));
        }

        let likes = self.comment_like_repo.delete_by_comment(comment_id).await?;
        self.comment_repo.delete(comment_id).await?;
        self.post_repo
            .decrement_comments_count(&comment.post_id)
            .await?;

        tracing::debug!(comment_id = %comment_id, likes, "Deleted comment");
        Ok(())
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

    fn create_test_comment(id: &str, post_id: &str, author_id: &str, text: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            post_id: post_id.to_string(),
            author_id: author_id.to_string(),
            text: text.to_string(),
            likes_count: 0,
            created_at: Utc::now().into(),
        }
    }

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

    fn mock_db() -> Arc<sea_orm::DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    #[tokio::test]
    async fn test_create_empty_text_fails() {
        let service = CommentService::new(
            CommentRepository::new(mock_db()),
            CommentLikeRepository::new(mock_db()),
            PostRepository::new(mock_db()),
            UserRepository::new(mock_db()),
        );

        let result = service.create("post1", "user1", "   \n\t  ").await;

        assert!(result.is_err());
        match result {
            Err(AppError::BadRequest(msg)) => assert!(msg.contains("cannot be empty")),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_create_trims_text_and_bumps_parent() {
        let stored = create_test_comment("c1", "post1", "user1", "Nice shot!");

        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[stored]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = CommentService::new(
            CommentRepository::new(comment_db),
            CommentLikeRepository::new(mock_db()),
            PostRepository::new(post_db),
            UserRepository::new(mock_db()),
        );

        let result = service
            .create("post1", "user1", "  Nice shot!  ")
            .await
            .unwrap();

        assert_eq!(result.text, "Nice shot!");
        assert_eq!(result.likes_count, 0);
    }

    #[tokio::test]
    async fn test_find_by_post_attaches_authors() {
        let c1 = create_test_comment("c2", "post1", "user1", "second");
        let c2 = create_test_comment("c1", "post1", "user2", "first");
        let u1 = create_test_user("user1", "alice");
        let u2 = create_test_user("user2", "bob");

        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[c1, c2]])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[u1, u2]])
                .into_connection(),
        );

        let service = CommentService::new(
            CommentRepository::new(comment_db),
            CommentLikeRepository::new(mock_db()),
            PostRepository::new(mock_db()),
            UserRepository::new(user_db),
        );

        let result = service.find_by_post("post1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(
            result[0].author.as_ref().unwrap().handle.as_deref(),
            Some("alice")
        );
        assert_eq!(
            result[1].author.as_ref().unwrap().handle.as_deref(),
            Some("bob")
        );
    }

    #[tokio::test]
    async fn test_delete_not_author_forbidden() {
        let comment = create_test_comment("c1", "post1", "user1", "mine");

        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[comment]])
                .into_connection(),
        );

        let service = CommentService::new(
            CommentRepository::new(comment_db),
            CommentLikeRepository::new(mock_db()),
            PostRepository::new(mock_db()),
            UserRepository::new(mock_db()),
        );

        let result = service.delete("c1", "user2").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_comment_not_found() {
        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<comment::Model>::new()])
                .into_connection(),
        );

        let service = CommentService::new(
            CommentRepository::new(comment_db),
            CommentLikeRepository::new(mock_db()),
            PostRepository::new(mock_db()),
            UserRepository::new(mock_db()),
        );

        let result = service.delete("nonexistent", "user1").await;

        assert!(matches!(result, Err(AppError::CommentNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_cascades_likes_and_decrements_parent() {
        let comment = create_test_comment("c1", "post1", "user1", "bye");

        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[comment]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let comment_like_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = CommentService::new(
            CommentRepository::new(comment_db),
            CommentLikeRepository::new(comment_like_db),
            PostRepository::new(post_db),
            UserRepository::new(mock_db()),
        );

        assert!(service.delete("c1", "user1").await.is_ok());
    }
}
