//! Comment like repository.

use std::sync::Arc;

use crate::entities::{comment_like, CommentLike};
use framez_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

/// Comment like repository for database operations.
#[derive(Clone)]
pub struct CommentLikeRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentLikeRepository {
    /// Create a new comment like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a like by (comment, user) pair.
    ///
    /// Point lookup on the unique (`comment_id`, `user_id`) index.
    pub async fn find_by_pair(
        &self,
        comment_id: &str,
        user_id: &str,
    ) -> AppResult<Option<comment_like::Model>> {
        CommentLike::find()
            .filter(comment_like::Column::CommentId.eq(comment_id))
            .filter(comment_like::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user has liked a comment.
    pub async fn has_liked(&self, comment_id: &str, user_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(comment_id, user_id).await?.is_some())
    }

    /// Create a new like.
    pub async fn create(
        &self,
        model: comment_like::ActiveModel,
    ) -> AppResult<comment_like::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a like by pair.
    pub async fn delete_by_pair(&self, comment_id: &str, user_id: &str) -> AppResult<()> {
        let like = self.find_by_pair(comment_id, user_id).await?;
        if let Some(l) = like {
            l.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Get likes on a comment in insertion order.
    pub async fn find_by_comment(
        &self,
        comment_id: &str,
        limit: u64,
    ) -> AppResult<Vec<comment_like::Model>> {
        CommentLike::find()
            .filter(comment_like::Column::CommentId.eq(comment_id))
            .order_by_asc(comment_like::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete all likes on a comment (cascade on comment deletion).
    pub async fn delete_by_comment(&self, comment_id: &str) -> AppResult<u64> {
        let res = CommentLike::delete_many()
            .filter(comment_like::Column::CommentId.eq(comment_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(res.rows_affected)
    }

    /// Delete all likes on a set of comments (cascade on post deletion).
    pub async fn delete_by_comments(&self, comment_ids: &[String]) -> AppResult<u64> {
        if comment_ids.is_empty() {
            return Ok(0);
        }

        let res = CommentLike::delete_many()
            .filter(comment_like::Column::CommentId.is_in(comment_ids.to_vec()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(res.rows_affected)
    }

    /// Count live likes on a comment (reconciliation oracle).
    pub async fn count_by_comment(&self, comment_id: &str) -> AppResult<u64> {
        CommentLike::find()
            .filter(comment_like::Column::CommentId.eq(comment_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
