//! Database repositories.

pub mod comment;
pub mod comment_like;
pub mod follow;
pub mod post;
pub mod post_like;
pub mod user;

pub use comment::CommentRepository;
pub use comment_like::CommentLikeRepository;
pub use follow::FollowRepository;
pub use post::PostRepository;
pub use post_like::PostLikeRepository;
pub use user::UserRepository;
