//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod engagement;
pub mod post;
pub mod user;

pub use comment::{CommentService, CommentWithAuthor};
pub use engagement::{EngagementService, LikeWithUser, PostCounters, ProfileSummary, UserCounters};
pub use post::{CreatePostInput, PostService, PostWithAuthor};
pub use user::{
    Availability, RegisterInput, UpsertProfileInput, UserService, UserSnapshot,
};
