use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Comment, CommentId, Post, PostId, Role, User};

// -- JWT Claims --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

// -- Users --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub user_id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub restricted: bool,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            email: user.email,
            username: user.username,
            role: user.role,
            restricted: user.restricted,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetRestrictionRequest {
    pub restricted: bool,
}

/// What a forced withdrawal removed along with the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawUserResponse {
    pub user_id: Uuid,
    pub deleted_posts: u32,
    pub deleted_comments: u32,
    pub deleted_likes: u32,
}

// -- Posts --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostRequest {
    pub title: String,
    pub contents: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub post_id: PostId,
    pub user: AuthorSummary,
    pub title: String,
    pub contents: String,
    pub like_count: u32,
    pub comment_count: u32,
    pub created_at: DateTime<Utc>,
}

impl PostResponse {
    pub fn new(post: Post, author_username: String) -> Self {
        Self {
            post_id: post.id,
            user: AuthorSummary {
                user_id: post.author_id,
                username: author_username,
            },
            title: post.title,
            contents: post.contents,
            like_count: post.like_count,
            comment_count: post.comment_count,
            created_at: post.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletePostResponse {
    pub deleted_comments: u32,
}

// -- Comments --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentRequest {
    pub contents: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub comment_id: CommentId,
    pub post_id: PostId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<CommentId>,
    pub user: AuthorSummary,
    pub created_at: DateTime<Utc>,
    pub contents: String,
    pub like_count: u32,
    /// Present on top-level comments only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replies_count: Option<u32>,
}

impl CommentResponse {
    pub fn new(comment: Comment, author_username: String) -> Self {
        let replies_count = comment.is_top_level().then_some(comment.replies_count);
        Self {
            comment_id: comment.id,
            post_id: comment.post_id,
            parent_comment_id: comment.parent_id(),
            user: AuthorSummary {
                user_id: comment.author_id,
                username: author_username,
            },
            created_at: comment.created_at,
            contents: comment.contents,
            like_count: comment.like_count,
            replies_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteCommentResponse {
    pub deleted_replies: u32,
    pub message: String,
}

impl DeleteCommentResponse {
    pub fn new(deleted_replies: u32) -> Self {
        let message = if deleted_replies == 0 {
            "Comment deleted".to_string()
        } else {
            format!("Comment and {} replies deleted", deleted_replies)
        };
        Self {
            deleted_replies,
            message,
        }
    }
}

// -- Likes --

#[derive(Debug, Serialize, Deserialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: u32,
}
