use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PostId = i64;
pub type CommentId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub role: Role,
    /// Banned users may read but not write.
    pub restricted: bool,
    pub created_at: DateTime<Utc>,
}

/// The resolved identity behind an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
    pub is_admin: bool,
    pub is_restricted: bool,
}

impl From<User> for Caller {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            email: user.email,
            username: user.username,
            is_admin: user.role == Role::Admin,
            is_restricted: user.restricted,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: Uuid,
    pub title: String,
    pub contents: String,
    pub like_count: u32,
    /// Top-level comments plus replies.
    pub comment_count: u32,
    pub created_at: DateTime<Utc>,
}

/// Position of a comment in its thread. Threads are exactly two levels deep:
/// a reply always points at a top-level comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommentKind {
    TopLevel,
    Reply { parent_id: CommentId },
}

impl CommentKind {
    pub fn from_parent(parent_id: Option<CommentId>) -> Self {
        match parent_id {
            Some(parent_id) => CommentKind::Reply { parent_id },
            None => CommentKind::TopLevel,
        }
    }

    pub fn parent_id(&self) -> Option<CommentId> {
        match self {
            CommentKind::TopLevel => None,
            CommentKind::Reply { parent_id } => Some(*parent_id),
        }
    }

    pub fn is_top_level(&self) -> bool {
        matches!(self, CommentKind::TopLevel)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub kind: CommentKind,
    pub author_id: Uuid,
    pub contents: String,
    pub created_at: DateTime<Utc>,
    pub like_count: u32,
    /// Only maintained on top-level comments; always 0 on replies.
    pub replies_count: u32,
}

impl Comment {
    pub fn is_top_level(&self) -> bool {
        self.kind.is_top_level()
    }

    pub fn parent_id(&self) -> Option<CommentId> {
        self.kind.parent_id()
    }
}
