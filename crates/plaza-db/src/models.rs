//! Database row types. These map directly to SQLite rows.
//! Distinct from plaza-types models to keep the DB layer independent;
//! the `into_*` conversions parse ids and timestamps back out of TEXT.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use uuid::Uuid;

use plaza_types::models::{Comment, CommentKind, Post, Role, User};

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: String,
    pub restricted: bool,
    pub created_at: String,
}

pub struct PostRow {
    pub id: i64,
    pub author_id: String,
    pub author_username: String,
    pub title: String,
    pub contents: String,
    pub like_count: i64,
    pub comment_count: i64,
    pub created_at: String,
}

pub struct CommentRow {
    pub id: i64,
    pub post_id: i64,
    pub parent_comment_id: Option<i64>,
    pub author_id: String,
    pub author_username: String,
    pub contents: String,
    pub created_at: String,
    pub like_count: i64,
    pub replies_count: i64,
}

/// A like on either a comment or a post; `target_id` is whichever was liked.
pub struct LikeRow {
    pub user_id: String,
    pub target_id: i64,
    pub created_at: String,
}

impl UserRow {
    pub fn into_user(self) -> Result<User> {
        Ok(User {
            id: parse_uuid(&self.id)?,
            role: Role::parse(&self.role).ok_or_else(|| anyhow!("Unknown role '{}'", self.role))?,
            created_at: parse_timestamp(&self.created_at)?,
            email: self.email,
            username: self.username,
            restricted: self.restricted,
        })
    }
}

impl PostRow {
    pub fn into_post(self) -> Result<Post> {
        Ok(Post {
            id: self.id,
            author_id: parse_uuid(&self.author_id)?,
            title: self.title,
            contents: self.contents,
            like_count: to_count(self.like_count),
            comment_count: to_count(self.comment_count),
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

impl CommentRow {
    pub fn into_comment(self) -> Result<Comment> {
        let kind = CommentKind::from_parent(self.parent_comment_id);
        Ok(Comment {
            id: self.id,
            post_id: self.post_id,
            author_id: parse_uuid(&self.author_id)?,
            contents: self.contents,
            created_at: parse_timestamp(&self.created_at)?,
            like_count: to_count(self.like_count),
            replies_count: if kind.is_top_level() {
                to_count(self.replies_count)
            } else {
                0
            },
            kind,
        })
    }
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite's datetime('now') has no timezone; it is UTC.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .with_context(|| format!("Corrupt timestamp '{}'", raw))
}

fn parse_uuid(raw: &str) -> Result<Uuid> {
    raw.parse::<Uuid>()
        .with_context(|| format!("Corrupt user id '{}'", raw))
}

fn to_count(raw: i64) -> u32 {
    u32::try_from(raw.max(0)).unwrap_or(u32::MAX)
}
