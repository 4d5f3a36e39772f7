use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::models::{LikeRow, format_timestamp};

// -- Comment likes --

pub fn exists_comment_like(conn: &Connection, user_id: &str, comment_id: i64) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM comment_likes WHERE user_id = ?1 AND comment_id = ?2)",
        rusqlite::params![user_id, comment_id],
        |r| r.get(0),
    )?;
    Ok(exists)
}

/// Inserts the (user, comment) like. Returns false when the pair already
/// exists: the primary key is what rejects a double like.
pub fn insert_comment_like(
    conn: &Connection,
    user_id: &str,
    comment_id: i64,
    created_at: DateTime<Utc>,
) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO comment_likes (user_id, comment_id, created_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![user_id, comment_id, format_timestamp(created_at)],
    )?;
    Ok(inserted > 0)
}

pub fn delete_comment_like(conn: &Connection, user_id: &str, comment_id: i64) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM comment_likes WHERE user_id = ?1 AND comment_id = ?2",
        rusqlite::params![user_id, comment_id],
    )?;
    Ok(deleted > 0)
}

pub fn find_likes_of(conn: &Connection, comment_id: i64) -> Result<Vec<LikeRow>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, comment_id, created_at FROM comment_likes WHERE comment_id = ?1 ORDER BY created_at",
    )?;

    let rows = stmt
        .query_map([comment_id], |row| {
            Ok(LikeRow {
                user_id: row.get(0)?,
                target_id: row.get(1)?,
                created_at: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn delete_likes_of_comment(conn: &Connection, comment_id: i64) -> Result<usize> {
    let deleted = conn.execute("DELETE FROM comment_likes WHERE comment_id = ?1", [comment_id])?;
    Ok(deleted)
}

pub fn delete_likes_of_replies(conn: &Connection, parent_id: i64) -> Result<usize> {
    let deleted = conn.execute(
        "DELETE FROM comment_likes
         WHERE comment_id IN (SELECT id FROM comments WHERE parent_comment_id = ?1)",
        [parent_id],
    )?;
    Ok(deleted)
}

pub fn delete_comment_likes_of_post(conn: &Connection, post_id: i64) -> Result<usize> {
    let deleted = conn.execute(
        "DELETE FROM comment_likes
         WHERE comment_id IN (SELECT id FROM comments WHERE post_id = ?1)",
        [post_id],
    )?;
    Ok(deleted)
}

/// Ids of every comment the user currently likes.
pub fn comments_liked_by(conn: &Connection, user_id: &str) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT comment_id FROM comment_likes WHERE user_id = ?1")?;
    let ids = stmt
        .query_map([user_id], |r| r.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(ids)
}

pub fn delete_comment_likes_by(conn: &Connection, user_id: &str) -> Result<usize> {
    let deleted = conn.execute("DELETE FROM comment_likes WHERE user_id = ?1", [user_id])?;
    Ok(deleted)
}

// -- Post likes --

pub fn exists_post_like(conn: &Connection, user_id: &str, post_id: i64) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM post_likes WHERE user_id = ?1 AND post_id = ?2)",
        rusqlite::params![user_id, post_id],
        |r| r.get(0),
    )?;
    Ok(exists)
}

pub fn insert_post_like(
    conn: &Connection,
    user_id: &str,
    post_id: i64,
    created_at: DateTime<Utc>,
) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO post_likes (user_id, post_id, created_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![user_id, post_id, format_timestamp(created_at)],
    )?;
    Ok(inserted > 0)
}

pub fn delete_post_like(conn: &Connection, user_id: &str, post_id: i64) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM post_likes WHERE user_id = ?1 AND post_id = ?2",
        rusqlite::params![user_id, post_id],
    )?;
    Ok(deleted > 0)
}

pub fn delete_likes_of_post(conn: &Connection, post_id: i64) -> Result<usize> {
    let deleted = conn.execute("DELETE FROM post_likes WHERE post_id = ?1", [post_id])?;
    Ok(deleted)
}

pub fn posts_liked_by(conn: &Connection, user_id: &str) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT post_id FROM post_likes WHERE user_id = ?1")?;
    let ids = stmt
        .query_map([user_id], |r| r.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(ids)
}

pub fn delete_post_likes_by(conn: &Connection, user_id: &str) -> Result<usize> {
    let deleted = conn.execute("DELETE FROM post_likes WHERE user_id = ?1", [user_id])?;
    Ok(deleted)
}
