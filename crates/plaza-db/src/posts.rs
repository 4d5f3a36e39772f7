use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row};

use crate::models::{PostRow, format_timestamp};
use crate::queries::OptionalExt;

const POST_SELECT: &str = "SELECT p.id, p.author_id, u.username, p.title, p.contents,
            p.like_count, p.comment_count, p.created_at
     FROM posts p
     LEFT JOIN users u ON p.author_id = u.id";

fn map_post(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        author_id: row.get(1)?,
        author_username: row
            .get::<_, Option<String>>(2)?
            .unwrap_or_else(|| "unknown".to_string()),
        title: row.get(3)?,
        contents: row.get(4)?,
        like_count: row.get(5)?,
        comment_count: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub fn insert_post(
    conn: &Connection,
    author_id: &str,
    title: &str,
    contents: &str,
    created_at: DateTime<Utc>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO posts (author_id, title, contents, created_at) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![author_id, title, contents, format_timestamp(created_at)],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_post(conn: &Connection, id: i64) -> Result<Option<PostRow>> {
    let mut stmt = conn.prepare(&format!("{} WHERE p.id = ?1", POST_SELECT))?;
    let row = stmt.query_row([id], map_post).optional()?;
    Ok(row)
}

pub fn post_exists(conn: &Connection, id: i64) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM posts WHERE id = ?1)",
        [id],
        |r| r.get(0),
    )?;
    Ok(exists)
}

pub fn count_posts(conn: &Connection) -> Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM posts", [], |r| r.get(0))?;
    Ok(count as u64)
}

/// Newest first.
pub fn list_posts(conn: &Connection, limit: u32, offset: u64) -> Result<Vec<PostRow>> {
    let mut stmt = conn.prepare(&format!(
        "{} ORDER BY p.id DESC LIMIT ?1 OFFSET ?2",
        POST_SELECT
    ))?;

    let rows = stmt
        .query_map(rusqlite::params![limit, offset as i64], map_post)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn post_ids_by_author(conn: &Connection, author_id: &str) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT id FROM posts WHERE author_id = ?1 ORDER BY id")?;
    let ids = stmt
        .query_map([author_id], |r| r.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(ids)
}

pub fn bump_post_like_count(conn: &Connection, id: i64, delta: i64) -> Result<Option<i64>> {
    let value = conn
        .query_row(
            "UPDATE posts SET like_count = MAX(like_count + ?2, 0) WHERE id = ?1 RETURNING like_count",
            rusqlite::params![id, delta],
            |r| r.get(0),
        )
        .optional()?;
    Ok(value)
}

pub fn bump_post_comment_count(conn: &Connection, id: i64, delta: i64) -> Result<Option<i64>> {
    let value = conn
        .query_row(
            "UPDATE posts SET comment_count = MAX(comment_count + ?2, 0) WHERE id = ?1 RETURNING comment_count",
            rusqlite::params![id, delta],
            |r| r.get(0),
        )
        .optional()?;
    Ok(value)
}

pub fn delete_post(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM posts WHERE id = ?1", [id])?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use crate::queries::insert_user;
    use plaza_types::models::Role;

    #[test]
    fn posts_list_newest_first_with_author() {
        let db = Database::open_in_memory().unwrap();
        let author = uuid::Uuid::new_v4().to_string();

        db.with_tx(|tx| {
            insert_user(tx, &author, "a@example.com", "alice", "hash", Role::User, Utc::now())?;
            insert_post(tx, &author, "first", "one", Utc::now())?;
            insert_post(tx, &author, "second", "two", Utc::now())?;
            Ok::<_, anyhow::Error>(())
        })
        .unwrap();

        let rows = db.with_conn(|conn| list_posts(conn, 10, 0)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "second");
        assert_eq!(rows[0].author_username, "alice");
        assert_eq!(db.with_conn(count_posts).unwrap(), 2);
    }

    #[test]
    fn post_must_have_existing_author() {
        let db = Database::open_in_memory().unwrap();
        let result = db.with_tx(|tx| insert_post(tx, "ghost", "t", "b", Utc::now()));
        assert!(result.is_err());
    }
}
