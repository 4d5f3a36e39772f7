use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row};

use plaza_types::paging::SortOrder;

use crate::models::{CommentRow, format_timestamp};
use crate::queries::OptionalExt;

// JOIN users to fetch the author username in the same query (no N+1 on listings)
const COMMENT_SELECT: &str = "SELECT c.id, c.post_id, c.parent_comment_id, c.author_id, u.username,
            c.contents, c.created_at, c.like_count, c.replies_count
     FROM comments c
     LEFT JOIN users u ON c.author_id = u.id";

fn map_comment(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        post_id: row.get(1)?,
        parent_comment_id: row.get(2)?,
        author_id: row.get(3)?,
        author_username: row
            .get::<_, Option<String>>(4)?
            .unwrap_or_else(|| "unknown".to_string()),
        contents: row.get(5)?,
        created_at: row.get(6)?,
        like_count: row.get(7)?,
        replies_count: row.get(8)?,
    })
}

fn order_sql(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Oldest => "ORDER BY c.id ASC",
        SortOrder::Newest => "ORDER BY c.id DESC",
    }
}

/// Inserts a comment with zeroed counters and returns its new id.
pub fn insert_comment(
    conn: &Connection,
    post_id: i64,
    parent_comment_id: Option<i64>,
    author_id: &str,
    contents: &str,
    created_at: DateTime<Utc>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO comments (post_id, parent_comment_id, author_id, contents, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            post_id,
            parent_comment_id,
            author_id,
            contents,
            format_timestamp(created_at)
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_comment(conn: &Connection, id: i64) -> Result<Option<CommentRow>> {
    let mut stmt = conn.prepare(&format!("{} WHERE c.id = ?1", COMMENT_SELECT))?;
    let row = stmt.query_row([id], map_comment).optional()?;
    Ok(row)
}

pub fn update_contents(conn: &Connection, id: i64, contents: &str) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE comments SET contents = ?2 WHERE id = ?1",
        rusqlite::params![id, contents],
    )?;
    Ok(changed > 0)
}

/// Adds `delta` to `like_count`, flooring at zero. Returns the new value, or
/// `None` when the comment does not exist.
pub fn bump_like_count(conn: &Connection, id: i64, delta: i64) -> Result<Option<i64>> {
    let value = conn
        .query_row(
            "UPDATE comments SET like_count = MAX(like_count + ?2, 0) WHERE id = ?1 RETURNING like_count",
            rusqlite::params![id, delta],
            |r| r.get(0),
        )
        .optional()?;
    Ok(value)
}

/// Adds `delta` to `replies_count`, flooring at zero. Returns the new value, or
/// `None` when the comment does not exist.
pub fn bump_replies_count(conn: &Connection, id: i64, delta: i64) -> Result<Option<i64>> {
    let value = conn
        .query_row(
            "UPDATE comments SET replies_count = MAX(replies_count + ?2, 0) WHERE id = ?1 RETURNING replies_count",
            rusqlite::params![id, delta],
            |r| r.get(0),
        )
        .optional()?;
    Ok(value)
}

/// All replies under `parent_id`, oldest first.
pub fn find_replies_of(conn: &Connection, parent_id: i64) -> Result<Vec<CommentRow>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE c.parent_comment_id = ?1 ORDER BY c.id ASC",
        COMMENT_SELECT
    ))?;

    let rows = stmt
        .query_map([parent_id], map_comment)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn count_replies(conn: &Connection, parent_id: i64) -> Result<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM comments WHERE parent_comment_id = ?1",
        [parent_id],
        |r| r.get(0),
    )?;
    Ok(count as u64)
}

pub fn list_replies(
    conn: &Connection,
    parent_id: i64,
    order: SortOrder,
    limit: u32,
    offset: u64,
) -> Result<Vec<CommentRow>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE c.parent_comment_id = ?1 {} LIMIT ?2 OFFSET ?3",
        COMMENT_SELECT,
        order_sql(order)
    ))?;

    let rows = stmt
        .query_map(rusqlite::params![parent_id, limit, offset as i64], map_comment)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn count_top_level(conn: &Connection, post_id: i64) -> Result<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM comments WHERE post_id = ?1 AND parent_comment_id IS NULL",
        [post_id],
        |r| r.get(0),
    )?;
    Ok(count as u64)
}

pub fn list_top_level(
    conn: &Connection,
    post_id: i64,
    order: SortOrder,
    limit: u32,
    offset: u64,
) -> Result<Vec<CommentRow>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE c.post_id = ?1 AND c.parent_comment_id IS NULL {} LIMIT ?2 OFFSET ?3",
        COMMENT_SELECT,
        order_sql(order)
    ))?;

    let rows = stmt
        .query_map(rusqlite::params![post_id, limit, offset as i64], map_comment)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Every comment and reply written by `author_id`, replies first.
pub fn find_comments_by_author(conn: &Connection, author_id: &str) -> Result<Vec<CommentRow>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE c.author_id = ?1 ORDER BY c.parent_comment_id IS NULL, c.id",
        COMMENT_SELECT
    ))?;

    let rows = stmt
        .query_map([author_id], map_comment)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Deletes every reply under `parent_id`. Returns the number of rows removed.
pub fn delete_replies_of(conn: &Connection, parent_id: i64) -> Result<usize> {
    let deleted = conn.execute(
        "DELETE FROM comments WHERE parent_comment_id = ?1",
        [parent_id],
    )?;
    Ok(deleted)
}

pub fn delete_comment(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM comments WHERE id = ?1", [id])?;
    Ok(deleted > 0)
}

/// Deletes every comment on a post, replies first so no reply outlives its
/// parent even for the length of a statement. Returns the number removed.
pub fn delete_comments_of_post(conn: &Connection, post_id: i64) -> Result<usize> {
    let replies = conn.execute(
        "DELETE FROM comments WHERE post_id = ?1 AND parent_comment_id IS NOT NULL",
        [post_id],
    )?;
    let top_level = conn.execute("DELETE FROM comments WHERE post_id = ?1", [post_id])?;
    Ok(replies + top_level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use crate::posts::insert_post;
    use crate::queries::insert_user;
    use plaza_types::models::Role;

    fn seed(db: &Database) -> (String, i64) {
        let author = uuid::Uuid::new_v4().to_string();
        let post_id = db
            .with_tx(|tx| {
                insert_user(tx, &author, "a@example.com", "alice", "hash", Role::User, Utc::now())?;
                insert_post(tx, &author, "title", "body", Utc::now())
            })
            .unwrap();
        (author, post_id)
    }

    #[test]
    fn reply_to_reply_is_rejected_by_schema() {
        let db = Database::open_in_memory().unwrap();
        let (author, post_id) = seed(&db);

        let result = db.with_tx(|tx| {
            let top = insert_comment(tx, post_id, None, &author, "top", Utc::now())?;
            let reply = insert_comment(tx, post_id, Some(top), &author, "reply", Utc::now())?;
            insert_comment(tx, post_id, Some(reply), &author, "too deep", Utc::now())
        });

        let err = result.unwrap_err();
        assert!(err.to_string().contains("nesting depth exceeded"));
    }

    #[test]
    fn counters_floor_at_zero() {
        let db = Database::open_in_memory().unwrap();
        let (author, post_id) = seed(&db);

        let (likes, replies) = db
            .with_tx(|tx| {
                let id = insert_comment(tx, post_id, None, &author, "top", Utc::now())?;
                let likes = bump_like_count(tx, id, -1)?;
                let replies = bump_replies_count(tx, id, -1)?;
                Ok::<_, anyhow::Error>((likes, replies))
            })
            .unwrap();
        assert_eq!(likes, Some(0));
        assert_eq!(replies, Some(0));

        let missing = db.with_tx(|tx| bump_like_count(tx, 999, 1)).unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn listings_page_in_configured_order() {
        let db = Database::open_in_memory().unwrap();
        let (author, post_id) = seed(&db);

        db.with_tx(|tx| {
            for i in 0..5 {
                insert_comment(tx, post_id, None, &author, &format!("c{i}"), Utc::now())?;
            }
            Ok::<_, anyhow::Error>(())
        })
        .unwrap();

        let oldest = db
            .with_conn(|conn| list_top_level(conn, post_id, SortOrder::Oldest, 2, 0))
            .unwrap();
        let newest = db
            .with_conn(|conn| list_top_level(conn, post_id, SortOrder::Newest, 2, 0))
            .unwrap();

        assert_eq!(oldest.iter().map(|c| c.contents.as_str()).collect::<Vec<_>>(), ["c0", "c1"]);
        assert_eq!(newest.iter().map(|c| c.contents.as_str()).collect::<Vec<_>>(), ["c4", "c3"]);
        assert_eq!(oldest[0].author_username, "alice");
        assert_eq!(db.with_conn(|conn| count_top_level(conn, post_id)).unwrap(), 5);
    }
}
