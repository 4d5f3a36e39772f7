use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                email       TEXT NOT NULL UNIQUE,
                username    TEXT NOT NULL,
                password    TEXT NOT NULL,
                role        TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin')),
                restricted  INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE posts (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                author_id       TEXT NOT NULL REFERENCES users(id),
                title           TEXT NOT NULL,
                contents        TEXT NOT NULL,
                like_count      INTEGER NOT NULL DEFAULT 0 CHECK (like_count >= 0),
                comment_count   INTEGER NOT NULL DEFAULT 0 CHECK (comment_count >= 0),
                created_at      TEXT NOT NULL
            );

            CREATE TABLE comments (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id             INTEGER NOT NULL REFERENCES posts(id),
                parent_comment_id   INTEGER REFERENCES comments(id),
                author_id           TEXT NOT NULL REFERENCES users(id),
                contents            TEXT NOT NULL CHECK (length(contents) > 0),
                created_at          TEXT NOT NULL,
                like_count          INTEGER NOT NULL DEFAULT 0 CHECK (like_count >= 0),
                replies_count       INTEGER NOT NULL DEFAULT 0 CHECK (replies_count >= 0)
            );

            CREATE INDEX idx_comments_post
                ON comments(post_id, parent_comment_id, id);

            CREATE INDEX idx_comments_parent
                ON comments(parent_comment_id, id);

            -- Threads are two levels deep: a reply may only point at a top-level comment.
            CREATE TRIGGER comments_max_depth
            BEFORE INSERT ON comments
            WHEN NEW.parent_comment_id IS NOT NULL
                AND (SELECT parent_comment_id FROM comments WHERE id = NEW.parent_comment_id) IS NOT NULL
            BEGIN
                SELECT RAISE(ABORT, 'nesting depth exceeded');
            END;

            CREATE TABLE comment_likes (
                user_id     TEXT NOT NULL REFERENCES users(id),
                comment_id  INTEGER NOT NULL REFERENCES comments(id),
                created_at  TEXT NOT NULL,
                PRIMARY KEY (user_id, comment_id)
            );

            CREATE INDEX idx_comment_likes_comment
                ON comment_likes(comment_id);

            CREATE TABLE post_likes (
                user_id     TEXT NOT NULL REFERENCES users(id),
                post_id     INTEGER NOT NULL REFERENCES posts(id),
                created_at  TEXT NOT NULL,
                PRIMARY KEY (user_id, post_id)
            );

            CREATE INDEX idx_post_likes_post
                ON post_likes(post_id);

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(versions, 1);
    }
}
