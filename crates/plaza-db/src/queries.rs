use crate::Database;
use crate::models::{UserRow, format_timestamp};
use anyhow::Result;
use chrono::{DateTime, Utc};
use plaza_types::models::Role;
use rusqlite::{Connection, Row};

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        email: &str,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<()> {
        self.with_tx(|tx| insert_user(tx, id, email, username, password_hash, role, Utc::now()))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_email(conn, email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }
}

const USER_COLUMNS: &str = "id, email, username, password, role, restricted, created_at";

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        password: row.get(3)?,
        role: row.get(4)?,
        restricted: row.get(5)?,
        created_at: row.get(6)?,
    })
}

pub fn insert_user(
    conn: &Connection,
    id: &str,
    email: &str,
    username: &str,
    password_hash: &str,
    role: Role,
    created_at: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO users (id, email, username, password, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            id,
            email,
            username,
            password_hash,
            role.as_str(),
            format_timestamp(created_at)
        ],
    )?;
    Ok(())
}

pub fn query_user_by_email(conn: &Connection, email: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS))?;
    let row = stmt.query_row([email], map_user).optional()?;
    Ok(row)
}

pub fn query_user_by_id(conn: &Connection, id: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS))?;
    let row = stmt.query_row([id], map_user).optional()?;
    Ok(row)
}

/// Returns false when no such user exists.
pub fn set_user_restricted(conn: &Connection, id: &str, restricted: bool) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE users SET restricted = ?2 WHERE id = ?1",
        rusqlite::params![id, restricted],
    )?;
    Ok(changed > 0)
}

pub fn count_restricted_users(conn: &Connection) -> Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM users WHERE restricted = 1", [], |r| {
        r.get(0)
    })?;
    Ok(count as u64)
}

pub fn list_restricted_users(conn: &Connection, limit: u32, offset: u64) -> Result<Vec<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM users WHERE restricted = 1 ORDER BY created_at, id LIMIT ?1 OFFSET ?2",
        USER_COLUMNS
    ))?;

    let rows = stmt
        .query_map(rusqlite::params![limit, offset as i64], map_user)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn count_users(conn: &Connection) -> Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?;
    Ok(count as u64)
}

pub fn list_users(conn: &Connection, limit: u32, offset: u64) -> Result<Vec<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM users ORDER BY created_at, id LIMIT ?1 OFFSET ?2",
        USER_COLUMNS
    ))?;

    let rows = stmt
        .query_map(rusqlite::params![limit, offset as i64], map_user)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Removes the account row. Fails on the foreign keys while the user still
/// owns posts, comments or likes.
pub fn delete_user(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
    Ok(deleted > 0)
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
