use crate::Database;
use crate::models::{MessageRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, Row};

impl Database {
    // -- Users --

    pub fn create_user(&self, name: &str, password: &str) -> Result<i64> {
        self.with_tx(|conn| {
            conn.execute(
                "INSERT INTO users (name, password) VALUES (?1, ?2)",
                (name, password),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    /// Names aren't unique; the lowest id wins.
    pub fn get_user_by_name(&self, name: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_name(conn, name))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            query_users(conn, "SELECT id, name, password, online FROM users ORDER BY id")
        })
    }

    /// No ORDER BY: callers get whatever order SQLite yields.
    pub fn list_online_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            query_users(conn, "SELECT id, name, password, online FROM users WHERE online = 1")
        })
    }

    /// Create `name` unless a user with that name already exists.
    /// Returns the new id, or `None` when the user was already there.
    pub fn seed_user(&self, name: &str, password: &str) -> Result<Option<i64>> {
        self.with_tx(|conn| {
            if query_user_by_name(conn, name)?.is_some() {
                return Ok(None);
            }
            conn.execute(
                "INSERT INTO users (name, password) VALUES (?1, ?2)",
                (name, password),
            )?;
            Ok(Some(conn.last_insert_rowid()))
        })
    }

    // -- Messages --

    pub fn insert_message(&self, text: &str, timestamp: i64, user_id: i64) -> Result<MessageRow> {
        self.with_tx(|conn| insert_message(conn, text, timestamp, user_id))
    }

    pub fn get_message(&self, id: i64) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, text, timestamp, user_id FROM messages WHERE id = ?1",
                [id],
                message_from_row,
            )
            .optional()
        })
    }

    pub fn list_messages(&self) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, text, timestamp, user_id FROM messages ORDER BY id")?;
            let rows = stmt
                .query_map([], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Sessions --

    /// Resolve a session id to the user it is bound to.
    pub fn get_session_user(&self, session_id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT u.id, u.name, u.password, u.online
                 FROM sessions s
                 JOIN users u ON s.user_id = u.id
                 WHERE s.id = ?1",
                [session_id],
                user_from_row,
            )
            .optional()
        })
    }
}

// Connection-level helpers, usable inside `Database::with_tx`.

pub fn set_online(conn: &Connection, id: i64, online: bool) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE users SET online = ?1 WHERE id = ?2",
        rusqlite::params![online, id],
    )?;
    Ok(changed > 0)
}

pub fn insert_message(
    conn: &Connection,
    text: &str,
    timestamp: i64,
    user_id: i64,
) -> Result<MessageRow> {
    conn.execute(
        "INSERT INTO messages (text, timestamp, user_id) VALUES (?1, ?2, ?3)",
        rusqlite::params![text, timestamp, user_id],
    )?;

    Ok(MessageRow {
        id: conn.last_insert_rowid(),
        text: text.to_string(),
        timestamp,
        user_id,
    })
}

pub fn create_session(conn: &Connection, id: &str, user_id: i64, created_at: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO sessions (id, user_id, created_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![id, user_id, created_at],
    )?;
    Ok(())
}

pub fn delete_session(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM sessions WHERE id = ?1", [id])?;
    Ok(deleted > 0)
}

pub fn session_user_id(conn: &Connection, id: &str) -> Result<Option<i64>> {
    conn.query_row("SELECT user_id FROM sessions WHERE id = ?1", [id], |row| row.get(0))
        .optional()
}

pub fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    conn.query_row(
        "SELECT id, name, password, online FROM users WHERE id = ?1",
        [id],
        user_from_row,
    )
    .optional()
}

fn query_user_by_name(conn: &Connection, name: &str) -> Result<Option<UserRow>> {
    conn.query_row(
        "SELECT id, name, password, online FROM users WHERE name = ?1 ORDER BY id LIMIT 1",
        [name],
        user_from_row,
    )
    .optional()
}

fn query_users(conn: &Connection, sql: &str) -> Result<Vec<UserRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], user_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        password: row.get(2)?,
        online: row.get(3)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        text: row.get(1)?,
        timestamp: row.get(2)?,
        user_id: row.get(3)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
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
