//! Database row types, mapped directly from SQLite rows.
//! Distinct from wech-types models so passwords never leave the DB layer.

use wech_types::models::{Message, User};

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub password: String,
    pub online: bool,
}

impl UserRow {
    pub fn verify_password(&self, password: &str) -> bool {
        self.password == password
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            online: row.online,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: i64,
    pub text: String,
    pub timestamp: i64,
    pub user_id: i64,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            text: row.text,
            timestamp: row.timestamp,
            user_id: row.user_id,
        }
    }
}
