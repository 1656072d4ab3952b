use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use wech_db::{Database, queries};
use wech_types::models::{Message, MessageTextError, User, validate_message_text};

#[derive(Debug, Error)]
pub enum PostError {
    #[error(transparent)]
    Invalid(#[from] MessageTextError),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Read and write access to users and messages for the handlers.
#[derive(Clone)]
pub struct ChatService {
    db: Arc<Database>,
}

impl ChatService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn list_users(&self) -> anyhow::Result<Vec<User>> {
        Ok(self.db.list_users()?.into_iter().map(User::from).collect())
    }

    /// Order is whatever storage yields.
    pub fn list_online_users(&self) -> anyhow::Result<Vec<User>> {
        Ok(self.db.list_online_users()?.into_iter().map(User::from).collect())
    }

    pub fn get_user(&self, id: i64) -> anyhow::Result<Option<User>> {
        Ok(self.db.get_user_by_id(id)?.map(User::from))
    }

    pub fn list_messages(&self) -> anyhow::Result<Vec<Message>> {
        Ok(self.db.list_messages()?.into_iter().map(Message::from).collect())
    }

    pub fn get_message(&self, id: i64) -> anyhow::Result<Option<Message>> {
        Ok(self.db.get_message(id)?.map(Message::from))
    }

    /// Text outside 1..=100 chars is rejected, never truncated.
    pub fn post_message(&self, text: &str, author: &User) -> Result<Message, PostError> {
        validate_message_text(text)?;

        let timestamp = chrono::Utc::now().timestamp();
        let row = self
            .db
            .with_tx(|conn| queries::insert_message(conn, text, timestamp, author.id))?;

        debug!("Message {} posted by {}", row.id, author.name);
        Ok(row.into())
    }
}
