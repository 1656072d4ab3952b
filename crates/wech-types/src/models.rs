use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Display name of the principal behind a request with no session.
pub const ANONYMOUS_NAME: &str = "No body";

/// Password given to seeded users that don't specify one.
pub const DEFAULT_PASSWORD: &str = "123";

/// Longest message text accepted, in characters.
pub const MAX_MESSAGE_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub online: bool,
}

/// Chat messages are immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub text: String,
    /// Unix seconds, stamped when the message was posted.
    pub timestamp: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MessageTextError {
    #[error("Field must be between 1 and {max} characters long.", max = MAX_MESSAGE_LEN)]
    Length { len: usize },
}

/// Length is counted in chars, so multi-byte text isn't penalised.
pub fn validate_message_text(text: &str) -> Result<(), MessageTextError> {
    let len = text.chars().count();
    if len == 0 || len > MAX_MESSAGE_LEN {
        return Err(MessageTextError::Length { len });
    }
    Ok(())
}
