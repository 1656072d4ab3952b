use serde::{Deserialize, Serialize};

use crate::models::{Message, User};

/// Hypermedia placeholder; always serialized as `{}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Links {}

// -- Users --

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub online: bool,
    #[serde(rename = "_links")]
    pub links: Links,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            online: user.online,
            links: Links::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<UserResponse>,
}

/// The wire key is misspelled; existing clients read `onilne_users`.
#[derive(Debug, Serialize, Deserialize)]
pub struct OnlineUsersResponse {
    #[serde(rename = "onilne_users")]
    pub online_users: Vec<UserResponse>,
}

// -- Messages --

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: i64,
    pub timestamp: i64,
    pub text: String,
    #[serde(rename = "user.id")]
    pub user_id: Option<i64>,
    #[serde(rename = "_links")]
    pub links: Links,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            timestamp: message.timestamp,
            text: message.text,
            user_id: Some(message.user_id),
            links: Links::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessagesResponse {
    #[serde(rename = "Messages")]
    pub messages: Vec<MessageResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// -- Forms --

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct MessageForm {
    #[serde(default)]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_wire_shape() {
        let body = serde_json::to_value(UserResponse::from(User {
            id: 1,
            name: "alice".into(),
            online: true,
        }))
        .unwrap();
        assert_eq!(
            body,
            json!({ "id": 1, "name": "alice", "online": true, "_links": {} })
        );
    }

    #[test]
    fn message_wire_shape_uses_dotted_user_key() {
        let body = serde_json::to_value(MessageResponse::from(Message {
            id: 7,
            text: "hi".into(),
            timestamp: 1_700_000_000,
            user_id: 3,
        }))
        .unwrap();
        assert_eq!(
            body,
            json!({ "id": 7, "timestamp": 1_700_000_000, "text": "hi", "user.id": 3, "_links": {} })
        );
    }

    #[test]
    fn list_wrappers_keep_legacy_keys() {
        let online = serde_json::to_value(OnlineUsersResponse { online_users: vec![] }).unwrap();
        assert!(online.get("onilne_users").is_some());

        let messages = serde_json::to_value(MessagesResponse { messages: vec![] }).unwrap();
        assert!(messages.get("Messages").is_some());
    }
}
