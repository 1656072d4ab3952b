use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};

use wech_types::api::{
    MessageResponse, MessagesResponse, OnlineUsersResponse, UserResponse, UsersResponse,
};

use crate::error::ApiError;
use crate::{AppState, blocking};

pub async fn users(State(state): State<AppState>) -> Result<Json<UsersResponse>, ApiError> {
    let users = blocking(move || state.chat.list_users()).await??;

    Ok(Json(UsersResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
    }))
}

pub async fn online_users(
    State(state): State<AppState>,
) -> Result<Json<OnlineUsersResponse>, ApiError> {
    let users = blocking(move || state.chat.list_online_users()).await??;

    Ok(Json(OnlineUsersResponse {
        online_users: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// Non-numeric ids don't match the route.
fn numeric_id(id: Result<Path<i64>, PathRejection>, what: &'static str) -> Result<i64, ApiError> {
    id.map(|Path(id)| id).map_err(|_| ApiError::NotFound(what))
}

pub async fn user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = numeric_id(id, "user")?;
    let user = blocking(move || state.chat.get_user(id))
        .await??
        .ok_or(ApiError::NotFound("user"))?;

    Ok(Json(user.into()))
}

pub async fn messages(State(state): State<AppState>) -> Result<Json<MessagesResponse>, ApiError> {
    let messages = blocking(move || state.chat.list_messages()).await??;

    Ok(Json(MessagesResponse {
        messages: messages.into_iter().map(MessageResponse::from).collect(),
    }))
}

pub async fn message(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = numeric_id(id, "message")?;
    let message = blocking(move || state.chat.get_message(id))
        .await??
        .ok_or(ApiError::NotFound("message"))?;

    Ok(Json(message.into()))
}
