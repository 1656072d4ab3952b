pub mod api;
pub mod chat;
pub mod error;
pub mod html;
pub mod pages;
pub mod session;

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;
use tracing::error;

use wech_db::Database;

use crate::chat::ChatService;
use crate::error::ApiError;
use crate::session::AuthManager;

pub type AppState = Arc<AppStateInner>;

/// Services shared by every handler, built once at startup.
pub struct AppStateInner {
    pub auth: AuthManager,
    pub chat: ChatService,
}

impl AppStateInner {
    pub fn new(db: Arc<Database>) -> AppState {
        Arc::new(Self {
            auth: AuthManager::new(db.clone()),
            chat: ChatService::new(db),
        })
    }
}

pub fn router(state: AppState) -> Router {
    let pages = Router::new()
        .route("/", get(pages::index))
        .route("/login", get(pages::login_form).post(pages::login))
        .route("/logout", get(pages::logout))
        .route("/whosin", get(pages::who_logged_in))
        .route("/whosonline", get(pages::who_is_online))
        .route("/chat", get(pages::chat).post(pages::post_chat))
        .route("/get/online_users", get(pages::online_users_fragment));

    let json_api = Router::new()
        .route("/api/users", get(api::users))
        .route("/api/online_users", get(api::online_users))
        .route("/api/users/{id}", get(api::user))
        .route("/api/messages", get(api::messages))
        .route("/api/messages/{id}", get(api::message))
        .layer(CorsLayer::permissive());

    Router::new().merge(pages).merge(json_api).with_state(state)
}

/// Run blocking SQLite work off the async runtime.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(anyhow::anyhow!("blocking task failed: {}", e))
    })
}
