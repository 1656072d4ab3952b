use std::sync::Arc;

use anyhow::anyhow;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use wech_db::{Database, queries};
use wech_types::models::{ANONYMOUS_NAME, User};

use crate::error::ApiError;
use crate::{AppState, blocking};

pub const SESSION_COOKIE: &str = "wech_session";

/// Who is behind the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Authenticated(User),
    /// No session; has no row in storage.
    Anonymous,
}

impl Principal {
    pub fn name(&self) -> &str {
        match self {
            Principal::Authenticated(user) => &user.name,
            Principal::Anonymous => ANONYMOUS_NAME,
        }
    }
}

/// An active login. Extracting one rejects anonymous requests with 401.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub user: User,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid name or password")]
    InvalidCredentials,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct AuthManager {
    db: Arc<Database>,
}

impl AuthManager {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Plaintext comparison against the first user with this name.
    pub fn authenticate(&self, name: &str, password: &str) -> Result<User, AuthError> {
        let row = self
            .db
            .get_user_by_name(name)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !row.verify_password(password) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(row.into())
    }

    /// Open a session for `user` and mark them online, in one transaction.
    ///
    /// `replaces` is the session the client presented, if any. It is
    /// dropped so re-logins don't pile up rows; if it belonged to someone
    /// else, that user is marked offline as on logout.
    pub fn login(&self, user: &User, replaces: Option<&str>) -> anyhow::Result<Session> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();

        let row = self.db.with_tx(|conn| {
            if let Some(old) = replaces {
                if let Some(old_user) = queries::session_user_id(conn, old)? {
                    queries::delete_session(conn, old)?;
                    if old_user != user.id {
                        queries::set_online(conn, old_user, false)?;
                    }
                }
            }
            queries::create_session(conn, &id, user.id, now)?;
            queries::set_online(conn, user.id, true)?;
            queries::query_user_by_id(conn, user.id)?
                .ok_or_else(|| anyhow!("User {} disappeared during login", user.id))
        })?;

        info!("User {} ({}) logged in", row.name, row.id);
        Ok(Session {
            id,
            user: row.into(),
        })
    }

    /// Clears the online flag even if the user has other live sessions.
    pub fn logout(&self, session: &Session) -> anyhow::Result<()> {
        self.db.with_tx(|conn| {
            queries::set_online(conn, session.user.id, false)?;
            queries::delete_session(conn, &session.id)?;
            Ok(())
        })?;

        info!("User {} ({}) logged out", session.user.name, session.user.id);
        Ok(())
    }

    pub fn current_principal(&self, session_id: Option<&str>) -> anyhow::Result<Principal> {
        let Some(session_id) = session_id else {
            return Ok(Principal::Anonymous);
        };

        Ok(match self.db.get_session_user(session_id)? {
            Some(row) => Principal::Authenticated(row.into()),
            None => {
                debug!("Unknown session id presented");
                Principal::Anonymous
            }
        })
    }
}

pub fn session_cookie(session_id: &str) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

fn session_id(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
}

async fn resolve(
    state: &AppState,
    session_id: Option<String>,
) -> Result<Principal, ApiError> {
    let state = state.clone();
    let principal = blocking(move || state.auth.current_principal(session_id.as_deref())).await??;
    Ok(principal)
}

impl FromRequestParts<AppState> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve(state, session_id(parts)).await
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(id) = session_id(parts) else {
            return Err(ApiError::Unauthorized);
        };

        match resolve(state, Some(id.clone())).await? {
            Principal::Authenticated(user) => Ok(Session { id, user }),
            Principal::Anonymous => Err(ApiError::Unauthorized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> (Arc<Database>, AuthManager) {
        let db = Arc::new(Database::open_in_memory().unwrap());
        db.create_user("alice", "123").unwrap();
        let auth = AuthManager::new(db.clone());
        (db, auth)
    }

    #[test]
    fn authenticate_checks_plaintext_password() {
        let (_db, auth) = manager();

        let user = auth.authenticate("alice", "123").unwrap();
        assert_eq!(user.name, "alice");

        assert!(matches!(
            auth.authenticate("alice", "nope"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.authenticate("mallory", "123"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn login_marks_user_online() {
        let (db, auth) = manager();
        let user = auth.authenticate("alice", "123").unwrap();
        assert!(!user.online);

        let session = auth.login(&user, None).unwrap();
        assert!(session.user.online);
        assert!(db.get_user_by_id(user.id).unwrap().unwrap().online);

        let principal = auth.current_principal(Some(&session.id)).unwrap();
        assert_eq!(principal, Principal::Authenticated(session.user.clone()));
        assert_eq!(principal.name(), "alice");
    }

    #[test]
    fn logout_clears_online_and_session() {
        let (db, auth) = manager();
        let user = auth.authenticate("alice", "123").unwrap();
        let session = auth.login(&user, None).unwrap();

        auth.logout(&session).unwrap();

        assert!(!db.get_user_by_id(user.id).unwrap().unwrap().online);
        let principal = auth.current_principal(Some(&session.id)).unwrap();
        assert_eq!(principal, Principal::Anonymous);
        assert_eq!(principal.name(), ANONYMOUS_NAME);
    }

    #[test]
    fn no_cookie_is_anonymous() {
        let (_db, auth) = manager();
        let principal = auth.current_principal(None).unwrap();
        assert_eq!(principal, Principal::Anonymous);
        assert_eq!(principal.name(), "No body");
    }

    #[test]
    fn concurrent_logins_both_succeed() {
        let (_db, auth) = manager();
        let user = auth.authenticate("alice", "123").unwrap();

        let first = auth.login(&user, None).unwrap();
        let second = auth.login(&user, None).unwrap();
        assert_ne!(first.id, second.id);
        assert!(matches!(
            auth.current_principal(Some(&first.id)).unwrap(),
            Principal::Authenticated(_)
        ));
        assert!(matches!(
            auth.current_principal(Some(&second.id)).unwrap(),
            Principal::Authenticated(_)
        ));
    }

    #[test]
    fn logout_of_one_session_clears_online_for_all() {
        let (db, auth) = manager();
        let user = auth.authenticate("alice", "123").unwrap();
        let first = auth.login(&user, None).unwrap();
        let second = auth.login(&user, None).unwrap();

        auth.logout(&first).unwrap();

        assert!(!db.get_user_by_id(user.id).unwrap().unwrap().online);
        assert_eq!(auth.current_principal(Some(&first.id)).unwrap(), Principal::Anonymous);
        assert!(matches!(
            auth.current_principal(Some(&second.id)).unwrap(),
            Principal::Authenticated(_)
        ));
    }

    #[test]
    fn relogin_replaces_presented_session() {
        let (_db, auth) = manager();
        let user = auth.authenticate("alice", "123").unwrap();
        let first = auth.login(&user, None).unwrap();

        let second = auth.login(&user, Some(&first.id)).unwrap();

        assert_eq!(auth.current_principal(Some(&first.id)).unwrap(), Principal::Anonymous);
        assert_eq!(
            auth.current_principal(Some(&second.id)).unwrap().name(),
            "alice"
        );
    }

    #[test]
    fn login_as_someone_else_signs_out_previous_user() {
        let (db, auth) = manager();
        let bob_id = db.create_user("bob", "456").unwrap();
        let alice = auth.authenticate("alice", "123").unwrap();
        let bob = auth.authenticate("bob", "456").unwrap();
        let alice_session = auth.login(&alice, None).unwrap();

        auth.login(&bob, Some(&alice_session.id)).unwrap();

        assert!(!db.get_user_by_id(alice.id).unwrap().unwrap().online);
        assert!(db.get_user_by_id(bob_id).unwrap().unwrap().online);
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie("abc");
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
    }
}
