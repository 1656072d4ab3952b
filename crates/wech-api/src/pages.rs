use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use wech_types::api::{LoginForm, MessageForm};
use wech_types::models::Message;

use crate::chat::PostError;
use crate::error::ApiError;
use crate::html::{self, ChatView};
use crate::session::{
    AuthError, Principal, SESSION_COOKIE, Session, removal_cookie, session_cookie,
};
use crate::{AppState, blocking};

pub async fn index() -> &'static str {
    "Wech, World!"
}

pub async fn login_form(principal: Principal) -> Html<String> {
    Html(html::login_page(&principal, "", None))
}

pub async fn login(
    State(state): State<AppState>,
    principal: Principal,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    if form.name.trim().is_empty() {
        let page = html::login_page(&principal, &form.name, Some("Name is required."));
        return Ok(Html(page).into_response());
    }

    let name = form.name.clone();
    let previous = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let outcome = blocking(move || {
        let user = state.auth.authenticate(&form.name, &form.password)?;
        Ok::<_, AuthError>(state.auth.login(&user, previous.as_deref())?)
    })
    .await?;

    match outcome {
        Ok(session) => {
            let jar = jar.add(session_cookie(&session.id));
            Ok((jar, Redirect::to("/whosin")).into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            warn!("Failed login for '{}'", name);
            Ok("login unsuccessfull".into_response())
        }
        Err(AuthError::Storage(e)) => Err(e.into()),
    }
}

pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    blocking(move || state.auth.logout(&session)).await??;

    Ok((jar.remove(removal_cookie()), Redirect::to("/")))
}

pub async fn who_logged_in(session: Session) -> String {
    format!("The user logged in is: {}", session.user.name)
}

pub async fn who_is_online(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Html<String>, ApiError> {
    let users = blocking(move || state.chat.list_online_users()).await??;

    Ok(Html(html::whos_online_page(&principal, &users)))
}

pub async fn chat(
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, ApiError> {
    render_chat(state, session, String::new(), None).await
}

pub async fn post_chat(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<MessageForm>,
) -> Result<Response, ApiError> {
    let chat = state.chat.clone();
    let author = session.user.clone();
    let text = form.text.clone();
    let posted = blocking(move || chat.post_message(&text, &author)).await?;

    match posted {
        Ok(_) => Ok(Redirect::to("/chat").into_response()),
        Err(PostError::Invalid(e)) => {
            let page = render_chat(state, session, form.text, Some(e.to_string())).await?;
            Ok(page.into_response())
        }
        Err(PostError::Storage(e)) => Err(e.into()),
    }
}

pub async fn online_users_fragment() -> Html<&'static str> {
    Html(html::online_users_fragment())
}

async fn render_chat(
    state: AppState,
    session: Session,
    draft: String,
    error: Option<String>,
) -> Result<Html<String>, ApiError> {
    let (online, users, messages) = blocking(move || {
        let online = state.chat.list_online_users()?;
        let users = state.chat.list_users()?;
        let messages: Vec<Message> = state.chat.list_messages()?;
        Ok::<_, anyhow::Error>((online, users, messages))
    })
    .await??;

    let view = ChatView {
        online: &online,
        users: &users,
        messages: &messages,
        draft: &draft,
        error: error.as_deref(),
    };
    Ok(Html(html::chat_page(&Principal::Authenticated(session.user), &view)))
}
