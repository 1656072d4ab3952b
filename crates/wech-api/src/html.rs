//! Server-rendered markup for the chat pages.

use std::collections::HashMap;
use std::fmt::Write;

use wech_types::models::{MAX_MESSAGE_LEN, Message, User};

use crate::session::Principal;

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, principal: &Principal, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n\
         <nav><span class=\"principal\">{name}</span></nav>\n\
         {body}\n\
         </body>\n\
         </html>\n",
        title = escape(title),
        name = escape(principal.name()),
    )
}

fn error_line(error: Option<&str>) -> String {
    error
        .map(|e| format!("<p class=\"error\">{}</p>\n", escape(e)))
        .unwrap_or_default()
}

fn user_list(users: &[User]) -> String {
    let mut out = String::from("<ul class=\"online-users\">\n");
    for user in users {
        let _ = writeln!(out, "<li>{}</li>", escape(&user.name));
    }
    out.push_str("</ul>");
    out
}

pub fn login_page(principal: &Principal, name: &str, error: Option<&str>) -> String {
    let body = format!(
        "<h1>Login</h1>\n\
         {error}\
         <form method=\"post\" action=\"/login\">\n\
         <label>Name <input type=\"text\" name=\"name\" value=\"{name}\"></label>\n\
         <label>Password <input type=\"password\" name=\"password\"></label>\n\
         <input type=\"submit\" value=\"Login\">\n\
         </form>",
        error = error_line(error),
        name = escape(name),
    );
    layout("Login", principal, &body)
}

pub fn whos_online_page(principal: &Principal, users: &[User]) -> String {
    let body = format!("<h1>Who is online</h1>\n{}", user_list(users));
    layout("Who is online", principal, &body)
}

pub struct ChatView<'a> {
    pub online: &'a [User],
    pub users: &'a [User],
    pub messages: &'a [Message],
    pub draft: &'a str,
    pub error: Option<&'a str>,
}

pub fn chat_page(principal: &Principal, view: &ChatView<'_>) -> String {
    let names: HashMap<i64, &str> = view.users.iter().map(|u| (u.id, u.name.as_str())).collect();

    let mut log = String::from("<ol class=\"messages\">\n");
    for message in view.messages {
        let author = names.get(&message.user_id).copied().unwrap_or("unknown");
        let _ = writeln!(
            log,
            "<li data-timestamp=\"{}\"><b>{}</b>: {}</li>",
            message.timestamp,
            escape(author),
            escape(&message.text),
        );
    }
    log.push_str("</ol>");

    let body = format!(
        "<h1>Chat</h1>\n\
         <h2>Online</h2>\n{online}\n\
         <h2>Messages</h2>\n{log}\n\
         {error}\
         <form method=\"post\" action=\"/chat\">\n\
         <input type=\"text\" name=\"text\" maxlength=\"{max}\" value=\"{draft}\">\n\
         <input type=\"submit\" value=\"Envoyer\">\n\
         </form>",
        online = user_list(view.online),
        error = error_line(view.error),
        max = MAX_MESSAGE_LEN,
        draft = escape(view.draft),
    );
    layout("Chat", principal, &body)
}

/// Placeholder the chat page polls into; holds no data of its own.
pub fn online_users_fragment() -> &'static str {
    "<div id=\"online-users\">\n<h2>Online users</h2>\n<ul class=\"online-users\"></ul>\n</div>\n"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape("<b>\"tom\" & 'jerry'</b>"),
            "&lt;b&gt;&quot;tom&quot; &amp; &#x27;jerry&#x27;&lt;/b&gt;"
        );
    }

    #[test]
    fn chat_page_escapes_message_text() {
        let users = vec![User { id: 1, name: "alice".into(), online: true }];
        let messages = vec![Message {
            id: 1,
            text: "<script>".into(),
            timestamp: 5,
            user_id: 1,
        }];
        let page = chat_page(
            &Principal::Authenticated(users[0].clone()),
            &ChatView {
                online: &users,
                users: &users,
                messages: &messages,
                draft: "",
                error: None,
            },
        );
        assert!(page.contains("<b>alice</b>: &lt;script&gt;"));
        assert!(!page.contains("<script>"));
    }

    #[test]
    fn anonymous_layout_shows_placeholder_name() {
        let page = whos_online_page(&Principal::Anonymous, &[]);
        assert!(page.contains("No body"));
    }
}
