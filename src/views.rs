//! View models and their HTML rendering.
//!
//! Handlers build one of the view structs below and wrap it in `Page`; rendering
//! is plain string assembly. Every piece of stored or user-supplied text goes
//! through `escape_html`. The only exception is `PostView::rendered_content`,
//! which is markdown output built from sanitized content.
//!
//! Post titles and content are stored as sanitizer output, which is already
//! entity-encoded (`&` is kept as `&amp;`). `stored_text` decodes that once
//! before escaping, so the page shows what the author typed.

use axum::response::{Html, IntoResponse, Response};
use html_escape::decode_html_entities;
use std::fmt::Write;

use crate::{
    auth::{AdminSession, AuthContext},
    models::{Post, PostDetail},
};

pub trait View {
    fn title(&self) -> String;
    fn auth(&self) -> &AuthContext;
    fn body(&self) -> String;
}

/// Renders a `View` inside the shared layout.
pub struct Page<V>(pub V);

impl<V: View> Page<V> {
    pub fn render(&self) -> String {
        let view = &self.0;
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n{nav}\n<main>\n{body}\n</main>\n</body>\n</html>\n",
            title = escape_html(&view.title()),
            nav = render_nav(view.auth()),
            body = view.body(),
        )
    }
}

impl<V: View> IntoResponse for Page<V> {
    fn into_response(self) -> Response {
        Html(self.render()).into_response()
    }
}

pub fn escape_html(input: &str) -> String {
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

/// Escapes sanitizer output for display without encoding its entities twice.
pub fn stored_text(stored: &str) -> String {
    escape_html(&decode_html_entities(stored))
}

fn render_nav(auth: &AuthContext) -> String {
    match auth {
        AuthContext::Authenticated { username, .. } => format!(
            "<nav><a href=\"/\">Home</a> | <a href=\"/admin\">Dashboard</a> | {} | <a href=\"/logout\">Log out</a></nav>",
            escape_html(username)
        ),
        AuthContext::Anonymous => {
            "<nav><a href=\"/\">Home</a> | <a href=\"/login\">Log in</a> | <a href=\"/register\">Register</a></nav>"
                .to_string()
        }
    }
}

fn render_errors(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let mut out = String::from("<ul class=\"errors\">");
    for error in errors {
        let _ = write!(out, "<li>{}</li>", escape_html(error));
    }
    out.push_str("</ul>");
    out
}

fn render_post_list(posts: &[Post], with_controls: bool) -> String {
    if posts.is_empty() {
        return "<p>No posts yet.</p>".to_string();
    }
    let mut out = String::from("<ul class=\"posts\">");
    for post in posts {
        let _ = write!(
            out,
            "<li><a href=\"/posts/{id}\">{title}</a> <small>{created} · {likes} likes</small>",
            id = post.id,
            title = stored_text(&post.title),
            created = post.created_at.format("%Y-%m-%d %H:%M"),
            likes = post.likes,
        );
        if with_controls {
            let _ = write!(
                out,
                " <a href=\"/admin/posts/{id}/edit\">Edit</a> \
                 <form method=\"post\" action=\"/admin/posts/{id}/delete\" style=\"display:inline\">\
                 <button type=\"submit\">Delete</button></form>",
                id = post.id
            );
        }
        out.push_str("</li>");
    }
    out.push_str("</ul>");
    out
}

/// GET /
pub struct HomeView {
    pub auth: AuthContext,
    pub posts: Vec<Post>,
}

impl View for HomeView {
    fn title(&self) -> String {
        "Blog".to_string()
    }
    fn auth(&self) -> &AuthContext {
        &self.auth
    }
    fn body(&self) -> String {
        format!("<h1>Latest posts</h1>\n{}", render_post_list(&self.posts, false))
    }
}

/// GET /posts/{id}
pub struct PostView {
    pub auth: AuthContext,
    pub post: PostDetail,
    pub rendered_content: String,
}

impl View for PostView {
    fn title(&self) -> String {
        decode_html_entities(&self.post.post.title).into_owned()
    }
    fn auth(&self) -> &AuthContext {
        &self.auth
    }
    fn body(&self) -> String {
        let post = &self.post.post;
        let author = self.post.author_username.as_deref().unwrap_or("unknown");
        let like = if self.auth.is_authenticated() {
            format!(
                "<form method=\"post\" action=\"/posts/{}/like\"><button type=\"submit\">Like</button></form>",
                post.id
            )
        } else {
            String::new()
        };
        format!(
            "<article>\n<h1>{title}</h1>\n<p><small>by {author} on {created} · {likes} likes</small></p>\n<div class=\"content\">{content}</div>\n{like}\n</article>",
            title = stored_text(&post.title),
            author = escape_html(author),
            created = post.created_at.format("%Y-%m-%d %H:%M"),
            likes = post.likes,
            content = self.rendered_content,
        )
    }
}

/// GET /admin
pub struct DashboardView {
    pub auth: AuthContext,
    pub admin: AdminSession,
    pub posts: Vec<Post>,
}

impl View for DashboardView {
    fn title(&self) -> String {
        "Dashboard".to_string()
    }
    fn auth(&self) -> &AuthContext {
        &self.auth
    }
    fn body(&self) -> String {
        format!(
            "<h1>Welcome, {}</h1>\n<p><a href=\"/admin/posts/new\">New post</a></p>\n{}",
            escape_html(&self.admin.username),
            render_post_list(&self.posts, true)
        )
    }
}

/// GET|POST /login
pub struct LoginView {
    pub auth: AuthContext,
    pub errors: Vec<String>,
}

impl View for LoginView {
    fn title(&self) -> String {
        "Log in".to_string()
    }
    fn auth(&self) -> &AuthContext {
        &self.auth
    }
    fn body(&self) -> String {
        format!(
            "<h1>Log in</h1>\n{}\n<form method=\"post\" action=\"/login\">\
             <label>Email <input type=\"email\" name=\"email\"></label>\
             <label>Password <input type=\"password\" name=\"password\"></label>\
             <button type=\"submit\">Log in</button></form>",
            render_errors(&self.errors)
        )
    }
}

/// GET|POST /register
pub struct RegisterView {
    pub auth: AuthContext,
    pub errors: Vec<String>,
}

impl View for RegisterView {
    fn title(&self) -> String {
        "Register".to_string()
    }
    fn auth(&self) -> &AuthContext {
        &self.auth
    }
    fn body(&self) -> String {
        format!(
            "<h1>Register</h1>\n{}\n<form method=\"post\" action=\"/register\">\
             <label>Username <input type=\"text\" name=\"username\"></label>\
             <label>Email <input type=\"email\" name=\"email\"></label>\
             <label>Password <input type=\"password\" name=\"password\"></label>\
             <button type=\"submit\">Register</button></form>",
            render_errors(&self.errors)
        )
    }
}

/// GET /admin/posts/new, and POST /admin/create-post on validation failure.
/// Submitted values are not echoed back.
pub struct CreatePostView {
    pub auth: AuthContext,
    pub errors: Vec<String>,
}

impl View for CreatePostView {
    fn title(&self) -> String {
        "New post".to_string()
    }
    fn auth(&self) -> &AuthContext {
        &self.auth
    }
    fn body(&self) -> String {
        format!(
            "<h1>New post</h1>\n{}\n<form method=\"post\" action=\"/admin/create-post\">\
             <label>Title <input type=\"text\" name=\"title\"></label>\
             <label>Content <textarea name=\"content\"></textarea></label>\
             <button type=\"submit\">Publish</button></form>",
            render_errors(&self.errors)
        )
    }
}

/// GET /admin/posts/{id}/edit, and POST /admin/posts/{id} on validation failure.
pub struct EditPostView {
    pub auth: AuthContext,
    pub post: Post,
    pub errors: Vec<String>,
}

impl View for EditPostView {
    fn title(&self) -> String {
        format!("Edit: {}", decode_html_entities(&self.post.title))
    }
    fn auth(&self) -> &AuthContext {
        &self.auth
    }
    fn body(&self) -> String {
        format!(
            "<h1>Edit post</h1>\n{errors}\n<form method=\"post\" action=\"/admin/posts/{id}\">\
             <label>Title <input type=\"text\" name=\"title\" value=\"{title}\"></label>\
             <label>Content <textarea name=\"content\">{content}</textarea></label>\
             <button type=\"submit\">Save</button></form>",
            errors = render_errors(&self.errors),
            id = self.post.id,
            title = stored_text(&self.post.title),
            content = stored_text(&self.post.content),
        )
    }
}
