use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use sqlx::FromRow;
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to Database) ---

/// Admin
///
/// A row of the `admins` table. The only privileged role, and the author of posts.
/// The bcrypt hash is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Admin {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// Post
///
/// A row of the `posts` table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    // Set by the database on insertion, never updated.
    pub created_at: NaiveDateTime,
    pub likes: i64,
    // Weak reference to `admins.id`.
    pub author_id: Option<i64>,
}

/// PostDetail
///
/// A post left-joined with its author's username, as shown on the post page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct PostDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub post: Post,
    pub author_username: Option<String>,
}

// --- Request Payloads (urlencoded forms) ---
//
// Every field defaults to an empty string so a missing field fails validation
// instead of rejecting the whole request.

/// RegisterForm
///
/// Body of `POST /register`.
#[derive(Debug, Clone, Deserialize, ToSchema, Default)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// LoginForm
///
/// Body of `POST /login`.
#[derive(Debug, Clone, Deserialize, ToSchema, Default)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// PostForm
///
/// Body of both `POST /admin/create-post` and `POST /admin/posts/{id}`.
#[derive(Debug, Clone, Deserialize, ToSchema, Default)]
#[serde(default)]
pub struct PostForm {
    pub title: String,
    pub content: String,
}

// --- Path Parameters ---

/// PostId
///
/// The `{id}` segment of a post route. A segment that is not a valid `i64`
/// (`abc`, or a number out of range) cannot name a row, so it extracts as
/// `PostId(None)` and the handler treats it like an id with no post behind it.
/// Extraction never rejects, which keeps the like handler's 401 ahead of any
/// id problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostId(pub Option<i64>);

impl PostId {
    pub fn get(self) -> Option<i64> {
        self.0
    }
}

impl From<i64> for PostId {
    fn from(id: i64) -> Self {
        PostId(Some(id))
    }
}

impl<S> FromRequestParts<S> for PostId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let id = Path::<String>::from_request_parts(parts, state)
            .await
            .ok()
            .and_then(|Path(raw)| raw.parse::<i64>().ok());
        Ok(PostId(id))
    }
}
