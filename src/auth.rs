use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

/// Name of the cookie carrying the identity token.
pub const TOKEN_COOKIE: &str = "token";

/// Claims
///
/// Payload of the identity token. Signed with the server's secret and checked on
/// every request by `resolve_identity`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Expiration Time (exp): seconds since the epoch after which the token is void.
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
    /// Primary key of the admin in the `admins` table.
    pub id: i64,
    pub username: String,
}

/// Signs a token for the admin, valid for `ttl_hours` from now.
pub fn issue_token(
    id: i64,
    username: &str,
    secret: &str,
    ttl_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        exp: (now + Duration::hours(ttl_hours)).timestamp() as usize,
        iat: now.timestamp() as usize,
        id,
        username: username.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// verify_token
///
/// Decodes and validates signature and expiry. Any failure (malformed, expired,
/// wrong signature) collapses to `None`: callers treat it as "no token".
pub fn verify_token(token: &str, secret: &str) -> Option<Claims> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    // Expiry is exact; the default 60s grace would keep stale tokens alive.
    validation.leeway = 0;

    match decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            tracing::debug!(reason = ?e.kind(), "identity token rejected");
            None
        }
    }
}

/// Builds the identity cookie: http-only, same-site strict, `Secure` in production.
pub fn token_cookie(token: String, config: &AppConfig) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(config.secure_cookies())
        .max_age(time::Duration::hours(config.token_ttl_hours))
        .build()
}

/// Cookie shape used to clear the identity cookie on logout.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE).path("/").build()
}

/// AuthContext
///
/// Who is making the request. Resolved once per request by `resolve_identity` and
/// handed to handlers as an ordinary extractor argument.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthContext {
    Authenticated { id: i64, username: String },
    #[default]
    Anonymous,
}

impl AuthContext {
    pub fn from_claims(claims: Claims) -> Self {
        AuthContext::Authenticated {
            id: claims.id,
            username: claims.username,
        }
    }

    /// Reads the identity cookie from a jar. Never fails.
    pub fn from_jar(jar: &CookieJar, secret: &str) -> Self {
        jar.get(TOKEN_COOKIE)
            .and_then(|cookie| verify_token(cookie.value(), secret))
            .map(Self::from_claims)
            .unwrap_or(AuthContext::Anonymous)
    }

    pub fn admin(&self) -> Option<AdminSession> {
        match self {
            AuthContext::Authenticated { id, username } => Some(AdminSession {
                id: *id,
                username: username.clone(),
            }),
            AuthContext::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthContext::Authenticated { .. })
    }
}

/// AuthContext Extractor
///
/// Reads the context stored by `resolve_identity`. Infallible: a request that never
/// went through the middleware is simply anonymous.
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .unwrap_or_default())
    }
}

/// AdminSession
///
/// The authenticated admin, for routes that cannot run anonymously. Extracting it
/// from an anonymous request redirects the browser to the login page.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminSession {
    pub id: i64,
    pub username: String,
}

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .and_then(AuthContext::admin)
            .ok_or_else(|| Redirect::to("/login"))
    }
}

/// resolve_identity
///
/// Global middleware: verifies the identity cookie and stores the resulting
/// `AuthContext` in the request extensions. Token problems are not errors, they
/// demote the request to anonymous.
pub async fn resolve_identity(
    State(config): State<AppConfig>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let context = AuthContext::from_jar(&jar, &config.jwt_secret);
    request.extensions_mut().insert(context);
    next.run(request).await
}

/// require_admin
///
/// Route layer for the admin router. Rejection happens in the `AdminSession`
/// extractor, before the handler runs.
pub async fn require_admin(_admin: AdminSession, request: Request, next: Next) -> Response {
    next.run(request).await
}
