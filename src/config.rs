use std::env;

/// AppConfig
///
/// Holds the application's entire configuration state. It is loaded once at startup,
/// never mutated afterwards, and pulled into handlers and extractors via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // SQLite connection string, e.g. `sqlite:blog.db` or `sqlite::memory:`.
    pub db_url: String,
    // Host and port the HTTP listener binds to.
    pub host: String,
    pub port: u16,
    // Runtime environment marker. Controls the cookie `Secure` flag and log format.
    pub env: Env,
    // Shared HMAC secret used to sign and verify identity tokens.
    pub jwt_secret: String,
    // bcrypt work factor applied when hashing new passwords.
    pub bcrypt_cost: u32,
    // Lifetime of an issued identity token (and of its cookie).
    pub token_ttl_hours: i64,
}

/// Env
///
/// Defines the runtime context. Only `Production` marks the identity cookie as
/// `Secure` and switches logging to JSON.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

pub const DEFAULT_DB_URL: &str = "sqlite:blog.db";
pub const LOCAL_JWT_SECRET: &str = "inkblog-local-development-secret";
pub const DEFAULT_BCRYPT_COST: u32 = 10;

impl Default for AppConfig {
    /// default
    ///
    /// Provides a safe, non-panicking AppConfig primarily used for test setup.
    /// The bcrypt cost is the minimum the algorithm accepts so tests stay fast.
    fn default() -> Self {
        Self {
            db_url: "sqlite::memory:".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            bcrypt_cost: 4,
            token_ttl_hours: 24,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads all parameters from environment variables.
    ///
    /// # Panics
    /// Panics if `JWT_SECRET` is missing while `APP_ENV=production`, or if a numeric
    /// variable is set but cannot be parsed. The server refuses to start with an
    /// insecure or half-parsed configuration.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match env {
            Env::Production => env::var("JWT_SECRET")
                .expect("FATAL: JWT_SECRET must be set in production."),
            Env::Local => env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
        };

        Self {
            db_url: env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DB_URL.to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 3000),
            env,
            jwt_secret,
            bcrypt_cost: parse_var("BCRYPT_COST", DEFAULT_BCRYPT_COST),
            token_ttl_hours: parse_var("TOKEN_TTL_HOURS", 24),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Identity cookies only carry the `Secure` attribute in production.
    pub fn secure_cookies(&self) -> bool {
        self.env == Env::Production
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("FATAL: {key} has an invalid value: {raw}")),
        Err(_) => default,
    }
}
