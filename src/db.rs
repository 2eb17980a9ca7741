use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use std::str::FromStr;

const CREATE_ADMINS: &str = r#"
    CREATE TABLE IF NOT EXISTS admins (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL
    )
"#;

const CREATE_POSTS: &str = r#"
    CREATE TABLE IF NOT EXISTS posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        likes INTEGER NOT NULL DEFAULT 0 CHECK (likes >= 0),
        author_id INTEGER,
        FOREIGN KEY (author_id) REFERENCES admins(id)
    )
"#;

/// connect
///
/// Opens the SQLite pool in write-ahead-log mode so readers never block the writer.
/// An in-memory database only lives as long as its connection, so those URLs get a
/// single connection that is never recycled by the pool.
pub async fn connect(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(db_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool_options = if db_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    pool_options.connect_with(options).await
}

/// create_schema
///
/// Idempotently creates both relations inside one transaction, so a crash
/// mid-way never leaves only one of them behind.
pub async fn create_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query(CREATE_ADMINS).execute(&mut *tx).await?;
    sqlx::query(CREATE_POSTS).execute(&mut *tx).await?;
    tx.commit().await?;

    tracing::debug!("database schema ready");
    Ok(())
}

/// Connects and prepares the schema in one step.
pub async fn init(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let pool = connect(db_url).await?;
    create_schema(&pool).await?;
    Ok(pool)
}
