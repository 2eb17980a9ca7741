use crate::models::{Admin, Post, PostDetail};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, allowing the handlers
/// to interact with the data layer without knowing the concrete implementation
/// (SQLite, or a mock in tests).
///
/// Every method surfaces the driver error instead of swallowing it: a failed store
/// operation fails the request that issued it and nothing else.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Post Retrieval ---
    // Every post, newest first.
    async fn list_posts(&self) -> Result<Vec<Post>, sqlx::Error>;
    // Posts written by one admin, newest first.
    async fn list_posts_by_author(&self, author_id: i64) -> Result<Vec<Post>, sqlx::Error>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, sqlx::Error>;
    // Post joined with its author's username (if the author still resolves).
    async fn get_post_detail(&self, id: i64) -> Result<Option<PostDetail>, sqlx::Error>;

    // --- Post Actions ---
    async fn create_post(&self, title: &str, content: &str, author_id: i64) -> Result<Post, sqlx::Error>;
    // Returns false when no row has that id.
    async fn update_post(&self, id: i64, title: &str, content: &str) -> Result<bool, sqlx::Error>;
    // Returns false when no row has that id.
    async fn delete_post(&self, id: i64) -> Result<bool, sqlx::Error>;
    // Single-statement increment. Returns false when no row has that id.
    async fn like_post(&self, id: i64) -> Result<bool, sqlx::Error>;

    // --- Admins ---
    async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, sqlx::Error>;
    async fn create_admin(&self, username: &str, email: &str, password_hash: &str) -> Result<Admin, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// SqliteRepository
///
/// The concrete implementation of the `Repository` trait, backed by SQLite.
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const POST_COLUMNS: &str = "id, title, content, created_at, likes, author_id";

#[async_trait]
impl Repository for SqliteRepository {
    /// list_posts
    ///
    /// No pagination: the home page shows every post.
    async fn list_posts(&self) -> Result<Vec<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn list_posts_by_author(&self, author_id: i64) -> Result<Vec<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE author_id = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// get_post_detail
    ///
    /// LEFT JOIN so a post whose author no longer resolves is still shown.
    async fn get_post_detail(&self, id: i64) -> Result<Option<PostDetail>, sqlx::Error> {
        sqlx::query_as::<_, PostDetail>(
            r#"
            SELECT
                posts.id, posts.title, posts.content, posts.created_at,
                posts.likes, posts.author_id,
                admins.username AS author_username
            FROM posts
            LEFT JOIN admins ON posts.author_id = admins.id
            WHERE posts.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_post(&self, title: &str, content: &str, author_id: i64) -> Result<Post, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!(
            "INSERT INTO posts (title, content, author_id) VALUES (?, ?, ?) RETURNING {POST_COLUMNS}"
        ))
        .bind(title)
        .bind(content)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_post(&self, id: i64, title: &str, content: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE posts SET title = ?, content = ? WHERE id = ?")
            .bind(title)
            .bind(content)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_post(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// like_post
    ///
    /// The increment happens inside SQLite, so concurrent likes never lose updates.
    async fn like_post(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE posts SET likes = likes + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// find_admin_by_email
    ///
    /// Exact, case-sensitive match on the stored email.
    async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, sqlx::Error> {
        sqlx::query_as::<_, Admin>("SELECT id, username, email, password FROM admins WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_admin(&self, username: &str, email: &str, password_hash: &str) -> Result<Admin, sqlx::Error> {
        sqlx::query_as::<_, Admin>(
            "INSERT INTO admins (username, email, password) VALUES (?, ?, ?) RETURNING id, username, email, password",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
    }
}
