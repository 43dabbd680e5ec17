use crate::auth::repo_types::{CreateUserError, User};
use sqlx::SqlitePool;

impl User {
    /// Find a user by email. Email is unique, so at most one row matches.
    pub async fn find_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    /// Insert a new account and return its id. A duplicate username or email maps to `Taken`.
    pub async fn create(
        db: &SqlitePool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i64, CreateUserError> {
        let done = sqlx::query(
            r#"
            INSERT INTO users (username, email, password)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .execute(db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                CreateUserError::Taken
            }
            other => CreateUserError::Database(other),
        })?;
        Ok(done.last_insert_rowid())
    }
}
