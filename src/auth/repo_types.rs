use sqlx::FromRow;

/// Credentials slice of a `users` row.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[sqlx(rename = "password")]
    pub password_hash: String, // Argon2 PHC string
}

#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error("username or email already exists")]
    Taken,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
