use bytes::Bytes;
use sqlx::FromRow;

use super::services::DEFAULT_PICTURE;

/// What the profile page shows for one user.
#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub age: Option<String>, // kept verbatim; the column is never validated
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
}

impl Profile {
    pub fn picture(&self) -> &str {
        self.profile_picture.as_deref().unwrap_or(DEFAULT_PICTURE)
    }
}

/// A submitted profile form. `picture` is `None` when no file was chosen.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub name: String,
    pub age: String,
    pub bio: String,
    pub picture: Option<Bytes>,
}
