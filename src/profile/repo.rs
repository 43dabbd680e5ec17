use anyhow::Context;
use sqlx::SqlitePool;

use super::dto::Profile;

/// Load the profile of `user_id`, if the row exists.
pub async fn find_profile(db: &SqlitePool, user_id: i64) -> anyhow::Result<Option<Profile>> {
    // age has INTEGER affinity but may hold arbitrary text, so read it back as text
    let profile = sqlx::query_as::<_, Profile>(
        r#"
        SELECT username, email, name, CAST(age AS TEXT) AS age, bio, profile_picture
          FROM users
         WHERE id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("load profile")?;

    Ok(profile)
}

/// Overwrite the editable profile columns of `user_id`.
pub async fn update_profile(
    db: &SqlitePool,
    user_id: i64,
    name: &str,
    age: &str,
    bio: &str,
    picture_path: &str,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE users
           SET name = ?, age = ?, bio = ?, profile_picture = ?
         WHERE id = ?
        "#,
    )
    .bind(name)
    .bind(age)
    .bind(bio)
    .bind(picture_path)
    .bind(user_id)
    .execute(db)
    .await
    .context("update profile")?;

    Ok(())
}
