use anyhow::Context;
use tracing::info;

use super::{dto::ProfileUpdate, repo};
use crate::state::AppState;

/// Placeholder shown until a user uploads a picture.
pub const DEFAULT_PICTURE: &str = "static/images/default.jpg";

/// Storage key of a user's picture, relative to the static directory.
pub fn picture_key(user_id: i64) -> String {
    format!("images/{}_profile.jpg", user_id)
}

/// Public path of a user's picture, as stored in `users.profile_picture`.
pub fn picture_path(user_id: i64) -> String {
    format!("static/{}", picture_key(user_id))
}

/// Saves the submitted profile. A submission without a file resets the picture to the placeholder.
pub async fn apply_update(st: &AppState, user_id: i64, update: ProfileUpdate) -> anyhow::Result<String> {
    let stored_picture = match update.picture {
        Some(body) => {
            let key = picture_key(user_id);
            st.storage
                .put_object(&key, body)
                .await
                .with_context(|| format!("store picture {}", key))?;
            picture_path(user_id)
        }
        None => DEFAULT_PICTURE.to_string(),
    };

    repo::update_profile(
        &st.db,
        user_id,
        &update.name,
        &update.age,
        &update.bio,
        &stored_picture,
    )
    .await?;

    info!(user_id, picture = %stored_picture, "profile updated");
    Ok(stored_picture)
}
