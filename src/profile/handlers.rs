use axum::{
    extract::{DefaultBodyLimit, FromRef, Multipart, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use tracing::{instrument, warn};

use super::{dto::ProfileUpdate, repo, services};
use crate::{
    auth::{
        extractors::{AuthUser, Flashes},
        session::{html_page, set_cookies, Flash, SessionKeys, SESSION_COOKIE},
    },
    error::AppError,
    state::AppState,
    views,
};

pub fn profile_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/profile", get(show_profile).post(update_profile))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

#[instrument(skip(state, flashes))]
pub async fn show_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Flashes(flashes): Flashes,
) -> Result<Response, AppError> {
    render_profile(&state, user_id, flashes).await
}

/// POST /profile (multipart): fields name, age, bio and an optional file profile_picture.
#[instrument(skip(state, flashes, mp))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Flashes(flashes): Flashes,
    mp: Multipart,
) -> Result<Response, AppError> {
    let update = read_profile_form(mp).await?;
    services::apply_update(&state, user_id, update).await?;
    render_profile(&state, user_id, flashes).await
}

async fn render_profile(
    state: &AppState,
    user_id: i64,
    flashes: Vec<Flash>,
) -> Result<Response, AppError> {
    let keys = SessionKeys::from_ref(state);
    match repo::find_profile(&state.db, user_id).await? {
        Some(profile) => Ok(html_page(
            &keys,
            !flashes.is_empty(),
            views::profile_page(&flashes, &profile),
        )),
        None => {
            warn!(user_id, "session refers to a missing user, clearing it");
            Ok((
                set_cookies(vec![keys.clear_cookie(SESSION_COOKIE)]),
                Redirect::to("/login"),
            )
                .into_response())
        }
    }
}

async fn read_profile_form(mut mp: Multipart) -> Result<ProfileUpdate, AppError> {
    let (mut name, mut age, mut bio, mut picture) = (None, None, None, None);

    while let Some(field) = mp.next_field().await? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();
        match field_name.as_str() {
            "name" => name = Some(field.text().await?),
            "age" => age = Some(field.text().await?),
            "bio" => bio = Some(field.text().await?),
            "profile_picture" => {
                // browsers send an empty part with an empty filename when no file was chosen
                let chosen = field.file_name().is_some_and(|f| !f.is_empty());
                let data = field.bytes().await?;
                if chosen {
                    picture = Some(data);
                }
            }
            _ => {}
        }
    }

    let missing = |field: &str| AppError::BadRequest(format!("missing form field `{field}`"));
    Ok(ProfileUpdate {
        name: name.ok_or_else(|| missing("name"))?,
        age: age.ok_or_else(|| missing("age"))?,
        bio: bio.ok_or_else(|| missing("bio"))?,
        picture,
    })
}
