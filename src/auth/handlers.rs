use axum::{
    extract::{rejection::FormRejection, FromRef, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use tracing::{info, instrument, warn, Span};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest},
        extractors::{CurrentUser, Flashes},
        password::{hash_password, verify_password},
        repo_types::{CreateUserError, User},
        session::{html_page, set_cookies, Flash, SessionKeys, SESSION_COOKIE},
    },
    error::AppError,
    state::AppState,
    views,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/register", get(register_form).post(register))
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout))
}

pub async fn home(CurrentUser(user_id): CurrentUser) -> Redirect {
    match user_id {
        Some(_) => Redirect::to("/profile"),
        None => Redirect::to("/login"),
    }
}

pub async fn register_form(State(state): State<AppState>, Flashes(flashes): Flashes) -> Response {
    let keys = SessionKeys::from_ref(&state);
    html_page(&keys, !flashes.is_empty(), views::register_page(&flashes))
}

#[instrument(skip_all, fields(username, email))]
pub async fn register(
    State(state): State<AppState>,
    form: Result<Form<RegisterRequest>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form?;
    let span = Span::current();
    span.record("username", form.username.as_str());
    span.record("email", form.email.as_str());

    let keys = SessionKeys::from_ref(&state);
    let hash = hash_password(form.password).await?;

    match User::create(&state.db, &form.username, &form.email, &hash).await {
        Ok(user_id) => {
            info!(user_id, "user registered");
            let flash = keys.flash_cookie(Flash::success("Account created! Please log in."))?;
            Ok((set_cookies(vec![flash]), Redirect::to("/login")).into_response())
        }
        Err(CreateUserError::Taken) => {
            warn!("username or email already registered");
            let flash = keys.flash_cookie(Flash::error("Username or email already exists."))?;
            Ok((set_cookies(vec![flash]), Redirect::to("/register")).into_response())
        }
        Err(CreateUserError::Database(e)) => Err(e.into()),
    }
}

pub async fn login_form(State(state): State<AppState>, Flashes(flashes): Flashes) -> Response {
    let keys = SessionKeys::from_ref(&state);
    html_page(&keys, !flashes.is_empty(), views::login_page(&flashes))
}

#[instrument(skip_all, fields(email))]
pub async fn login(
    State(state): State<AppState>,
    Flashes(mut flashes): Flashes,
    form: Result<Form<LoginRequest>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form?;
    Span::current().record("email", form.email.as_str());
    let keys = SessionKeys::from_ref(&state);

    // both failure causes end up on the same generic page
    let authenticated = match User::find_by_email(&state.db, &form.email).await? {
        Some(user) => {
            if verify_password(form.password, user.password_hash).await? {
                info!(user_id = user.id, username = %user.username, "credentials accepted");
                Some(user.id)
            } else {
                warn!(user_id = user.id, "login invalid password");
                None
            }
        }
        None => {
            warn!("login unknown email");
            None
        }
    };

    match authenticated {
        Some(user_id) => {
            let cookies = vec![
                keys.session_cookie(user_id)?,
                keys.flash_cookie(Flash::success("Logged in successfully!"))?,
            ];
            Ok((set_cookies(cookies), Redirect::to("/profile")).into_response())
        }
        None => {
            let had_pending = !flashes.is_empty();
            flashes.push(Flash::error("Invalid credentials."));
            Ok(html_page(&keys, had_pending, views::login_page(&flashes)))
        }
    }
}

#[instrument(skip(state, user_id))]
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Response, AppError> {
    let keys = SessionKeys::from_ref(&state);
    if let Some(user_id) = user_id {
        info!(user_id, "user logged out");
    }
    let cookies = vec![
        keys.clear_cookie(SESSION_COOKIE),
        keys.flash_cookie(Flash::success("Logged out successfully."))?,
    ];
    Ok((set_cookies(cookies), Redirect::to("/login")).into_response())
}
