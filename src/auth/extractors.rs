use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::Redirect,
};
use tracing::{debug, warn};

use super::session::{read_cookie, Flash, SessionKeys, FLASH_COOKIE, SESSION_COOKIE};

/// The session's user id, if the request carries a valid session cookie.
pub struct CurrentUser(pub Option<i64>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        let user_id = read_cookie(&parts.headers, SESSION_COOKIE)
            .filter(|token| !token.is_empty())
            .and_then(|token| match keys.verify_session(token) {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(error = %e, "ignoring invalid session cookie");
                    None
                }
            });
        Ok(CurrentUser(user_id))
    }
}

/// Requires an authenticated session; anonymous requests are redirected to the login page.
pub struct AuthUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user_id) = match CurrentUser::from_request_parts(parts, state).await {
            Ok(current) => current,
            Err(never) => match never {},
        };

        user_id.map(AuthUser).ok_or_else(|| {
            debug!(uri = %parts.uri, "anonymous request redirected to login");
            Redirect::to("/login")
        })
    }
}

/// Messages flashed by a previous response.
pub struct Flashes(pub Vec<Flash>);

#[async_trait]
impl<S> FromRequestParts<S> for Flashes
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        let flashes = read_cookie(&parts.headers, FLASH_COOKIE)
            .filter(|token| !token.is_empty())
            .and_then(|token| keys.verify_flashes(token).ok())
            .unwrap_or_default();
        Ok(Flashes(flashes))
    }
}
