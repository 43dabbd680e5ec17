use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::FromRef,
    http::{header, HeaderMap, HeaderName},
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session";
pub const FLASH_COOKIE: &str = "flash";

const FLASH_TTL: Duration = Duration::from_secs(5 * 60);

/// Distinguishes the two signed cookies so one can't be replayed as the other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Session,
    Flash,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Success,
    Error,
}

impl FlashCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashCategory::Success => "success",
            FlashCategory::Error => "error",
        }
    }
}

/// A one-shot message shown on the next rendered page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            category: FlashCategory::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            category: FlashCategory::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: i64,    // user id
    pub iat: usize,  // issued at
    pub exp: usize,  // expires at
    pub kind: TokenKind,
}

#[derive(Debug, Serialize, Deserialize)]
struct FlashClaims {
    flashes: Vec<Flash>,
    iat: usize,
    exp: usize,
    kind: TokenKind,
}

/// Signing material and cookie policy for the session and flash cookies.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    secure: bool,
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        let cfg = &state.config.session;
        Self::new(
            &cfg.secret,
            Duration::from_secs((cfg.ttl_minutes.max(0) as u64).saturating_mul(60)),
            cfg.secure_cookie,
        )
    }
}

impl SessionKeys {
    pub fn new(secret: &str, ttl: Duration, secure: bool) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
            secure,
        }
    }

    fn window(ttl: Duration) -> anyhow::Result<(usize, usize)> {
        let now = OffsetDateTime::now_utc();
        let exp = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(|secs| now.checked_add(TimeDuration::seconds(secs)))
            .with_context(|| format!("token lifetime of {}s is out of range", ttl.as_secs()))?;
        Ok((now.unix_timestamp() as usize, exp.unix_timestamp() as usize))
    }

    fn decode<T: DeserializeOwned>(&self, token: &str) -> anyhow::Result<T> {
        let mut validation = Validation::default();
        validation.validate_aud = false;
        let data = decode::<T>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }

    pub fn sign_session(&self, user_id: i64) -> anyhow::Result<String> {
        let (iat, exp) = Self::window(self.ttl)?;
        let claims = SessionClaims {
            sub: user_id,
            iat,
            exp,
            kind: TokenKind::Session,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id, "session signed");
        Ok(token)
    }

    /// Returns the user id carried by a valid, unexpired session token.
    pub fn verify_session(&self, token: &str) -> anyhow::Result<i64> {
        let claims: SessionClaims = self.decode(token)?;
        if claims.kind != TokenKind::Session {
            anyhow::bail!("not a session token");
        }
        Ok(claims.sub)
    }

    pub fn sign_flashes(&self, flashes: &[Flash]) -> anyhow::Result<String> {
        let (iat, exp) = Self::window(FLASH_TTL)?;
        let claims = FlashClaims {
            flashes: flashes.to_vec(),
            iat,
            exp,
            kind: TokenKind::Flash,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify_flashes(&self, token: &str) -> anyhow::Result<Vec<Flash>> {
        let claims: FlashClaims = self.decode(token)?;
        if claims.kind != TokenKind::Flash {
            anyhow::bail!("not a flash token");
        }
        Ok(claims.flashes)
    }

    pub fn session_cookie(&self, user_id: i64) -> anyhow::Result<String> {
        let token = self.sign_session(user_id)?;
        Ok(self.cookie(SESSION_COOKIE, &token, self.ttl.as_secs()))
    }

    pub fn flash_cookie(&self, flash: Flash) -> anyhow::Result<String> {
        let token = self.sign_flashes(&[flash])?;
        Ok(self.cookie(FLASH_COOKIE, &token, FLASH_TTL.as_secs()))
    }

    pub fn clear_cookie(&self, name: &str) -> String {
        self.cookie(name, "", 0)
    }

    fn cookie(&self, name: &str, value: &str, max_age: u64) -> String {
        let secure = if self.secure { "; Secure" } else { "" };
        format!("{name}={value}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Lax{secure}")
    }
}

/// Finds a cookie value in the request's `Cookie` headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

pub fn set_cookies(cookies: Vec<String>) -> AppendHeaders<Vec<(HeaderName, String)>> {
    AppendHeaders(
        cookies
            .into_iter()
            .map(|c| (header::SET_COOKIE, c))
            .collect(),
    )
}

/// Wraps a rendered page, expiring the flash cookie when its messages were shown.
pub fn html_page(keys: &SessionKeys, shown_flashes: bool, body: String) -> Response {
    let cookies = if shown_flashes {
        vec![keys.clear_cookie(FLASH_COOKIE)]
    } else {
        Vec::new()
    };
    (set_cookies(cookies), Html(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn keys(secret: &str) -> SessionKeys {
        SessionKeys::new(secret, Duration::from_secs(300), false)
    }

    #[test]
    fn session_roundtrip() {
        let keys = keys("dev-secret");
        let token = keys.sign_session(42).expect("sign");
        assert_eq!(keys.verify_session(&token).expect("verify"), 42);
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let token = keys("one").sign_session(1).unwrap();
        assert!(keys("two").verify_session(&token).is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let signer = keys("dev-secret");
        let token = signer.sign_session(1).unwrap();
        let other = signer.sign_session(2).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = other.split('.').nth(1).unwrap();
        let spliced = parts.join(".");
        assert!(signer.verify_session(&spliced).is_err());
    }

    #[test]
    fn expired_session_is_rejected() {
        let keys = keys("dev-secret");
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = SessionClaims {
            sub: 1,
            iat: now - 7200,
            exp: now - 3600,
            kind: TokenKind::Session,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();
        assert!(keys.verify_session(&token).is_err());
    }

    #[test]
    fn oversized_lifetime_is_an_error_not_a_panic() {
        let keys = SessionKeys::new("dev-secret", Duration::from_secs(u64::MAX), false);
        assert!(keys.sign_session(1).is_err());
        assert!(keys.session_cookie(1).is_err());

        let keys = SessionKeys::new("dev-secret", Duration::from_secs(60_000_000_000_000), false);
        let err = keys.sign_session(1).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn flash_token_is_not_a_session() {
        let keys = keys("dev-secret");
        let flash = keys.sign_flashes(&[Flash::success("hi")]).unwrap();
        assert!(keys.verify_session(&flash).is_err());

        let session = keys.sign_session(3).unwrap();
        assert!(keys.verify_flashes(&session).is_err());
    }

    #[test]
    fn flashes_roundtrip_in_order() {
        let keys = keys("dev-secret");
        let flashes = vec![Flash::success("one"), Flash::error("two")];
        let token = keys.sign_flashes(&flashes).unwrap();
        assert_eq!(keys.verify_flashes(&token).unwrap(), flashes);
    }

    #[test]
    fn cookie_attributes() {
        let plain = keys("k").session_cookie(5).unwrap();
        assert!(plain.starts_with("session="));
        assert!(plain.contains("HttpOnly"));
        assert!(plain.contains("SameSite=Lax"));
        assert!(plain.contains("Max-Age=300"));
        assert!(!plain.contains("Secure"));

        let secure = SessionKeys::new("k", Duration::from_secs(60), true);
        assert!(secure.clear_cookie(SESSION_COOKIE).ends_with("; Secure"));
        assert!(secure.clear_cookie(SESSION_COOKIE).starts_with("session=; Path=/; Max-Age=0"));
    }

    #[test]
    fn read_cookie_finds_named_value() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1; session=abc.def"));
        headers.append(header::COOKIE, HeaderValue::from_static("flash=xyz"));

        assert_eq!(read_cookie(&headers, SESSION_COOKIE), Some("abc.def"));
        assert_eq!(read_cookie(&headers, FLASH_COOKIE), Some("xyz"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }
}
