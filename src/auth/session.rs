use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

use crate::config::{SecurityConfig, MAX_SESSION_TTL_SECS};

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "token";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject username
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session signing key is not configured")]
    MissingKey,

    #[error("token signing failed: {0}")]
    Signing(jsonwebtoken::errors::Error),

    #[error("token expiry out of range")]
    Expiry,

    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
}

/// A freshly minted session: the token plus the cookie that carries it.
#[derive(Debug)]
pub struct IssuedSession {
    pub token: String,
    pub claims: Claims,
    pub cookie: Cookie<'static>,
}

/// Mints and checks HS256 session tokens with one static key.
///
/// There is no server-side session list. `revoke` only tells the client to
/// drop its cookie; a copied token stays valid until `exp`.
pub struct SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    configured: bool,
    ttl: Duration,
}

impl SessionIssuer {
    /// `ttl_secs` is capped at `MAX_SESSION_TTL_SECS`.
    pub fn new(secret: &SecretString, ttl_secs: u64) -> Self {
        let key = secret.expose_secret().as_bytes();
        let ttl_secs = ttl_secs.min(MAX_SESSION_TTL_SECS) as i64;
        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            configured: !key.is_empty(),
            ttl: Duration::try_seconds(ttl_secs).unwrap_or_else(|| Duration::minutes(5)),
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(&security.session_secret, security.session_ttl_secs)
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn issue(&self, username: &str) -> Result<IssuedSession, SessionError> {
        self.issue_at(username, Utc::now())
    }

    pub fn issue_at(&self, username: &str, now: DateTime<Utc>) -> Result<IssuedSession, SessionError> {
        if !self.configured {
            return Err(SessionError::MissingKey);
        }

        let exp = now.checked_add_signed(self.ttl).ok_or(SessionError::Expiry)?;
        let claims = Claims {
            name: username.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(SessionError::Signing)?;

        let expires =
            OffsetDateTime::from_unix_timestamp(claims.exp).map_err(|_| SessionError::Expiry)?;
        let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
            .path("/")
            .http_only(true)
            .secure(true)
            .same_site(SameSite::Lax)
            .expires(expires)
            .build();

        Ok(IssuedSession { token, claims, cookie })
    }

    /// Check signature and expiry. Expired tokens are never accepted.
    pub fn verify(&self, token: &str) -> Result<Claims, SessionError> {
        if !self.configured {
            return Err(SessionError::MissingKey);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                if matches!(e.kind(), ErrorKind::ExpiredSignature) {
                    SessionError::Expired
                } else {
                    SessionError::Invalid(e)
                }
            })
    }

    /// Cookie that makes the client discard its session cookie.
    pub fn revoke() -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .http_only(true)
            .secure(true)
            .same_site(SameSite::Lax)
            .expires(OffsetDateTime::now_utc() - time::Duration::hours(2))
            .build()
    }
}
