use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::app::AppState;
use crate::auth::{Claims, SESSION_COOKIE};
use crate::error::ApiError;

/// Authenticated session subject, inserted into request extensions
#[derive(Clone, Debug)]
pub struct SessionUser {
    pub username: String,
}

impl From<Claims> for SessionUser {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.name,
        }
    }
}

/// Session middleware: validates the token and extracts the subject.
///
/// The token comes from `Authorization: Bearer` when present, otherwise from
/// the session cookie. Other authorization schemes are ignored.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers(), &jar)?;
    let claims = state.sessions.verify(&token)?;

    tracing::debug!("Session accepted for '{}'", claims.name);
    request.extensions_mut().insert(SessionUser::from(claims));

    Ok(next.run(request).await)
}

fn extract_token(headers: &HeaderMap, jar: &CookieJar) -> Result<String, ApiError> {
    let bearer = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if let Some(token) = bearer {
        let token = token.trim();
        if token.is_empty() {
            return Err(ApiError::unauthorized("Empty session token"));
        }
        return Ok(token.to_string());
    }

    match jar.get(SESSION_COOKIE) {
        Some(cookie) if !cookie.value().is_empty() => Ok(cookie.value().to_string()),
        _ => Err(ApiError::unauthorized("Missing session token")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum_extra::extract::cookie::Cookie;

    #[test]
    fn prefers_bearer_header_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer header-token"));
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "cookie-token"));

        assert_eq!(extract_token(&headers, &jar).unwrap(), "header-token");
    }

    #[test]
    fn falls_back_to_cookie() {
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "cookie-token"));
        assert_eq!(extract_token(&HeaderMap::new(), &jar).unwrap(), "cookie-token");
    }

    #[test]
    fn non_bearer_header_falls_back_to_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "cookie-token"));

        assert_eq!(extract_token(&headers, &jar).unwrap(), "cookie-token");
    }

    #[test]
    fn rejects_missing_or_malformed_tokens() {
        assert!(extract_token(&HeaderMap::new(), &CookieJar::new()).is_err());

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_token(&headers, &CookieJar::new()).is_err());

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer "));
        assert!(extract_token(&headers, &CookieJar::new()).is_err());

        let cleared = CookieJar::new().add(Cookie::new(SESSION_COOKIE, ""));
        assert!(extract_token(&HeaderMap::new(), &cleared).is_err());
    }
}
