use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::app::AppState;
use crate::auth::SessionIssuer;
use crate::error::ApiError;
use crate::handlers::JsonBody;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/login - Verify credentials and open a session
///
/// Success: `{"token": "..."}` plus the `token` cookie.
/// Failure: 401 `{"message": "unauthorized"}`, whatever the reason.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let result = state
        .authenticator
        .authenticate(&payload.username, &payload.password)
        .await?;

    if !result.granted {
        warn!("Login failed for '{}'", payload.username);
        return Err(ApiError::InvalidCredentials);
    }

    if !state.config.features.sessions_enabled {
        info!("Login succeeded for '{}'", payload.username);
        return Ok((jar, Json(json!({ "message": "logged in" }))));
    }

    let session = state.sessions.issue(&payload.username)?;
    info!("Session issued for '{}' until {}", payload.username, session.claims.exp);

    Ok((jar.add(session.cookie), Json(json!({ "token": session.token }))))
}

/// GET /api/logout - Tell the client to drop its session cookie
///
/// The token itself stays valid until it expires.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    (jar.add(SessionIssuer::revoke()), Json(json!("logged out successfully")))
}
