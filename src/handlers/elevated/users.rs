use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;

use super::authorize_caller;
use crate::app::AppState;
use crate::database::{NewUser, User, UserChanges};
use crate::error::ApiError;
use crate::handlers::JsonBody;
use crate::middleware::SessionUser;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default, rename = "isadmin", alias = "isAdmin")]
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, rename = "isadmin", alias = "isAdmin")]
    pub is_admin: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteUserRequest {
    pub username: String,
}

/// POST /api/:username/createuser - Insert a record with a hashed password
pub async fn create_user(
    State(state): State<AppState>,
    Path(caller): Path<String>,
    session: Option<Extension<SessionUser>>,
    JsonBody(payload): JsonBody<CreateUserRequest>,
) -> Result<Json<User>, ApiError> {
    authorize_caller(&state, &caller, session.as_deref()).await?;

    if payload.username.is_empty() {
        return Err(ApiError::missing_field("username"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::missing_field("password"));
    }

    let password = state.hasher.hash(payload.password).await?;
    let created = state
        .store
        .insert(NewUser {
            username: payload.username,
            password,
            is_admin: payload.is_admin,
        })
        .await?;

    info!("User '{}' created by '{}'", created.username, caller);
    Ok(Json(created))
}

/// POST /api/:username/updateuser - Partial update; a new password is hashed
pub async fn update_user(
    State(state): State<AppState>,
    Path(caller): Path<String>,
    session: Option<Extension<SessionUser>>,
    JsonBody(payload): JsonBody<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    authorize_caller(&state, &caller, session.as_deref()).await?;

    if payload.username.is_empty() {
        return Err(ApiError::missing_field("username"));
    }

    let password = match payload.password {
        Some(plaintext) if !plaintext.is_empty() => Some(state.hasher.hash(plaintext).await?),
        _ => None,
    };
    let changes = UserChanges {
        password,
        is_admin: payload.is_admin,
    };

    let updated = if changes.is_empty() {
        state.store.find_by_username(&payload.username).await?
    } else {
        state.store.update_by_username(&payload.username, changes).await?
    };

    let updated = updated
        .ok_or_else(|| ApiError::not_found(format!("User '{}' not found", payload.username)))?;

    info!("User '{}' updated by '{}'", updated.username, caller);
    Ok(Json(updated))
}

/// POST /api/:username/deleteuser - Remove the record and echo it back
pub async fn delete_user(
    State(state): State<AppState>,
    Path(caller): Path<String>,
    session: Option<Extension<SessionUser>>,
    JsonBody(payload): JsonBody<DeleteUserRequest>,
) -> Result<Json<User>, ApiError> {
    authorize_caller(&state, &caller, session.as_deref()).await?;

    if payload.username.is_empty() {
        return Err(ApiError::missing_field("username"));
    }

    let deleted = state
        .store
        .delete_by_username(&payload.username)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User '{}' not found", payload.username)))?;

    info!("User '{}' deleted by '{}'", deleted.username, caller);
    Ok(Json(deleted))
}
