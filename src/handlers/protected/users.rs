use axum::{extract::State, Json};

use crate::app::AppState;
use crate::database::User;
use crate::error::ApiError;

/// GET /api/showusers - Every stored record
pub async fn show_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.store.list().await?;
    Ok(Json(users))
}
