// handlers/elevated/mod.rs - Mutating endpoints behind the admin gate
//
// Flow per request: admin check → (denied: 403, stop) | (allowed: store op → respond).
// The caller is the `:username` path segment. Unless
// SECURITY_BIND_CALLER_TO_SESSION is set, that segment is trusted as given.
pub mod users;

pub use users::{create_user, delete_user, update_user};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::SessionUser;

/// Reject the request unless `caller` passes the admin gate.
pub(crate) async fn authorize_caller(
    state: &AppState,
    caller: &str,
    session: Option<&SessionUser>,
) -> Result<(), ApiError> {
    if state.config.security.bind_caller_to_session {
        if let Some(session) = session {
            if session.username != caller {
                tracing::warn!(
                    "Caller '{}' does not match session subject '{}'",
                    caller,
                    session.username
                );
                return Err(ApiError::forbidden("caller does not match session"));
            }
        }
    }

    if !state.config.features.admin_gate_enabled {
        return Ok(());
    }

    if state.gate.require_admin(caller).await? {
        Ok(())
    } else {
        Err(ApiError::forbidden("not admin"))
    }
}
