use std::sync::Arc;
use tracing::debug;

use super::password::PasswordHasher;
use crate::database::{StoreError, User, UserStore};

/// Outcome of a credential check.
///
/// `granted == false` covers both "no such user" and "wrong password";
/// callers must not tell the two apart.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub granted: bool,
    pub record: Option<User>,
}

impl AuthResult {
    fn denied() -> Self {
        Self { granted: false, record: None }
    }
}

#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl Authenticator {
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    pub async fn authenticate(&self, username: &str, plaintext: &str) -> Result<AuthResult, StoreError> {
        let Some(user) = self.store.find_by_username(username).await? else {
            // Same hashing cost as a real mismatch
            self.hasher.verify_unknown(plaintext.to_string()).await;
            debug!("Authentication denied for '{}'", username);
            return Ok(AuthResult::denied());
        };

        if self.hasher.verify(plaintext.to_string(), user.password.clone()).await {
            Ok(AuthResult { granted: true, record: Some(user) })
        } else {
            debug!("Authentication denied for '{}'", username);
            Ok(AuthResult::denied())
        }
    }
}
