use std::sync::Arc;
use tracing::warn;

use crate::database::{StoreError, UserStore};

/// Admin check in front of every mutating endpoint.
///
/// The caller record is re-read on every call; nothing is cached.
#[derive(Clone)]
pub struct AdminGate {
    store: Arc<dyn UserStore>,
}

impl AdminGate {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// `true` only when a record named `caller` exists with the admin flag set.
    pub async fn require_admin(&self, caller: &str) -> Result<bool, StoreError> {
        let allowed = matches!(
            self.store.find_by_username(caller).await?,
            Some(user) if user.is_admin
        );

        if !allowed {
            warn!("Admin check denied for '{}'", caller);
        }
        Ok(allowed)
    }
}
