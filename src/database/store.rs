use async_trait::async_trait;
use thiserror::Error;

use crate::config::ConfigError;
use crate::database::models::{NewUser, User, UserChanges};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// CRUD-by-username over the `users` table.
///
/// Username is the lookup key for every operation. It is not required to be
/// unique; lookups return the lowest-id match, while updates and deletes
/// touch every matching row and return the first.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn list(&self) -> Result<Vec<User>, StoreError>;

    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    async fn update_by_username(
        &self,
        username: &str,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError>;

    async fn delete_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Cheap liveness check used by `/health`
    async fn ping(&self) -> Result<(), StoreError>;
}
