use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::database::models::{NewUser, User, UserChanges};
use crate::database::store::{StoreError, UserStore};

/// In-process store with the same lookup semantics as the Postgres one.
/// Backs the test suite and `serve --memory`.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    users: Vec<User>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.username == username).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.inner.read().await.users.clone())
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let created = User {
            id: inner.next_id,
            username: user.username,
            password: user.password,
            is_admin: user.is_admin,
        };
        inner.users.push(created.clone());
        Ok(created)
    }

    async fn update_by_username(
        &self,
        username: &str,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError> {
        let mut inner = self.inner.write().await;
        let mut first = None;
        for user in inner.users.iter_mut().filter(|u| u.username == username) {
            if let Some(password) = &changes.password {
                user.password = password.clone();
            }
            if let Some(is_admin) = changes.is_admin {
                user.is_admin = is_admin;
            }
            if first.is_none() {
                first = Some(user.clone());
            }
        }
        Ok(first)
    }

    async fn delete_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let mut inner = self.inner.write().await;
        let first = inner.users.iter().find(|u| u.username == username).cloned();
        inner.users.retain(|u| u.username != username);
        Ok(first)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, is_admin: bool) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: "digest".to_string(),
            is_admin,
        }
    }

    #[tokio::test]
    async fn assigns_increasing_ids() {
        let store = MemoryUserStore::new();
        let a = store.insert(new_user("a", false)).await.unwrap();
        let b = store.insert(new_user("b", false)).await.unwrap();
        assert!(b.id > a.id);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn find_returns_first_match_for_duplicate_usernames() {
        let store = MemoryUserStore::new();
        let first = store.insert(new_user("dup", true)).await.unwrap();
        store.insert(new_user("dup", false)).await.unwrap();

        let found = store.find_by_username("dup").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert!(store.find_by_username("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_only_touches_supplied_fields() {
        let store = MemoryUserStore::new();
        store.insert(new_user("carol", true)).await.unwrap();

        let updated = store
            .update_by_username("carol", UserChanges { password: None, is_admin: Some(false) })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.password, "digest");
        assert!(!updated.is_admin);

        let none = store
            .update_by_username("nobody", UserChanges::default())
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn delete_removes_every_match() {
        let store = MemoryUserStore::new();
        store.insert(new_user("dup", false)).await.unwrap();
        store.insert(new_user("dup", false)).await.unwrap();
        store.insert(new_user("keep", false)).await.unwrap();

        let deleted = store.delete_by_username("dup").await.unwrap();
        assert!(deleted.is_some());
        let remaining = store.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].username, "keep");
        assert!(store.delete_by_username("dup").await.unwrap().is_none());
    }
}
