use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Stored identity + credential record. `password` always holds a digest
/// unless hashing has been switched off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    #[serde(rename = "isadmin", alias = "isAdmin")]
    pub is_admin: bool,
}

/// Record to insert; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub is_admin: bool,
}

/// Partial update. `None` leaves the stored column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.password.is_none() && self.is_admin.is_none()
    }
}
