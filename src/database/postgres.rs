use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::models::{NewUser, User, UserChanges};
use crate::database::store::{StoreError, UserStore};

const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        username TEXT NOT NULL,
        password TEXT NOT NULL,
        is_admin BOOLEAN NOT NULL DEFAULT FALSE
    )
"#;

const CREATE_USERNAME_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS users_username_idx ON users (username)";

/// Postgres-backed user store. Every statement is parameterized.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool from configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let options = config.connect_options()?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_with(options)
            .await?;

        info!("Connected to database {} at {}:{}", config.name, config.host, config.port);
        Ok(Self::new(pool))
    }

    /// Create the users table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_USERS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_USERNAME_INDEX).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password, is_admin
             FROM users
             WHERE username = $1
             ORDER BY id
             LIMIT 1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, password, is_admin FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let created = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password, is_admin)
             VALUES ($1, $2, $3)
             RETURNING id, username, password, is_admin",
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(user.is_admin)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update_by_username(
        &self,
        username: &str,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError> {
        let updated = sqlx::query_as::<_, User>(
            "UPDATE users
             SET password = COALESCE($2, password),
                 is_admin = COALESCE($3, is_admin)
             WHERE username = $1
             RETURNING id, username, password, is_admin",
        )
        .bind(username)
        .bind(changes.password)
        .bind(changes.is_admin)
        .fetch_all(&self.pool)
        .await?;

        Ok(updated.into_iter().min_by_key(|u| u.id))
    }

    async fn delete_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let deleted = sqlx::query_as::<_, User>(
            "DELETE FROM users
             WHERE username = $1
             RETURNING id, username, password, is_admin",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(deleted.into_iter().min_by_key(|u| u.id))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
