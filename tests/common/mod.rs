#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{header::SET_COOKIE, Response};
use secrecy::SecretString;
use serde_json::{json, Value};
use usergate_api::auth::PasswordHasher;
use usergate_api::config::{AppConfig, FeatureConfig};
use usergate_api::database::{MemoryUserStore, NewUser, User, UserStore};
use usergate_api::{app, AppState};

pub const TEST_COST: u32 = 4;
pub const ROOT_USER: &str = "root";
pub const ROOT_PASSWORD: &str = "root-password";
pub const TEST_SECRET: &str = "integration-test-secret";

/// In-process server bound to an ephemeral port. Each `#[tokio::test]` owns
/// its runtime, so the server goes away with the test.
pub struct TestServer {
    pub base_url: String,
    pub store: Arc<MemoryUserStore>,
    pub client: reqwest::Client,
}

pub fn test_config(features: FeatureConfig) -> AppConfig {
    let mut config = AppConfig::development();
    config.security.session_secret = SecretString::from(TEST_SECRET.to_string());
    config.security.bcrypt_cost = TEST_COST;
    config.api.enable_request_logging = false;
    config.features = features;
    config
}

pub async fn spawn() -> Result<TestServer> {
    spawn_with(test_config(FeatureConfig::default())).await
}

pub async fn spawn_with(config: AppConfig) -> Result<TestServer> {
    let store = Arc::new(MemoryUserStore::new());
    seed_root(store.as_ref(), &config).await?;

    let base_url = serve(AppState::new(config, store.clone())).await?;
    Ok(TestServer {
        base_url,
        store,
        client: reqwest::Client::new(),
    })
}

/// Insert the root admin, digested the way `config` expects
pub async fn seed_root(store: &dyn UserStore, config: &AppConfig) -> Result<()> {
    let hasher = if config.features.hashing_enabled {
        PasswordHasher::new(TEST_COST)
    } else {
        PasswordHasher::plaintext()
    };
    store
        .insert(NewUser {
            username: ROOT_USER.to_string(),
            password: hasher.hash_blocking(ROOT_PASSWORD)?,
            is_admin: true,
        })
        .await?;
    Ok(())
}

/// Serve `state` on an ephemeral port and return its base URL
pub async fn serve(state: AppState) -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, app(state)).await;
    });

    Ok(format!("http://{}", addr))
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/api/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?)
    }

    /// Log in and return the bearer token
    pub async fn token(&self, username: &str, password: &str) -> Result<String> {
        let res = self.login(username, password).await?;
        anyhow::ensure!(res.status().is_success(), "login failed: {}", res.status());
        let body = res.json::<Value>().await?;
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("login response has no token")
    }

    pub async fn post_as(
        &self,
        token: Option<&str>,
        path: &str,
        body: Value,
    ) -> Result<Response> {
        let mut req = self.client.post(self.url(path)).json(&body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Ok(req.send().await?)
    }

    pub async fn show_users(&self, token: Option<&str>) -> Result<Response> {
        let mut req = self.client.get(self.url("/api/showusers"));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Ok(req.send().await?)
    }

    pub async fn stored(&self, username: &str) -> Result<Option<User>> {
        Ok(self.store.find_by_username(username).await?)
    }
}

/// Raw `Set-Cookie` header for the session cookie, if any
pub fn session_set_cookie(res: &Response) -> Option<String> {
    res.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("token="))
        .map(str::to_string)
}
