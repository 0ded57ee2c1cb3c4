use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::{app, AppState};
use crate::auth::PasswordHasher;
use crate::config::AppConfig;
use crate::database::{MemoryUserStore, NewUser, PgUserStore, UserStore};

#[derive(Parser)]
#[command(name = "usergate")]
#[command(about = "User management API with admin-gated mutations and session tokens")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Listen port (overrides PORT)")]
        port: Option<u16>,

        #[arg(long, help = "Use a throwaway in-memory store instead of Postgres")]
        memory: bool,
    },

    #[command(about = "Insert an admin record directly into the database")]
    CreateAdmin {
        #[arg(long)]
        username: String,

        #[arg(long, env = "USERGATE_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::from_env();

    match cli.command.unwrap_or(Commands::Serve { port: None, memory: false }) {
        Commands::Serve { port, memory } => serve(config, port, memory).await,
        Commands::CreateAdmin { username, password } => {
            create_admin(config, username, password).await
        }
    }
}

async fn serve(config: AppConfig, port: Option<u16>, memory: bool) -> Result<()> {
    info!("Starting usergate in {:?} mode", config.environment);
    warn_on_weak_settings(&config);

    let store: Arc<dyn UserStore> = if memory {
        warn!("Using in-memory store; records are lost on exit");
        Arc::new(MemoryUserStore::new())
    } else {
        let store = PgUserStore::connect(&config.database)
            .await
            .context("failed to connect to database")?;
        store.ensure_schema().await.context("failed to prepare users table")?;
        Arc::new(store)
    };

    let port = port.unwrap_or(config.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("usergate listening on http://{}", bind_addr);

    let state = AppState::new(config, store);
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn create_admin(config: AppConfig, username: String, password: String) -> Result<()> {
    if username.is_empty() || password.is_empty() {
        bail!("username and password must not be empty");
    }

    let store = PgUserStore::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    store.ensure_schema().await.context("failed to prepare users table")?;

    let hasher = if config.features.hashing_enabled {
        PasswordHasher::new(config.security.bcrypt_cost)
    } else {
        PasswordHasher::plaintext()
    };
    let digest = hasher.hash(password).await.context("failed to hash password")?;

    let created = store
        .insert(NewUser {
            username,
            password: digest,
            is_admin: true,
        })
        .await
        .context("failed to insert admin")?;
    store.close().await;

    println!("Created admin '{}' (id {})", created.username, created.id);
    Ok(())
}

fn warn_on_weak_settings(config: &AppConfig) {
    if !config.features.hashing_enabled {
        warn!("Password hashing is disabled; passwords are stored as plaintext");
    }
    if !config.features.admin_gate_enabled {
        warn!("Admin gate is disabled; any caller may create, update or delete users");
    }
    if config.features.sessions_enabled {
        use secrecy::ExposeSecret;
        let secret = config.security.session_secret.expose_secret();
        if secret.is_empty() {
            warn!("SESSION_SECRET is empty; logins will fail until it is set");
        } else if secret.len() < 32 {
            warn!("SESSION_SECRET is shorter than 32 bytes");
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
