use base64::Engine;
use once_cell::sync::OnceCell;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;

/// Plaintext verified against the dummy digest when a username is unknown.
const DUMMY_PASSWORD: &str = "usergate-unknown-user";

#[derive(Debug, Error)]
pub enum HashError {
    #[error("password hashing failed: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// SHA-256 of the plaintext, base64 encoded (44 bytes).
///
/// bcrypt reads only the first 72 bytes of its input; passwords that differ
/// past that point must still produce different digests.
fn prehash(plaintext: &str) -> String {
    let digest = Sha256::digest(plaintext.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(digest)
}

/// Adaptive one-way password hashing (bcrypt over a SHA-256 prehash).
///
/// Holds no mutable state besides a lazily computed dummy digest, so clones
/// can hash and verify concurrently. The async methods move the bcrypt work
/// onto the blocking pool.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    enabled: bool,
    dummy_digest: Arc<OnceCell<String>>,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            enabled: true,
            dummy_digest: Arc::new(OnceCell::new()),
        }
    }

    /// Pass-through mode: digests are the plaintext itself.
    pub fn plaintext() -> Self {
        Self {
            enabled: false,
            ..Self::new(bcrypt::DEFAULT_COST)
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn hash_blocking(&self, plaintext: &str) -> Result<String, HashError> {
        if !self.enabled {
            return Ok(plaintext.to_string());
        }
        Ok(bcrypt::hash(prehash(plaintext), self.cost)?)
    }

    /// Any mismatch, malformed digest or unparseable cost yields `false`.
    pub fn verify_blocking(&self, plaintext: &str, digest: &str) -> bool {
        if !self.enabled {
            return plaintext == digest;
        }
        bcrypt::verify(prehash(plaintext), digest).unwrap_or(false)
    }

    /// Burn one verification at the configured cost and report failure.
    pub fn verify_unknown_blocking(&self, plaintext: &str) -> bool {
        if !self.enabled {
            return false;
        }
        if let Ok(digest) = self
            .dummy_digest
            .get_or_try_init(|| bcrypt::hash(prehash(DUMMY_PASSWORD), self.cost))
        {
            let _ = bcrypt::verify(prehash(plaintext), digest);
        }
        false
    }

    pub async fn hash(&self, plaintext: String) -> Result<String, HashError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash_blocking(&plaintext)).await?
    }

    pub async fn verify(&self, plaintext: String, digest: String) -> bool {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify_blocking(&plaintext, &digest))
            .await
            .unwrap_or(false)
    }

    pub async fn verify_unknown(&self, plaintext: String) -> bool {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify_unknown_blocking(&plaintext))
            .await
            .unwrap_or(false)
    }
}
