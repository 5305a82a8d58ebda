use std::sync::OnceLock;

use argon2::{Algorithm, Argon2, Params, PasswordVerifier, Version};
use password_hash::{PasswordHash, PasswordHasher as ArgonPasswordHasher, SaltString};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::AuthError;

/// Plaintext hashed once per hasher to back [`PasswordHasher::verify_dummy`].
const DUMMY_PASSWORD: &str = "vitrine-dummy-password-never-valid";

/// Trait for password hashing and verification.
///
/// The default implementation is [`Argon2Hasher`].
///
/// ```rust
/// use vitrine::crypto::{Argon2Hasher, PasswordHasher};
///
/// let hasher = Argon2Hasher::new(1024, 1, 1);
/// let hash = hasher.hash("mypassword").unwrap();
/// assert!(hasher.verify("mypassword", &hash).unwrap());
/// assert!(!hasher.verify("wrongpassword", &hash).unwrap());
/// ```
pub trait PasswordHasher: Send + Sync {
    /// Hash a password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHashError` if hashing fails.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHashError` if the hash is malformed.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;

    /// Runs a verification against a fixed hash that never matches.
    ///
    /// Called when the username is unknown so the request pays the same
    /// hashing cost as a real wrong-password attempt.
    fn verify_dummy(&self, password: &str);
}

/// Argon2id password hasher with configurable parameters.
///
/// ```rust
/// use vitrine::crypto::Argon2Hasher;
///
/// // argon2 crate defaults (19 MiB, 2 iterations, 1 lane)
/// let hasher = Argon2Hasher::default();
///
/// // OWASP-style production settings
/// let hasher = Argon2Hasher::production();
/// ```
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    /// Memory cost in KiB
    memory_cost: u32,
    time_cost: u32,
    parallelism: u32,
    dummy_hash: OnceLock<String>,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new(19456, 2, 1)
    }
}

impl Argon2Hasher {
    #[must_use]
    pub fn new(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        let hasher = Self {
            memory_cost,
            time_cost,
            parallelism,
            dummy_hash: OnceLock::new(),
        };
        hasher.dummy();
        hasher
    }

    /// 64 MiB memory, 3 iterations, 4 lanes.
    #[must_use]
    pub fn production() -> Self {
        Self::new(65536, 3, 4)
    }

    fn argon2(&self) -> Result<Argon2<'static>, AuthError> {
        let params = Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|_| AuthError::PasswordHashError)?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    fn dummy(&self) -> &str {
        self.dummy_hash.get_or_init(|| {
            self.hash(DUMMY_PASSWORD).unwrap_or_else(|e| {
                log::error!(target: "vitrine_auth", "msg=\"dummy hash unavailable\" error=\"{e}\"");
                String::new()
            })
        })
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|_| AuthError::PasswordHashError)
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHashError)?;

        // Params come from the stored hash, not from this hasher.
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    fn verify_dummy(&self, password: &str) {
        let _ = self.verify(password, self.dummy());
    }
}

/// Hashes a password with Argon2id using the default parameters.
///
/// Used by the bootstrap step and by operators seeding credentials.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    Argon2Hasher::default().hash(password)
}

/// Generates a cryptographically secure alphanumeric token.
///
/// About 5.95 bits of entropy per character.
pub fn generate_token(length: usize) -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(rng.sample(rand::distributions::Alphanumeric)))
        .collect()
}

/// Generates `bytes` bytes from the OS RNG and hex-encodes them.
pub fn generate_hex_token(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Constant-time comparison to prevent timing attacks.
///
/// Only the length check short-circuits; every byte is visited otherwise.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
