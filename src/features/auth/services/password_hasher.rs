use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use crate::core::error::{AppError, Result};

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// PBKDF2-HMAC-SHA256 password hashing.
///
/// Hashes are stored as `pbkdf2-sha256$<iterations>$<salt hex>$<hash hex>`, so
/// the iteration count can be raised later without invalidating old hashes.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ITERATIONS)
    }
}

impl PasswordHasher {
    pub const DEFAULT_ITERATIONS: u32 = 100_000;

    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    pub fn hash(&self, password: &str) -> Result<String> {
        let mut salt = [0u8; SALT_LEN];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| AppError::Internal(format!("Failed to generate password salt: {}", e)))?;

        let derived = derive_key(password.as_bytes(), &salt, self.iterations);
        Ok(format!(
            "{}${}${}${}",
            SCHEME,
            self.iterations,
            hex::encode(salt),
            hex::encode(derived)
        ))
    }

    /// Constant-time check of `password` against a stored hash.
    ///
    /// Malformed stored hashes never verify.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let mut parts = stored.split('$');
        let (Some(SCHEME), Some(iterations), Some(salt), Some(expected), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return false;
        };

        let (Ok(iterations), Ok(salt), Ok(expected)) = (
            iterations.parse::<u32>(),
            hex::decode(salt),
            hex::decode(expected),
        ) else {
            return false;
        };

        constant_time_eq(&derive_key(password.as_bytes(), &salt, iterations), &expected)
    }
}

fn derive_key(password: &[u8], salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key);
    key
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
