//! Password hashing and verification.
//!
//! Hashes use Argon2id, which is memory-hard and resistant to GPU-based
//! attacks. Verification with these parameters takes tens of milliseconds.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::{FolioError, Result};

/// Argon2id parameters.
///
/// - Memory: 19 MB (19 * 1024 KB)
/// - Iterations: 2
/// - Parallelism: 1
const ARGON2_MEMORY_KB: u32 = 19 * 1024;
const ARGON2_ITERATIONS: u32 = 2;
const ARGON2_PARALLELISM: u32 = 1;

/// Random salt length in bytes.
const SALT_LENGTH: usize = 16;

/// Minimum length for a newly chosen password.
const MIN_PASSWORD_LENGTH: usize = 6;

fn hasher() -> Result<Argon2<'static>> {
    let params = Params::new(
        ARGON2_MEMORY_KB,
        ARGON2_ITERATIONS,
        ARGON2_PARALLELISM,
        None,
    )
    .map_err(|e| FolioError::Crypto(format!("Failed to create Argon2 params: {}", e)))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password with a fresh random salt.
///
/// Returns a PHC string (`$argon2id$v=19$m=...`) that embeds the salt and
/// parameters. Hashing the same password twice yields different strings.
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; SALT_LENGTH];
    getrandom::getrandom(&mut salt_bytes)
        .map_err(|e| FolioError::Crypto(format!("Failed to generate salt: {}", e)))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| FolioError::Crypto(format!("Failed to encode salt: {}", e)))?;

    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| FolioError::Crypto(format!("Password hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

/// Check a password against a stored hash.
///
/// A malformed or unsupported hash string is reported as a mismatch, never
/// as an error. The parameters embedded in the hash are used, so hashes made
/// with older cost settings keep verifying.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(password_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Validate a newly chosen password.
///
/// # Requirements
///
/// - At least 6 characters long
/// - Not empty or only whitespace
pub fn validate_new_password(password: &str) -> Result<()> {
    if password.trim().is_empty() {
        return Err(FolioError::InvalidInput(
            "Password cannot be empty".to_string(),
        ));
    }

    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(FolioError::InvalidInput(format!(
            "Password must be at least {} characters (got {})",
            MIN_PASSWORD_LENGTH, length
        )));
    }

    Ok(())
}
