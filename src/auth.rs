//! Credential handling: password hashing and login-header parsing.
//!
//! Passwords are hashed with Argon2id and stored as PHC strings.  The
//! login endpoint carries credentials as an HTTP Basic `Authorization`
//! header (`Basic base64(email:password)`); parsing failures are all
//! collapsed to "no credentials" so nothing about the failure leaks.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::Engine;
use rand_core::OsRng;

/// Hash a password using Argon2id with a random salt.
///
/// Returns a PHC-formatted hash string that embeds the salt and
/// parameters.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash.
///
/// Any failure — unparsable hash or mismatched password — is an
/// indistinguishable `false`.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Parse an HTTP Basic `Authorization` header value into `(email, password)`.
///
/// Returns `None` for any malformation: missing scheme, bad base64,
/// non-UTF-8 payload, or a payload without a colon separator. The password
/// may itself contain colons; only the first one splits.
pub fn parse_basic_credentials(header: &str) -> Option<(String, String)> {
    let encoded = header.strip_prefix("Basic ")?.trim();
    if encoded.is_empty() {
        return None;
    }

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;

    let (email, password) = decoded.split_once(':')?;
    if email.is_empty() || password.is_empty() {
        return None;
    }

    Some((email.to_string(), password.to_string()))
}

// -- Tests --------------------------------------------------------------------
