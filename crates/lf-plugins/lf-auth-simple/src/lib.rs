//! # lf-auth-simple
//!
//! Argon2-based implementation of `AuthProvider`. Passwords are stored
//! as PHC strings and never compared in plaintext.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lf_core::traits::AuthProvider;

#[derive(Default)]
pub struct SimpleAuthProvider;

impl SimpleAuthProvider {
    pub fn new() -> Self {
        Self
    }
}

impl AuthProvider for SimpleAuthProvider {
    /// Hashes with Argon2id and a fresh random salt.
    fn hash_password(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored Argon2 hash.
    /// A malformed stored hash verifies false rather than erroring.
    fn verify_password(&self, password: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(_) => return false,
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_core::traits::AuthProvider;

    #[test]
    fn hash_then_verify_accepts_the_password() {
        let auth = SimpleAuthProvider::new();
        let hash = auth.hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(auth.verify_password("hunter2", &hash));
        assert!(!auth.verify_password("hunter3", &hash));
    }

    #[test]
    fn same_password_hashes_differently_per_salt() {
        let auth = SimpleAuthProvider::new();
        let a = auth.hash_password("hunter2").unwrap();
        let b = auth.hash_password("hunter2").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_verifies_false() {
        let auth = SimpleAuthProvider::new();
        assert!(!auth.verify_password("hunter2", "not-a-phc-string"));
    }
}
