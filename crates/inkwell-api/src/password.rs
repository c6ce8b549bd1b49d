//! One-way salted password hashing.
//!
//! Argon2id with the crate defaults. Every call draws a fresh salt, so two
//! hashes of the same password never match byte for byte; the PHC string
//! carries salt and parameters for later verification.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{self, SaltString, rand_core::OsRng},
};

pub fn hash(plaintext: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = Argon2::default().hash_password(plaintext.as_bytes(), &salt)?;
    Ok(digest.to_string())
}

/// A digest that does not parse verifies as `false`.
pub fn verify(plaintext: &str, digest: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(digest) else {
        return false;
    };

    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let digest = hash("secret1").unwrap();
        assert!(verify("secret1", &digest));
        assert!(!verify("secret2", &digest));
    }

    #[test]
    fn salts_differ_per_call() {
        let a = hash("secret1").unwrap();
        let b = hash("secret1").unwrap();
        assert_ne!(a, b);
        assert!(!a.contains("secret1"));
    }

    #[test]
    fn malformed_digest_is_false() {
        assert!(!verify("secret1", ""));
        assert!(!verify("secret1", "not-a-phc-string"));
        assert!(!verify("secret1", "$2b$10$abcdefghijklmnopqrstuu"));
    }
}
