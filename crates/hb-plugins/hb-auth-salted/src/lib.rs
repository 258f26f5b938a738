//! # hb-auth-salted
//!
//! SHA-256 implementation of `IdentityHasher`.
//! Turns a raw network identity into a salted, one-way digest that is safe
//! to keep in the like ledger and the rate limiter.

use hb_core::IdentityHasher;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

pub struct SaltedIdentityHasher {
    /// Fixed for the life of the process so digests stay stable
    salt: SecretString,
}

impl SaltedIdentityHasher {
    pub fn new(salt: SecretString) -> Self {
        Self { salt }
    }
}

impl IdentityHasher for SaltedIdentityHasher {
    /// Hex-encoded `sha256(raw_identity + salt)`, always 64 characters.
    fn hash_identity(&self, raw_identity: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(raw_identity.as_bytes());
        hasher.update(self.salt.expose_secret().as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher(salt: &str) -> SaltedIdentityHasher {
        SaltedIdentityHasher::new(SecretString::from(salt.to_string()))
    }

    #[test]
    fn digest_is_stable_and_fixed_length() {
        let h = hasher("pepper");
        let a = h.hash_identity("203.0.113.7");
        assert_eq!(a, h.hash_identity("203.0.113.7"));
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!a.contains("203.0.113.7"));
    }

    #[test]
    fn matches_salted_sha256() {
        // sha256("abc") with an empty salt
        assert_eq!(
            hasher("").hash_identity("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hasher("c").hash_identity("ab"), hasher("").hash_identity("abc"));
    }

    #[test]
    fn salt_and_identity_both_matter() {
        assert_ne!(hasher("one").hash_identity("x"), hasher("two").hash_identity("x"));
        assert_ne!(hasher("one").hash_identity("x"), hasher("one").hash_identity("y"));
    }
}
