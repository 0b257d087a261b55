//! Password hashing
//!
//! Stored hashes are base64 of the SHA-256 digest of the UTF-8 password.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};

pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    STANDARD.encode(digest)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    hash_password(password) == hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_hash() {
        assert_eq!(
            hash_password("password123"),
            "75K3eLr+dx6JJFuJ7LwIpEpOFmwGZZkRiB84PURz6U8="
        );
    }

    #[test]
    fn test_verify() {
        let hash = hash_password("secret1");
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("Secret1", &hash));
        assert!(!verify_password("secret1", &hash.to_lowercase()));
    }
}
