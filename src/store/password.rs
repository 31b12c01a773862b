//! Salted SHA-256 password hashing.

use rand::Rng;
use sha2::{Digest, Sha256};

const SALT_LEN: usize = 16;

/// Fresh random salt, hex-encoded.
pub fn generate_salt() -> String {
    let bytes: [u8; SALT_LEN] = rand::thread_rng().r#gen();
    hex::encode(bytes)
}

/// `hex(SHA-256(password || salt))`.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salt_is_hex_of_expected_length() {
        let salt = generate_salt();
        assert_eq!(salt.len(), SALT_LEN * 2);
        assert!(salt.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(salt, generate_salt());
    }

    #[test]
    fn hash_matches_known_digest() {
        // sha256("abc")
        assert_eq!(
            hash_password("ab", "c"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn different_salts_give_different_hashes() {
        assert_ne!(hash_password("secret", "aa"), hash_password("secret", "bb"));
    }
}
