//! Secret generation and one-way token hashing.
//!
//! Secrets are 32 bytes from the OS random source, hex encoded. Hashes
//! are HMAC-SHA256 keyed with a service-wide pepper, so a leaked table is
//! useless without the key. Verification is constant time per candidate.

use hmac::{Hmac, Mac};
use rand::TryRngCore;
use rand::rngs::OsRng;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Raw length of a generated secret before hex encoding.
pub const SECRET_BYTES: usize = 32;

/// Generate a fresh plaintext token: 32 random bytes as 64 hex characters.
///
/// # Errors
///
/// Returns [`AppError::RandomSourceUnavailable`] if the OS random source
/// fails. There is no fallback to a weaker generator.
pub fn generate() -> Result<String, AppError> {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|_| AppError::RandomSourceUnavailable)?;
    Ok(hex::encode(bytes))
}

/// Hash a plaintext token with the service pepper.
///
/// One-way: the plaintext is never recoverable from the result, which is
/// what makes "the token is returned exactly once" enforceable.
pub fn hash_token(pepper: &[u8], plaintext: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(pepper).expect("HMAC accepts keys of any length");
    mac.update(plaintext.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a presented plaintext against a stored hash in constant time.
///
/// Re-hashes the plaintext and compares with `subtle`, so the comparison
/// leaks nothing about how close the candidate was.
pub fn verify(pepper: &[u8], plaintext: &str, stored_hash: &str) -> bool {
    let computed = hash_token(pepper, plaintext);
    computed.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEPPER: &[u8] = b"test-pepper";

    #[test]
    fn generate_returns_64_hex_chars() {
        let token = generate().unwrap();
        assert_eq!(token.len(), SECRET_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generate_does_not_repeat() {
        let a = generate().unwrap();
        let b = generate().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn hash_differs_from_plaintext_and_is_deterministic() {
        let token = generate().unwrap();
        let hash = hash_token(PEPPER, &token);
        assert_ne!(hash, token);
        assert_eq!(hash, hash_token(PEPPER, &token));
    }

    #[test]
    fn hash_depends_on_pepper() {
        let token = generate().unwrap();
        assert_ne!(hash_token(PEPPER, &token), hash_token(b"other-pepper", &token));
    }

    #[test]
    fn verify_accepts_correct_and_rejects_wrong_plaintext() {
        let token = generate().unwrap();
        let hash = hash_token(PEPPER, &token);
        assert!(verify(PEPPER, &token, &hash));
        assert!(!verify(PEPPER, "not-the-token", &hash));
        assert!(!verify(b"other-pepper", &token, &hash));
    }
}
