//! Opaque token generation for share links.
//!
//! 256 bits from the OS RNG, rendered as fixed-length URL-safe base64.
//! Guessing resistance comes entirely from entropy; the store does an
//! exact-match lookup.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;

/// Raw token entropy in bytes.
pub const TOKEN_BYTES: usize = 32;

/// Encoded token length: ceil(32 * 4 / 3) without padding.
pub const TOKEN_LEN: usize = 43;

/// Generate a fresh link token.
pub fn generate() -> String {
    let mut buf = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_length() {
        assert_eq!(generate().len(), TOKEN_LEN);
    }

    #[test]
    fn test_url_safe_charset() {
        let token = generate();
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_tokens_distinct() {
        let a = generate();
        let b = generate();
        assert_ne!(a, b);
    }
}
