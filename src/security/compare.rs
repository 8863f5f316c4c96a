//! Constant-time comparison of secrets.

use constant_time_eq::constant_time_eq;
use sha2::{Digest, Sha256};

/// Compare two byte strings without leaking where (or whether by length)
/// they differ.
///
/// Both sides are reduced to SHA-256 digests first, so inputs of different
/// lengths are compared as two 32-byte values like any other pair.
pub fn timing_safe_eq(a: &[u8], b: &[u8]) -> bool {
    let a = Sha256::digest(a);
    let b = Sha256::digest(b);
    constant_time_eq(a.as_slice(), b.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_inputs_match() {
        assert!(timing_safe_eq(b"sha256=abc", b"sha256=abc"));
        assert!(timing_safe_eq(b"", b""));
    }

    #[test]
    fn different_content_or_length_does_not_match() {
        assert!(!timing_safe_eq(b"hello", b"world"));
        assert!(!timing_safe_eq(b"hello", b"hello_world"));
        assert!(!timing_safe_eq(b"", b"x"));
    }
}
