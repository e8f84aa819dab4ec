//! PBKDF2-HMAC-SHA-512 key derivation.
//!
//! A new key is derived for every seal and open call from the master secret
//! and the per-envelope salt. Nothing is cached.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;
use zeroize::Zeroizing;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of the random per-envelope salt.
pub const SALT_LEN: usize = 32;

/// PBKDF2 iteration count. Changing this breaks every stored envelope.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Derive a 256-bit field key from `secret` and `salt`.
///
/// The returned buffer is wiped when dropped.
pub fn derive_key(secret: &[u8], salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha512>(secret, salt, PBKDF2_ITERATIONS, &mut key[..]);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let salt = [7u8; SALT_LEN];
        let k1 = derive_key(b"master", &salt);
        let k2 = derive_key(b"master", &salt);
        assert_eq!(*k1, *k2);
    }

    #[test]
    fn different_salt_changes_key() {
        let k1 = derive_key(b"master", &[1u8; SALT_LEN]);
        let k2 = derive_key(b"master", &[2u8; SALT_LEN]);
        assert_ne!(*k1, *k2);
    }

    #[test]
    fn different_secret_changes_key() {
        let salt = [9u8; SALT_LEN];
        assert_ne!(*derive_key(b"one", &salt), *derive_key(b"two", &salt));
    }

    #[test]
    fn pbkdf2_sha512_known_vector() {
        // RFC 6070-style vector for HMAC-SHA-512, one iteration.
        let mut out = [0u8; 64];
        pbkdf2_hmac::<Sha512>(b"password", b"salt", 1, &mut out);
        assert_eq!(
            hex::encode(out),
            "867f70cf1ade02cff3752599a3a53dc4af34c7a669815ae5d513554e1c8cf252\
             c02d470a285a0501bad999bfe943c08f050235d7d68b1da55e63f73b60a57fce"
        );
    }
}
