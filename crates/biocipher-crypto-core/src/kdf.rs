//! Session key derivation from a platform signature.
//!
//! The platform signs the configured challenge with a credential that never
//! leaves the secure store. That signature is already a high-entropy secret
//! bound to the device, so a single SHA-256 compresses it to an AES-256 key:
//!
//! ```text
//! challenge ──► platform sign (user presence) ──► SHA-256 ──► session key
//! ```
//!
//! There is no salt: a given `(credential, challenge)` pair must always
//! reproduce the same key so envelopes sealed earlier can be opened again.

use ring::digest;
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::memory::SecretBytes;

/// Session key length in bytes (256 bits).
pub const SESSION_KEY_LEN: usize = 32;

/// AES-256 key derived for a single encrypt or decrypt call.
pub type SessionKey = SecretBytes<SESSION_KEY_LEN>;

/// Derive the session key: `SHA-256(signature)`.
///
/// Pure function of `signature`. The signature may be any length,
/// including empty; its structure is platform-defined.
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivation` if the digest is not 32 bytes,
/// which indicates a broken digest implementation.
pub fn derive_session_key(signature: &[u8]) -> Result<SessionKey, CryptoError> {
    let hash = digest::digest(&digest::SHA256, signature);
    let hash_bytes = hash.as_ref();
    if hash_bytes.len() != SESSION_KEY_LEN {
        return Err(CryptoError::KeyDerivation(format!(
            "hash length is {} bytes (expected {SESSION_KEY_LEN})",
            hash_bytes.len()
        )));
    }

    let mut key_bytes = [0u8; SESSION_KEY_LEN];
    key_bytes.copy_from_slice(hash_bytes);
    let key = SessionKey::new(key_bytes);
    key_bytes.zeroize();
    Ok(key)
}
