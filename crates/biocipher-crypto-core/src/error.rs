//! Cryptographic error types for `biocipher-crypto-core`.

use thiserror::Error;

/// Errors produced by cryptographic operations.
///
/// Messages never contain key material, signatures or plaintext.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Session key derivation failed (digest produced an unexpected length).
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// AES-256-GCM sealing failed or the key was malformed.
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Authentication tag verification failed: envelope tampered or wrong key.
    #[error("decryption failed: authentication tag mismatch")]
    Decryption,

    /// Envelope is not valid base64, or shorter than nonce + tag.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// UTF-16 little-endian conversion failed.
    #[error("string conversion error: {0}")]
    StringConversion(String),

    /// Secure memory allocation failure (mlock, CSPRNG fill).
    #[error("secure memory error: {0}")]
    SecureMemory(String),
}
