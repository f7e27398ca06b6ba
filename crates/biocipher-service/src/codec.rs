//! Envelope Codec seam.
//!
//! The service only sees strings in and strings out; the envelope layout
//! lives in `biocipher_crypto_core::envelope`.

use biocipher_crypto_core::{open_base64, seal_base64, SessionKey};

use crate::error::CipherError;

/// Seals and opens base64 envelopes under a session key.
pub trait EnvelopeCodec: Send + Sync {
    /// Seal `plaintext` into a base64 envelope with a fresh nonce.
    ///
    /// # Errors
    ///
    /// `Encrypt` if sealing fails.
    fn encrypt(&self, key: &SessionKey, plaintext: &str) -> Result<String, CipherError>;

    /// Open a base64 envelope.
    ///
    /// # Errors
    ///
    /// `Decrypt` for bad base64, a short envelope or a tag mismatch;
    /// `ConvertingString` if the payload is not valid UTF-16-LE.
    fn decrypt(&self, key: &SessionKey, envelope: &str) -> Result<String, CipherError>;
}

/// AES-256-GCM with a random 96-bit nonce and a 128-bit tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct AesGcmCodec;

impl EnvelopeCodec for AesGcmCodec {
    fn encrypt(&self, key: &SessionKey, plaintext: &str) -> Result<String, CipherError> {
        Ok(seal_base64(key, plaintext)?)
    }

    fn decrypt(&self, key: &SessionKey, envelope: &str) -> Result<String, CipherError> {
        Ok(open_base64(key, envelope)?)
    }
}
