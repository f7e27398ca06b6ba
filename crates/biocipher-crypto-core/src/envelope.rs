//! AES-256-GCM envelopes.
//!
//! This module provides:
//! - [`seal`] / [`open`]: raw bytes in, [`Envelope`] out (and back)
//! - [`seal_base64`] / [`open_base64`]: string-level codec over UTF-16-LE
//!   plaintext with a base64 wire form
//! - [`Envelope`]: nonce + ciphertext + tag container
//!
//! # Wire format
//!
//! ```text
//! base64_standard( nonce[12] || ciphertext[n] || tag[16] )
//! ```
//!
//! `n` equals the UTF-16-LE byte length of the plaintext. No additional
//! authenticated data is bound.

use data_encoding::BASE64;
use rand::rngs::OsRng;
use rand::RngCore;
use ring::aead;
use zeroize::Zeroize;

use crate::encoding::{decode_utf16le, encode_utf16le};
use crate::error::CryptoError;
use crate::kdf::SessionKey;
use crate::memory::SecretBuffer;

/// AES-256-GCM nonce length in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// AES-256-GCM authentication tag length in bytes (128 bits).
pub const TAG_LEN: usize = 16;

/// AES-256-GCM key length in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Smallest valid envelope: nonce + empty ciphertext + tag.
const MIN_ENVELOPE_LEN: usize = NONCE_LEN + TAG_LEN;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Authenticated ciphertext container.
///
/// Any modification to the nonce, ciphertext, or tag makes [`open`] fail.
#[must_use = "an envelope must be stored or returned to the caller"]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    /// 96-bit random nonce, fresh per seal.
    pub nonce: [u8; NONCE_LEN],
    /// Encrypted bytes, same length as the plaintext bytes.
    pub ciphertext: Vec<u8>,
    /// 128-bit authentication tag.
    pub tag: [u8; TAG_LEN],
}

impl Envelope {
    /// Serialize to `nonce || ciphertext || tag`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let capacity = NONCE_LEN
            .saturating_add(self.ciphertext.len())
            .saturating_add(TAG_LEN);
        let mut out = Vec::with_capacity(capacity);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.tag);
        out
    }

    /// Split `nonce || ciphertext || tag`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::MalformedEnvelope` if `bytes` is shorter than 28.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() < MIN_ENVELOPE_LEN {
            return Err(CryptoError::MalformedEnvelope(format!(
                "encrypted data is too short or corrupted: {} bytes (minimum {MIN_ENVELOPE_LEN})",
                bytes.len()
            )));
        }

        let (nonce_bytes, rest) = bytes.split_at(NONCE_LEN);
        let ct_len = rest
            .len()
            .checked_sub(TAG_LEN)
            .ok_or_else(|| CryptoError::MalformedEnvelope("envelope length underflow".into()))?;
        let (ciphertext, tag_bytes) = rest.split_at(ct_len);

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(nonce_bytes);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(tag_bytes);

        Ok(Self {
            nonce,
            ciphertext: ciphertext.to_vec(),
            tag,
        })
    }

    /// Standard base64 (with `=` padding) of [`Envelope::to_bytes`].
    #[must_use]
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.to_bytes())
    }

    /// Decode standard base64 and split.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::MalformedEnvelope` if the input is not valid
    /// base64 or decodes to fewer than 28 bytes.
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = BASE64
            .decode(encoded.as_bytes())
            .map_err(|e| CryptoError::MalformedEnvelope(format!("invalid base64: {e}")))?;
        Self::from_bytes(&bytes)
    }
}

// ---------------------------------------------------------------------------
// Byte-level AEAD
// ---------------------------------------------------------------------------

fn aes_key(key: &[u8]) -> Result<aead::LessSafeKey, CryptoError> {
    if key.len() != KEY_LEN {
        return Err(CryptoError::Encryption(format!(
            "invalid key length: {} bytes (expected {KEY_LEN})",
            key.len()
        )));
    }
    let unbound = aead::UnboundKey::new(&aead::AES_256_GCM, key)
        .map_err(|_| CryptoError::Encryption("failed to create AES-256-GCM key".into()))?;
    Ok(aead::LessSafeKey::new(unbound))
}

/// Seal `plaintext` under `key` with a fresh random nonce and no AAD.
///
/// # Errors
///
/// Returns `CryptoError::Encryption` if the key is not 32 bytes, the CSPRNG
/// fails, or sealing fails.
pub fn seal(plaintext: &[u8], key: &[u8]) -> Result<Envelope, CryptoError> {
    let sealing_key = aes_key(key)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng
        .try_fill_bytes(&mut nonce_bytes)
        .map_err(|e| CryptoError::Encryption(format!("nonce generation failed: {e}")))?;
    let nonce = aead::Nonce::assume_unique_for_key(nonce_bytes);

    let mut in_out = plaintext.to_vec();
    let Ok(tag) = sealing_key.seal_in_place_separate_tag(nonce, aead::Aad::empty(), &mut in_out)
    else {
        in_out.zeroize();
        return Err(CryptoError::Encryption(
            "AES-256-GCM encryption failed".into(),
        ));
    };

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(tag.as_ref());

    Ok(Envelope {
        nonce: nonce_bytes,
        ciphertext: in_out,
        tag: tag_bytes,
    })
}

/// Verify and decrypt `envelope` under `key`.
///
/// # Errors
///
/// Returns `CryptoError::Encryption` if the key is not 32 bytes, and
/// `CryptoError::Decryption` if the tag does not verify.
pub fn open(envelope: &Envelope, key: &[u8]) -> Result<SecretBuffer, CryptoError> {
    let opening_key = aes_key(key)?;
    let nonce = aead::Nonce::assume_unique_for_key(envelope.nonce);

    let mut ct_tag = Vec::with_capacity(envelope.ciphertext.len().saturating_add(TAG_LEN));
    ct_tag.extend_from_slice(&envelope.ciphertext);
    ct_tag.extend_from_slice(&envelope.tag);

    let result = match opening_key.open_in_place(nonce, aead::Aad::empty(), &mut ct_tag) {
        Ok(plaintext) => SecretBuffer::new(plaintext),
        Err(_) => Err(CryptoError::Decryption),
    };
    ct_tag.zeroize();
    result
}

// ---------------------------------------------------------------------------
// String-level codec
// ---------------------------------------------------------------------------

/// Encrypt `plaintext` into a base64 envelope.
///
/// The plaintext is encoded as UTF-16-LE before sealing. Nondeterministic:
/// every call draws a new nonce.
///
/// # Errors
///
/// Propagates [`seal`] errors.
pub fn seal_base64(key: &SessionKey, plaintext: &str) -> Result<String, CryptoError> {
    let payload = encode_utf16le(plaintext)?;
    let envelope = seal(payload.expose(), key.expose())?;
    Ok(envelope.to_base64())
}

/// Decrypt a base64 envelope back into its plaintext string.
///
/// # Errors
///
/// - `CryptoError::MalformedEnvelope`: invalid base64 or fewer than 28 bytes
/// - `CryptoError::Decryption`: tag verification failed
/// - `CryptoError::StringConversion`: plaintext is not valid UTF-16-LE
pub fn open_base64(key: &SessionKey, encoded: &str) -> Result<String, CryptoError> {
    let envelope = Envelope::from_base64(encoded)?;
    let payload = open(&envelope, key.expose())?;
    decode_utf16le(payload.expose())
}
