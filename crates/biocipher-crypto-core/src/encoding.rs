//! UTF-16 little-endian conversion for challenges and payloads.
//!
//! Both the challenge seed (before signing) and the plaintext (before
//! sealing) travel as UTF-16-LE code units: no BOM, no terminator.

use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::memory::SecretBuffer;

/// Encode `text` as UTF-16-LE bytes into a [`SecretBuffer`].
///
/// The output length is always `2 * text.encode_utf16().count()`.
///
/// # Errors
///
/// Returns `CryptoError::SecureMemory` if the buffer cannot be allocated.
pub fn encode_utf16le(text: &str) -> Result<SecretBuffer, CryptoError> {
    let mut bytes = Vec::with_capacity(text.len().saturating_mul(2));
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    SecretBuffer::from_vec(bytes)
}

/// Decode UTF-16-LE bytes into a `String`.
///
/// # Errors
///
/// Returns `CryptoError::StringConversion` if the byte length is odd or the
/// code units contain an unpaired surrogate.
pub fn decode_utf16le(bytes: &[u8]) -> Result<String, CryptoError> {
    if bytes.len() % 2 != 0 {
        return Err(CryptoError::StringConversion(format!(
            "odd UTF-16 byte length: {}",
            bytes.len()
        )));
    }

    let mut units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let decoded = String::from_utf16(&units)
        .map_err(|_| CryptoError::StringConversion("ill-formed UTF-16 sequence".into()));
    units.zeroize();
    decoded
}
