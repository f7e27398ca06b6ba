//! Error taxonomy for `biocipher-service`.
//!
//! Internally every failure is a [`CipherError`] variant. At the facade each
//! variant collapses to exactly one [`ErrorCode`], whose string form is the
//! stable code callers match on. Messages are advisory.

use std::fmt;

use biocipher_crypto_core::CryptoError;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Errors produced by the cipher service and its platform adapters.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The platform security-processor provider could not be opened.
    #[error("TPM unsupported: {0}")]
    TpmUnsupported(String),

    /// The security-processor version could not be read or parsed.
    #[error("TPM version error: {0}")]
    TpmVersion(String),

    /// The biometric subsystem is not usable for this user.
    #[error("biometry is not supported")]
    BiometryNotSupported,

    /// The challenge seed was rejected.
    #[error("configure error: {0}")]
    Configure(String),

    /// A request argument was missing, wrong-typed, or out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Credential creation failed for a reason other than those below.
    #[error("generate key error: {0}")]
    GenerateKey(String),

    /// No credential exists for the tag.
    #[error("key credential not found")]
    KeyNotFound,

    /// A credential already exists for the tag.
    #[error("key credential already exists")]
    KeyAlreadyExists,

    /// Credential deletion failed.
    #[error("delete key error: {0}")]
    DeleteKey(String),

    /// Sealing the envelope failed.
    #[error("encrypt error: {0}")]
    Encrypt(String),

    /// The envelope was unconfigured, malformed, or failed authentication.
    #[error("decrypt error: {0}")]
    Decrypt(String),

    /// The user dismissed the consent prompt.
    #[error("user canceled the operation")]
    AuthenticationCanceled,

    /// The user chose the password fallback instead of the gesture.
    #[error("user prefers password")]
    UserPrefersPassword,

    /// The security device is locked out.
    #[error("security device is locked")]
    SecureDeviceLocked,

    /// A payload could not be converted to or from UTF-16.
    #[error("string conversion error: {0}")]
    ConvertingString(String),

    /// An unmapped platform outcome or an internal invariant violation.
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl CipherError {
    /// The stable code this error surfaces as.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::TpmUnsupported(_) => ErrorCode::TpmUnsupported,
            Self::TpmVersion(_) => ErrorCode::TpmVersionError,
            Self::BiometryNotSupported => ErrorCode::BiometryNotSupported,
            Self::Configure(_) => ErrorCode::ConfigureError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::GenerateKey(_) => ErrorCode::GenerateKeyError,
            Self::KeyNotFound => ErrorCode::KeyNotFound,
            Self::KeyAlreadyExists => ErrorCode::KeyAlreadyExists,
            Self::DeleteKey(_) => ErrorCode::DeleteKeyError,
            Self::Encrypt(_) => ErrorCode::EncryptError,
            Self::Decrypt(_) => ErrorCode::DecryptError,
            Self::AuthenticationCanceled => ErrorCode::AuthenticationUserCanceled,
            Self::UserPrefersPassword => ErrorCode::UserPrefersPassword,
            Self::SecureDeviceLocked => ErrorCode::SecureDeviceLocked,
            Self::ConvertingString(_) => ErrorCode::ConvertingStringError,
            Self::Unknown(_) => ErrorCode::UnknownError,
        }
    }

    /// Build a `TpmUnsupported`/`TpmVersion`-style message for a raw platform status.
    #[must_use]
    pub fn status_message(operation: &str, status: u32) -> String {
        format!("{operation} failed: 0x{status:08X}")
    }
}

/// Crypto failures keep their phase: sealing errors are encrypt errors,
/// envelope and tag errors are decrypt errors.
impl From<CryptoError> for CipherError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::Encryption(msg) => Self::Encrypt(msg),
            CryptoError::Decryption => {
                Self::Decrypt("authentication tag verification failed".into())
            }
            CryptoError::MalformedEnvelope(msg) => Self::Decrypt(msg),
            CryptoError::StringConversion(msg) => Self::ConvertingString(msg),
            CryptoError::KeyDerivation(msg) | CryptoError::SecureMemory(msg) => Self::Unknown(msg),
        }
    }
}

// ---------------------------------------------------------------------------
// Stable codes
// ---------------------------------------------------------------------------

/// Stable, caller-visible error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    TpmUnsupported,
    TpmVersionError,
    BiometryNotSupported,
    ConfigureError,
    GenerateKeyError,
    KeyNotFound,
    KeyAlreadyExists,
    DeleteKeyError,
    EncryptError,
    DecryptError,
    AuthenticationUserCanceled,
    UserPrefersPassword,
    SecureDeviceLocked,
    ConvertingStringError,
    InvalidArgument,
    UnknownError,
}

impl ErrorCode {
    /// Every code, in wire-table order.
    pub const ALL: [Self; 16] = [
        Self::TpmUnsupported,
        Self::TpmVersionError,
        Self::BiometryNotSupported,
        Self::ConfigureError,
        Self::GenerateKeyError,
        Self::KeyNotFound,
        Self::KeyAlreadyExists,
        Self::DeleteKeyError,
        Self::EncryptError,
        Self::DecryptError,
        Self::AuthenticationUserCanceled,
        Self::UserPrefersPassword,
        Self::SecureDeviceLocked,
        Self::ConvertingStringError,
        Self::InvalidArgument,
        Self::UnknownError,
    ];

    /// The stable string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TpmUnsupported => "TPM_UNSUPPORTED",
            Self::TpmVersionError => "TPM_VERSION_ERROR",
            Self::BiometryNotSupported => "BIOMETRY_NOT_SUPPORTED",
            Self::ConfigureError => "CONFIGURE_ERROR",
            Self::GenerateKeyError => "GENERATE_KEY_ERROR",
            Self::KeyNotFound => "KEY_NOT_FOUND",
            Self::KeyAlreadyExists => "KEY_ALREADY_EXISTS",
            Self::DeleteKeyError => "DELETE_KEY_ERROR",
            Self::EncryptError => "ENCRYPT_ERROR",
            Self::DecryptError => "DECRYPT_ERROR",
            Self::AuthenticationUserCanceled => "AUTHENTICATION_USER_CANCELED",
            Self::UserPrefersPassword => "USER_PREFERS_PASSWORD",
            Self::SecureDeviceLocked => "SECURE_DEVICE_LOCKED",
            Self::ConvertingStringError => "CONVERTING_STRING_ERROR",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Numeric status used by the native plugin for the same failure.
    #[must_use]
    pub const fn platform_code(&self) -> u32 {
        match self {
            Self::TpmUnsupported => 0xA008_2001,
            Self::TpmVersionError => 0xA008_2002,
            Self::BiometryNotSupported => 0xA008_2003,
            Self::ConfigureError => 0xA008_2004,
            Self::GenerateKeyError => 0xA008_2005,
            Self::KeyNotFound => 0xA008_2006,
            Self::KeyAlreadyExists => 0xA008_2007,
            Self::DeleteKeyError => 0xA008_2008,
            Self::EncryptError => 0xA008_2009,
            Self::DecryptError => 0xA008_200A,
            Self::AuthenticationUserCanceled => 0xA008_200B,
            Self::UserPrefersPassword => 0xA008_200C,
            Self::SecureDeviceLocked => 0xA008_200D,
            Self::ConvertingStringError => 0xA008_200E,
            // E_INVALIDARG / E_FAIL
            Self::InvalidArgument => 0x8007_0057,
            Self::UnknownError => 0x8000_4005,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn code_strings_are_unique() {
        let strings: HashSet<_> = ErrorCode::ALL.iter().map(ErrorCode::as_str).collect();
        assert_eq!(strings.len(), ErrorCode::ALL.len());
    }

    #[test]
    fn platform_codes_are_unique_and_sequential() {
        let codes: HashSet<_> = ErrorCode::ALL.iter().map(ErrorCode::platform_code).collect();
        assert_eq!(codes.len(), ErrorCode::ALL.len());
        for (i, code) in ErrorCode::ALL[..14].iter().enumerate() {
            assert_eq!(code.platform_code(), 0xA008_2001 + i as u32);
        }
    }

    #[test]
    fn every_variant_maps_to_its_code() {
        let cases = [
            (CipherError::TpmUnsupported(String::new()), "TPM_UNSUPPORTED"),
            (CipherError::TpmVersion(String::new()), "TPM_VERSION_ERROR"),
            (CipherError::BiometryNotSupported, "BIOMETRY_NOT_SUPPORTED"),
            (CipherError::Configure(String::new()), "CONFIGURE_ERROR"),
            (CipherError::InvalidArgument(String::new()), "INVALID_ARGUMENT"),
            (CipherError::GenerateKey(String::new()), "GENERATE_KEY_ERROR"),
            (CipherError::KeyNotFound, "KEY_NOT_FOUND"),
            (CipherError::KeyAlreadyExists, "KEY_ALREADY_EXISTS"),
            (CipherError::DeleteKey(String::new()), "DELETE_KEY_ERROR"),
            (CipherError::Encrypt(String::new()), "ENCRYPT_ERROR"),
            (CipherError::Decrypt(String::new()), "DECRYPT_ERROR"),
            (CipherError::AuthenticationCanceled, "AUTHENTICATION_USER_CANCELED"),
            (CipherError::UserPrefersPassword, "USER_PREFERS_PASSWORD"),
            (CipherError::SecureDeviceLocked, "SECURE_DEVICE_LOCKED"),
            (CipherError::ConvertingString(String::new()), "CONVERTING_STRING_ERROR"),
            (CipherError::Unknown(String::new()), "UNKNOWN_ERROR"),
        ];
        for (err, code) in cases {
            assert_eq!(err.code().as_str(), code, "{err:?}");
        }
    }

    #[test]
    fn crypto_errors_keep_their_phase() {
        let enc: CipherError = CryptoError::Encryption("x".into()).into();
        assert_eq!(enc.code(), ErrorCode::EncryptError);
        let tag: CipherError = CryptoError::Decryption.into();
        assert_eq!(tag.code(), ErrorCode::DecryptError);
        let short: CipherError = CryptoError::MalformedEnvelope("short".into()).into();
        assert_eq!(short.code(), ErrorCode::DecryptError);
        let utf: CipherError = CryptoError::StringConversion("odd".into()).into();
        assert_eq!(utf.code(), ErrorCode::ConvertingStringError);
        let kdf: CipherError = CryptoError::KeyDerivation("len".into()).into();
        assert_eq!(kdf.code(), ErrorCode::UnknownError);
    }

    #[test]
    fn status_message_is_hex_formatted() {
        assert_eq!(
            CipherError::status_message("open storage provider", 0x8009_0030),
            "open storage provider failed: 0x80090030"
        );
    }

    #[test]
    fn error_code_serializes_as_string() {
        let json = serde_json::to_string(&ErrorCode::KeyNotFound).unwrap();
        assert_eq!(json, "\"KEY_NOT_FOUND\"");
    }
}
