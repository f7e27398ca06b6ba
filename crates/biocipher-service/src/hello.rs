//! Platform credential store abstraction.
//!
//! The credential store owns asymmetric keypairs bound to a tag and only
//! releases a signature after the user completes a presence gesture
//! (fingerprint, face, or PIN fallback). Hosts implement [`HelloPlatform`]
//! over their native API; tests implement it over an in-memory map.
//!
//! ```text
//! HelloPlatform (trait)
//! ├── is_supported / check_availability   (capability probe)
//! ├── request_create / open / delete      (credential lifecycle)
//! └── foreground_scope                    (keep the prompt reachable)
//!
//! KeyCredential (trait)
//! └── request_sign                        (consent-gated signature)
//! ```

use std::fmt;

use async_trait::async_trait;
use biocipher_crypto_core::SecretBuffer;
use serde::{Deserialize, Serialize};

use crate::error::CipherError;

// ---------------------------------------------------------------------------
// Platform outcomes
// ---------------------------------------------------------------------------

/// Outcome of a consent-verifier availability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentAvailability {
    Available,
    DeviceNotPresent,
    NotConfiguredForUser,
    DisabledByPolicy,
    DeviceBusy,
    SecurityUpdateRequired,
    /// A raw platform value with no mapping.
    Other(i32),
}

/// Non-success outcome of a credential store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCredentialStatus {
    UnknownError,
    NotFound,
    UserCanceled,
    UserPrefersPassword,
    CredentialAlreadyExists,
    SecurityDeviceLocked,
    /// A raw platform value with no mapping.
    Other(i32),
}

impl From<KeyCredentialStatus> for CipherError {
    fn from(status: KeyCredentialStatus) -> Self {
        match status {
            KeyCredentialStatus::NotFound => Self::KeyNotFound,
            KeyCredentialStatus::UserCanceled => Self::AuthenticationCanceled,
            KeyCredentialStatus::UserPrefersPassword => Self::UserPrefersPassword,
            KeyCredentialStatus::CredentialAlreadyExists => Self::KeyAlreadyExists,
            KeyCredentialStatus::SecurityDeviceLocked => Self::SecureDeviceLocked,
            KeyCredentialStatus::UnknownError => {
                Self::Unknown("credential store reported an unknown error".into())
            }
            KeyCredentialStatus::Other(raw) => {
                Self::Unknown(format!("unmapped credential store status {raw}"))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Consent prompt
// ---------------------------------------------------------------------------

/// Text shown by the platform consent prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsentPrompt {
    pub title: String,
    pub description: String,
}

impl Default for ConsentPrompt {
    fn default() -> Self {
        Self {
            title: "Biometric authentication".into(),
            description: "Confirm your identity to unlock encrypted data".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Foreground scope
// ---------------------------------------------------------------------------

/// RAII scope that keeps the consent prompt reachable.
///
/// Runs its release action exactly once when dropped.
pub struct ForegroundScope {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl ForegroundScope {
    /// A scope with nothing to release.
    #[must_use]
    pub fn none() -> Self {
        Self { release: None }
    }

    /// A scope that runs `release` on drop.
    #[must_use]
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }
}

impl Drop for ForegroundScope {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for ForegroundScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForegroundScope")
            .field("armed", &self.release.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// An opened credential.
#[async_trait]
pub trait KeyCredential: Send + Sync {
    /// Platform name of the credential (normally the tag).
    fn name(&self) -> &str;

    /// Sign `challenge`, blocking on the user's consent gesture.
    ///
    /// # Errors
    ///
    /// Returns the platform outcome when no signature was produced.
    async fn request_sign(
        &self,
        challenge: &[u8],
        prompt: &ConsentPrompt,
    ) -> Result<SecretBuffer, KeyCredentialStatus>;
}

/// Platform credential store.
#[async_trait]
pub trait HelloPlatform: Send + Sync {
    /// Whether key credentials are supported at all for this user.
    async fn is_supported(&self) -> bool;

    /// Probe the consent verifier.
    async fn check_availability(&self) -> ConsentAvailability;

    /// Create a credential for `tag`, failing if one exists.
    ///
    /// # Errors
    ///
    /// Returns the platform outcome on failure.
    async fn request_create(
        &self,
        tag: &str,
        prompt: &ConsentPrompt,
    ) -> Result<(), KeyCredentialStatus>;

    /// Open the credential for `tag`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no credential exists.
    async fn open(&self, tag: &str) -> Result<Box<dyn KeyCredential>, KeyCredentialStatus>;

    /// Delete the credential for `tag`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no credential exists.
    async fn delete(&self, tag: &str) -> Result<(), KeyCredentialStatus>;

    /// Acquire whatever focus the consent prompt needs. Default: none.
    fn foreground_scope(&self) -> ForegroundScope {
        ForegroundScope::none()
    }
}
