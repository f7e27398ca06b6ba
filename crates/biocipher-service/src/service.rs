//! Cipher Service: status queries, key lifecycle, encrypt and decrypt.
//!
//! Encrypt and decrypt run one fixed pipeline:
//!
//! ```text
//! is_configured ─► seed ─► UTF-16-LE challenge ─► vault.sign(tag)
//!               ─► SHA-256 ─► session key ─► codec
//! ```
//!
//! The signature, the challenge and the session key are dropped (and
//! zeroized) before the call returns.

use std::sync::Arc;

use biocipher_crypto_core::{derive_session_key, encode_utf16le, SessionKey};

use crate::capability::CapabilityOracle;
use crate::codec::EnvelopeCodec;
use crate::config::ConfigRegister;
use crate::credential::CredentialVault;
use crate::error::CipherError;
use crate::status::TpmStatus;

const UNCONFIGURED_MESSAGE: &str = "Data to sign is empty";

/// Orchestrates the capability oracle, vault, register and codec.
///
/// Holds shared references only; the register is the sole mutable state.
#[derive(Clone)]
pub struct CipherService {
    oracle: Arc<dyn CapabilityOracle>,
    vault: Arc<dyn CredentialVault>,
    config: Arc<ConfigRegister>,
    codec: Arc<dyn EnvelopeCodec>,
}

impl CipherService {
    #[must_use]
    pub fn new(
        oracle: Arc<dyn CapabilityOracle>,
        vault: Arc<dyn CredentialVault>,
        config: Arc<ConfigRegister>,
        codec: Arc<dyn EnvelopeCodec>,
    ) -> Self {
        Self {
            oracle,
            vault,
            config,
            codec,
        }
    }

    /// Security-processor status as its wire integer.
    ///
    /// Provider and version failures are reported as statuses, not errors.
    ///
    /// # Errors
    ///
    /// Any other oracle failure.
    pub async fn get_tpm_status(&self) -> Result<i32, CipherError> {
        let status = match self.oracle.platform_status().await {
            Ok(status) => status,
            Err(CipherError::TpmUnsupported(reason)) => {
                tracing::warn!(%reason, "security processor unavailable");
                TpmStatus::Unsupported
            }
            Err(CipherError::TpmVersion(reason)) => {
                tracing::warn!(%reason, "security processor version unsupported");
                TpmStatus::VersionUnsupported
            }
            Err(other) => return Err(other),
        };
        Ok(status.as_i32())
    }

    /// Biometric subsystem status as its wire integer.
    ///
    /// # Errors
    ///
    /// `Unknown` for an unmapped platform availability.
    pub async fn get_biometry_status(&self) -> Result<i32, CipherError> {
        Ok(self.oracle.biometry_status().await?.as_i32())
    }

    /// Create the credential for `tag`.
    ///
    /// # Errors
    ///
    /// Propagates vault errors, including `KeyAlreadyExists`.
    pub async fn generate_key(&self, tag: &str) -> Result<(), CipherError> {
        self.vault.create_credential(tag).await
    }

    /// Delete the credential for `tag`. Deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Propagates vault errors other than `KeyNotFound`.
    pub async fn delete_key(&self, tag: &str) -> Result<(), CipherError> {
        match self.vault.delete_credential(tag).await {
            Err(CipherError::KeyNotFound) => {
                tracing::warn!(tag, "delete of absent key treated as success");
                Ok(())
            }
            other => other,
        }
    }

    /// Replace the challenge seed.
    ///
    /// # Errors
    ///
    /// `Configure` if `seed` is empty; the register is then unconfigured.
    pub fn configure(&self, seed: &str) -> Result<(), CipherError> {
        self.config.set(seed)
    }

    /// Encrypt `data` under the key bound to `tag`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when unconfigured (before any vault access);
    /// vault errors; `Encrypt` if sealing fails.
    pub async fn encrypt(&self, tag: &str, data: &str) -> Result<String, CipherError> {
        let key = self
            .session_key(tag, || CipherError::InvalidArgument(UNCONFIGURED_MESSAGE.into()))
            .await?;
        let envelope = self.codec.encrypt(&key, data)?;
        tracing::debug!(tag, envelope_len = envelope.len(), "payload encrypted");
        Ok(envelope)
    }

    /// Decrypt a base64 envelope under the key bound to `tag`.
    ///
    /// # Errors
    ///
    /// `Decrypt` when unconfigured (before any vault access), for a
    /// malformed envelope, or on tag mismatch; vault errors;
    /// `ConvertingString` for a non-UTF-16 payload.
    pub async fn decrypt(&self, tag: &str, envelope: &str) -> Result<String, CipherError> {
        let key = self
            .session_key(tag, || CipherError::Decrypt(UNCONFIGURED_MESSAGE.into()))
            .await?;
        let plaintext = self.codec.decrypt(&key, envelope)?;
        tracing::debug!(tag, "payload decrypted");
        Ok(plaintext)
    }

    async fn session_key(
        &self,
        tag: &str,
        unconfigured: impl FnOnce() -> CipherError + Send,
    ) -> Result<SessionKey, CipherError> {
        let Some(seed) = self.config.seed() else {
            tracing::debug!(tag, "cipher call rejected: not configured");
            return Err(unconfigured());
        };
        let challenge = encode_utf16le(&seed)?;
        drop(seed);

        let signature = self.vault.sign(tag, challenge.expose()).await?;
        drop(challenge);

        Ok(derive_session_key(signature.expose())?)
    }
}
