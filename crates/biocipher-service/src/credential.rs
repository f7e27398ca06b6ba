//! Credential Vault Adapter: tag-bound credentials and gated signatures.
//!
//! Per tag the observable lifecycle is:
//!
//! ```text
//! [Absent]  --create--> [Present]      [Present] --create--> KeyAlreadyExists
//! [Present] --delete--> [Absent]       [Absent]  --delete--> [Absent]
//! [Present] --sign----> [Present]      [Absent]  --sign----> KeyNotFound
//! ```
//!
//! Every operation first checks that biometry is `Supported`.

use std::sync::Arc;

use async_trait::async_trait;
use biocipher_crypto_core::SecretBuffer;

use crate::capability::CapabilityOracle;
use crate::error::CipherError;
use crate::hello::{ConsentPrompt, HelloPlatform, KeyCredentialStatus};
use crate::status::BiometryStatus;

/// Tag-keyed asymmetric credentials held by the platform.
#[async_trait]
pub trait CredentialVault: Send + Sync {
    /// Create a credential for `tag`.
    ///
    /// # Errors
    ///
    /// `KeyAlreadyExists` if one exists; otherwise the mapped platform outcome.
    async fn create_credential(&self, tag: &str) -> Result<(), CipherError>;

    /// Delete the credential for `tag`. Succeeds if none exists.
    ///
    /// # Errors
    ///
    /// The mapped platform outcome for any failure other than "no key".
    async fn delete_credential(&self, tag: &str) -> Result<(), CipherError>;

    /// Sign `challenge` with the credential for `tag`.
    ///
    /// # Errors
    ///
    /// `KeyNotFound` if absent; authentication errors per the consent outcome.
    async fn sign(&self, tag: &str, challenge: &[u8]) -> Result<SecretBuffer, CipherError>;
}

/// [`CredentialVault`] over a [`HelloPlatform`].
pub struct HelloCredentialVault {
    hello: Arc<dyn HelloPlatform>,
    oracle: Arc<dyn CapabilityOracle>,
    prompt: ConsentPrompt,
}

impl HelloCredentialVault {
    #[must_use]
    pub fn new(
        hello: Arc<dyn HelloPlatform>,
        oracle: Arc<dyn CapabilityOracle>,
        prompt: ConsentPrompt,
    ) -> Self {
        Self {
            hello,
            oracle,
            prompt,
        }
    }

    async fn ensure_biometry_supported(&self) -> Result<(), CipherError> {
        let status = self.oracle.biometry_status().await?;
        if status == BiometryStatus::Supported {
            Ok(())
        } else {
            tracing::debug!(status = status.as_i32(), "biometry unavailable");
            Err(CipherError::BiometryNotSupported)
        }
    }
}

/// Reinterpret a platform status as its unsigned bit pattern.
const fn raw_status(raw: i32) -> u32 {
    u32::from_ne_bytes(raw.to_ne_bytes())
}

#[async_trait]
impl CredentialVault for HelloCredentialVault {
    async fn create_credential(&self, tag: &str) -> Result<(), CipherError> {
        self.ensure_biometry_supported().await?;

        let _scope = self.hello.foreground_scope();
        match self.hello.request_create(tag, &self.prompt).await {
            Ok(()) => {
                tracing::info!(tag, "key credential created");
                Ok(())
            }
            Err(KeyCredentialStatus::Other(raw)) => Err(CipherError::GenerateKey(
                CipherError::status_message("create credential", raw_status(raw)),
            )),
            Err(status) => Err(status.into()),
        }
    }

    async fn delete_credential(&self, tag: &str) -> Result<(), CipherError> {
        self.ensure_biometry_supported().await?;

        let _scope = self.hello.foreground_scope();
        match self.hello.delete(tag).await {
            Ok(()) => {
                tracing::info!(tag, "key credential deleted");
                Ok(())
            }
            Err(KeyCredentialStatus::NotFound) => {
                tracing::warn!(tag, "no key credential to delete");
                Ok(())
            }
            Err(KeyCredentialStatus::Other(raw)) => Err(CipherError::DeleteKey(
                CipherError::status_message("delete credential", raw_status(raw)),
            )),
            Err(status) => Err(status.into()),
        }
    }

    async fn sign(&self, tag: &str, challenge: &[u8]) -> Result<SecretBuffer, CipherError> {
        self.ensure_biometry_supported().await?;

        let credential = self.hello.open(tag).await.map_err(CipherError::from)?;

        let _scope = self.hello.foreground_scope();
        let signature = credential
            .request_sign(challenge, &self.prompt)
            .await
            .map_err(CipherError::from)?;
        tracing::debug!(
            tag,
            credential = credential.name(),
            signature_len = signature.len(),
            "challenge signed"
        );
        Ok(signature)
    }
}
