//! Software credential store for hosts without a native one.
//!
//! Ed25519 keypairs live in process memory, one per tag, and vanish when
//! the process exits. Ed25519 signatures are deterministic, so a given
//! `(tag, challenge)` pair always yields the same signature and therefore
//! the same session key. Creating and signing both go through the
//! configured [`ConsentGate`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use biocipher_crypto_core::SecretBuffer;
use biocipher_service::{
    ConsentAvailability, ConsentPrompt, HelloPlatform, KeyCredential, KeyCredentialStatus,
};
use ring::rand::SystemRandom;
use ring::signature::{Ed25519KeyPair, KeyPair};

use super::consent::ConsentGate;

type Credentials = HashMap<String, Arc<Ed25519KeyPair>>;

/// In-memory [`HelloPlatform`].
pub struct SoftwareHelloPlatform {
    supported: bool,
    availability: ConsentAvailability,
    consent: Arc<dyn ConsentGate>,
    credentials: Mutex<Credentials>,
    rng: SystemRandom,
}

impl SoftwareHelloPlatform {
    #[must_use]
    pub fn new(
        supported: bool,
        availability: ConsentAvailability,
        consent: Arc<dyn ConsentGate>,
    ) -> Self {
        Self {
            supported,
            availability,
            consent,
            credentials: Mutex::new(HashMap::new()),
            rng: SystemRandom::new(),
        }
    }

    fn credentials(&self) -> MutexGuard<'_, Credentials> {
        self.credentials
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn generate_keypair(&self) -> Result<Ed25519KeyPair, KeyCredentialStatus> {
        let pkcs8 = Ed25519KeyPair::generate_pkcs8(&self.rng).map_err(|_| {
            tracing::error!("Ed25519 key generation failed");
            KeyCredentialStatus::UnknownError
        })?;
        Ed25519KeyPair::from_pkcs8(pkcs8.as_ref()).map_err(|_| {
            tracing::error!("generated Ed25519 key was rejected");
            KeyCredentialStatus::UnknownError
        })
    }
}

#[async_trait]
impl HelloPlatform for SoftwareHelloPlatform {
    async fn is_supported(&self) -> bool {
        self.supported
    }

    async fn check_availability(&self) -> ConsentAvailability {
        self.availability
    }

    async fn request_create(
        &self,
        tag: &str,
        prompt: &ConsentPrompt,
    ) -> Result<(), KeyCredentialStatus> {
        if self.credentials().contains_key(tag) {
            return Err(KeyCredentialStatus::CredentialAlreadyExists);
        }

        self.consent.confirm(prompt).await?;

        let keypair = self.generate_keypair()?;
        let public_len = keypair.public_key().as_ref().len();

        let mut credentials = self.credentials();
        if credentials.contains_key(tag) {
            return Err(KeyCredentialStatus::CredentialAlreadyExists);
        }
        credentials.insert(tag.to_owned(), Arc::new(keypair));
        drop(credentials);

        tracing::debug!(tag, public_len, "software credential created");
        Ok(())
    }

    async fn open(&self, tag: &str) -> Result<Box<dyn KeyCredential>, KeyCredentialStatus> {
        let keypair = self
            .credentials()
            .get(tag)
            .cloned()
            .ok_or(KeyCredentialStatus::NotFound)?;
        Ok(Box::new(SoftwareCredential {
            name: tag.to_owned(),
            keypair,
            consent: Arc::clone(&self.consent),
        }))
    }

    async fn delete(&self, tag: &str) -> Result<(), KeyCredentialStatus> {
        self.credentials()
            .remove(tag)
            .map(|_| ())
            .ok_or(KeyCredentialStatus::NotFound)
    }
}

struct SoftwareCredential {
    name: String,
    keypair: Arc<Ed25519KeyPair>,
    consent: Arc<dyn ConsentGate>,
}

#[async_trait]
impl KeyCredential for SoftwareCredential {
    fn name(&self) -> &str {
        &self.name
    }

    async fn request_sign(
        &self,
        challenge: &[u8],
        prompt: &ConsentPrompt,
    ) -> Result<SecretBuffer, KeyCredentialStatus> {
        self.consent.confirm(prompt).await?;
        let signature = self.keypair.sign(challenge);
        SecretBuffer::new(signature.as_ref()).map_err(|_| KeyCredentialStatus::UnknownError)
    }
}
