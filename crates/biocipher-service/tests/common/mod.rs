//! Deterministic platform stand-ins shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use biocipher_crypto_core::SecretBuffer;
use biocipher_service::{
    AesGcmCodec, CapabilityOracle, CipherService, ConfigRegister, ConsentAvailability, ConsentPrompt,
    ForegroundScope, HelloCredentialVault, HelloPlatform, KeyCredential, KeyCredentialStatus,
    PlatformCapabilityOracle, ProviderHandle, RequestFacade, TpmProvider,
};

/// `0x00 .. 0x01`: 31 zero bytes then a one.
pub fn fixed_signature() -> Vec<u8> {
    let mut sig = vec![0u8; 32];
    sig[31] = 0x01;
    sig
}

// ---------------------------------------------------------------------------
// TPM
// ---------------------------------------------------------------------------

pub struct MockTpm {
    pub open_status: Option<u32>,
    pub platform_type: Result<String, u32>,
    pub opened: AtomicUsize,
    pub freed: AtomicUsize,
}

impl MockTpm {
    pub fn with_version(platform_type: &str) -> Self {
        Self {
            open_status: None,
            platform_type: Ok(platform_type.to_owned()),
            opened: AtomicUsize::new(0),
            freed: AtomicUsize::new(0),
        }
    }

    pub fn failing_open(status: u32) -> Self {
        Self {
            open_status: Some(status),
            ..Self::with_version("")
        }
    }

    pub fn failing_property(status: u32) -> Self {
        Self {
            platform_type: Err(status),
            ..Self::with_version("")
        }
    }
}

impl TpmProvider for MockTpm {
    fn open_storage_provider(&self) -> Result<ProviderHandle, u32> {
        if let Some(status) = self.open_status {
            return Err(status);
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(ProviderHandle(7))
    }

    fn platform_type(&self, handle: &ProviderHandle) -> Result<String, u32> {
        assert_eq!(handle.0, 7);
        self.platform_type.clone()
    }

    fn free_handle(&self, _handle: &ProviderHandle) {
        self.freed.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Credential store
// ---------------------------------------------------------------------------

pub struct MockHello {
    pub supported: bool,
    pub availability: ConsentAvailability,
    pub tags: Mutex<HashSet<String>>,
    /// Forced outcome for every sign request.
    pub sign_outcome: Mutex<Option<KeyCredentialStatus>>,
    /// Forced outcome for every create request.
    pub create_outcome: Mutex<Option<KeyCredentialStatus>>,
    /// Forced outcome for every delete request.
    pub delete_outcome: Mutex<Option<KeyCredentialStatus>>,
    pub opens: AtomicUsize,
    pub signs: Arc<AtomicUsize>,
    pub scopes_released: Arc<AtomicUsize>,
    pub last_challenge: Arc<Mutex<Vec<u8>>>,
}

impl MockHello {
    pub fn supported() -> Self {
        Self {
            supported: true,
            availability: ConsentAvailability::Available,
            tags: Mutex::new(HashSet::new()),
            sign_outcome: Mutex::new(None),
            create_outcome: Mutex::new(None),
            delete_outcome: Mutex::new(None),
            opens: AtomicUsize::new(0),
            signs: Arc::new(AtomicUsize::new(0)),
            scopes_released: Arc::new(AtomicUsize::new(0)),
            last_challenge: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn unsupported(availability: ConsentAvailability) -> Self {
        Self {
            supported: false,
            availability,
            ..Self::supported()
        }
    }

    pub fn with_tag(self, tag: &str) -> Self {
        self.tags.lock().unwrap().insert(tag.to_owned());
        self
    }

    pub fn vault_touches(&self) -> usize {
        self.opens.load(Ordering::SeqCst) + self.signs.load(Ordering::SeqCst)
    }
}

struct MockCredential {
    name: String,
    outcome: Option<KeyCredentialStatus>,
    signs: Arc<AtomicUsize>,
    last_challenge: Arc<Mutex<Vec<u8>>>,
}

#[async_trait]
impl KeyCredential for MockCredential {
    fn name(&self) -> &str {
        &self.name
    }

    async fn request_sign(
        &self,
        challenge: &[u8],
        _prompt: &ConsentPrompt,
    ) -> Result<SecretBuffer, KeyCredentialStatus> {
        self.signs.fetch_add(1, Ordering::SeqCst);
        *self.last_challenge.lock().unwrap() = challenge.to_vec();
        if let Some(status) = self.outcome {
            return Err(status);
        }
        Ok(SecretBuffer::from_vec(fixed_signature()).unwrap())
    }
}

#[async_trait]
impl HelloPlatform for MockHello {
    async fn is_supported(&self) -> bool {
        self.supported
    }

    async fn check_availability(&self) -> ConsentAvailability {
        self.availability
    }

    async fn request_create(
        &self,
        tag: &str,
        _prompt: &ConsentPrompt,
    ) -> Result<(), KeyCredentialStatus> {
        if let Some(status) = *self.create_outcome.lock().unwrap() {
            return Err(status);
        }
        if self.tags.lock().unwrap().insert(tag.to_owned()) {
            Ok(())
        } else {
            Err(KeyCredentialStatus::CredentialAlreadyExists)
        }
    }

    async fn open(&self, tag: &str) -> Result<Box<dyn KeyCredential>, KeyCredentialStatus> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if !self.tags.lock().unwrap().contains(tag) {
            return Err(KeyCredentialStatus::NotFound);
        }
        Ok(Box::new(MockCredential {
            name: tag.to_owned(),
            outcome: *self.sign_outcome.lock().unwrap(),
            signs: Arc::clone(&self.signs),
            last_challenge: Arc::clone(&self.last_challenge),
        }))
    }

    async fn delete(&self, tag: &str) -> Result<(), KeyCredentialStatus> {
        if let Some(status) = *self.delete_outcome.lock().unwrap() {
            return Err(status);
        }
        if self.tags.lock().unwrap().remove(tag) {
            Ok(())
        } else {
            Err(KeyCredentialStatus::NotFound)
        }
    }

    fn foreground_scope(&self) -> ForegroundScope {
        let released = Arc::clone(&self.scopes_released);
        ForegroundScope::new(move || {
            released.fetch_add(1, Ordering::SeqCst);
        })
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub struct Harness {
    pub tpm: Arc<MockTpm>,
    pub hello: Arc<MockHello>,
    pub config: Arc<ConfigRegister>,
    pub service: CipherService,
    pub facade: RequestFacade,
}

pub fn harness(tpm: MockTpm, hello: MockHello) -> Harness {
    let tpm = Arc::new(tpm);
    let hello = Arc::new(hello);
    let oracle = Arc::new(PlatformCapabilityOracle::new(
        Arc::clone(&tpm) as Arc<dyn TpmProvider>,
        Arc::clone(&hello) as Arc<dyn HelloPlatform>,
    ));
    let vault = Arc::new(HelloCredentialVault::new(
        Arc::clone(&hello) as Arc<dyn HelloPlatform>,
        Arc::clone(&oracle) as Arc<dyn CapabilityOracle>,
        ConsentPrompt::default(),
    ));
    let config = Arc::new(ConfigRegister::new());
    let service = CipherService::new(oracle, vault, Arc::clone(&config), Arc::new(AesGcmCodec));
    let facade = RequestFacade::new(service.clone());
    Harness {
        tpm,
        hello,
        config,
        service,
        facade,
    }
}

pub fn default_harness() -> Harness {
    harness(MockTpm::with_version("TPM-Version:2.0"), MockHello::supported())
}
