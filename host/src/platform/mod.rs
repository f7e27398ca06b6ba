//! Platform backends selected by host configuration.

pub mod consent;
pub mod hello;
pub mod tpm;

use std::sync::Arc;

use biocipher_service::{HelloPlatform, TpmProvider};

use crate::config::{HostConfig, TpmBackend};

/// Security-processor provider for the configured backend.
#[must_use]
pub fn create_tpm_provider(config: &HostConfig) -> Arc<dyn TpmProvider> {
    match config.tpm.backend {
        TpmBackend::Sysfs => Arc::new(tpm::SysfsTpmProvider::new()),
        TpmBackend::Fixed => Arc::new(tpm::FixedTpmProvider::new(
            config.tpm.platform_type.clone(),
        )),
        TpmBackend::None => Arc::new(tpm::NullTpmProvider),
    }
}

/// Credential store for the configured biometry and consent settings.
#[must_use]
pub fn create_hello_platform(config: &HostConfig) -> Arc<dyn HelloPlatform> {
    let consent: Arc<dyn consent::ConsentGate> =
        Arc::from(consent::create_consent_gate(config.consent.mode));
    Arc::new(hello::SoftwareHelloPlatform::new(
        config.biometry.supported,
        config.biometry.availability.into(),
        consent,
    ))
}
