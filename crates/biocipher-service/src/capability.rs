//! Capability Oracle: is the platform usable at all?
//!
//! Two probes, no state between calls:
//! - the security processor, read through a [`TpmProvider`] whose
//!   platform-type string carries `TPM-Version:<maj>.<min>`
//! - the biometric subsystem, read through the [`HelloPlatform`] probes

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CipherError;
use crate::hello::{ConsentAvailability, HelloPlatform};
use crate::status::{BiometryStatus, TpmStatus};

/// Lowest security-processor major version reported as supported.
pub const MIN_TPM_MAJOR_VERSION: u32 = 2;

const TPM_VERSION_TOKEN: &str = "TPM-Version:";

// ---------------------------------------------------------------------------
// Security-processor provider
// ---------------------------------------------------------------------------

/// Opaque handle to an opened storage provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderHandle(pub u64);

/// Platform storage provider backed by a security processor.
///
/// Failures carry the raw platform status.
pub trait TpmProvider: Send + Sync {
    /// Open the provider.
    ///
    /// # Errors
    ///
    /// Returns the platform status if the provider cannot be opened.
    fn open_storage_provider(&self) -> Result<ProviderHandle, u32>;

    /// Read the platform-type property, e.g. `"TPM-Version:2.0;PCR-Binding:..."`.
    ///
    /// # Errors
    ///
    /// Returns the platform status if the property cannot be read.
    fn platform_type(&self, handle: &ProviderHandle) -> Result<String, u32>;

    /// Release a handle returned by `open_storage_provider`.
    fn free_handle(&self, handle: &ProviderHandle);
}

/// Frees a provider handle when dropped.
pub struct ProviderGuard<'a> {
    provider: &'a dyn TpmProvider,
    handle: ProviderHandle,
}

impl<'a> ProviderGuard<'a> {
    /// Open `provider` and guard the resulting handle.
    ///
    /// # Errors
    ///
    /// Returns the platform status if opening fails; nothing is held then.
    pub fn open(provider: &'a dyn TpmProvider) -> Result<Self, u32> {
        let handle = provider.open_storage_provider()?;
        Ok(Self { provider, handle })
    }

    #[must_use]
    pub const fn handle(&self) -> &ProviderHandle {
        &self.handle
    }
}

impl Drop for ProviderGuard<'_> {
    fn drop(&mut self) {
        self.provider.free_handle(&self.handle);
    }
}

/// Extract the major version from a platform-type string.
///
/// Finds `TPM-Version:` and parses the digits that follow, up to the first
/// `.` or the end of the token.
///
/// # Errors
///
/// Returns `CipherError::TpmVersion` if the token is absent or the major
/// version is not numeric.
pub fn parse_tpm_major_version(platform_type: &str) -> Result<u32, CipherError> {
    let (_, rest) = platform_type.split_once(TPM_VERSION_TOKEN).ok_or_else(|| {
        CipherError::TpmVersion(format!("no {TPM_VERSION_TOKEN} token in platform type"))
    })?;
    let rest = rest.trim_start();
    let major = rest.split('.').next().unwrap_or_default();
    let digits_end = major
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(major.len());
    major[..digits_end]
        .parse::<u32>()
        .map_err(|_| CipherError::TpmVersion(format!("non-numeric major version in {rest:?}")))
}

// ---------------------------------------------------------------------------
// Oracle
// ---------------------------------------------------------------------------

/// Stable status answers over platform probes.
#[async_trait]
pub trait CapabilityOracle: Send + Sync {
    /// Security-processor status.
    ///
    /// # Errors
    ///
    /// `TpmUnsupported` if the provider cannot be opened, `TpmVersion` if
    /// the version cannot be read or parsed.
    async fn platform_status(&self) -> Result<TpmStatus, CipherError>;

    /// Biometric subsystem status.
    ///
    /// # Errors
    ///
    /// `Unknown` for an availability outcome with no mapping.
    async fn biometry_status(&self) -> Result<BiometryStatus, CipherError>;
}

/// Oracle over a [`TpmProvider`] and a [`HelloPlatform`].
pub struct PlatformCapabilityOracle {
    tpm: Arc<dyn TpmProvider>,
    hello: Arc<dyn HelloPlatform>,
}

impl PlatformCapabilityOracle {
    #[must_use]
    pub fn new(tpm: Arc<dyn TpmProvider>, hello: Arc<dyn HelloPlatform>) -> Self {
        Self { tpm, hello }
    }

    fn probe_tpm(&self) -> Result<TpmStatus, CipherError> {
        let guard = ProviderGuard::open(self.tpm.as_ref()).map_err(|status| {
            CipherError::TpmUnsupported(CipherError::status_message(
                "open storage provider",
                status,
            ))
        })?;

        let platform_type = self.tpm.platform_type(guard.handle()).map_err(|status| {
            CipherError::TpmVersion(CipherError::status_message(
                "read platform type",
                status,
            ))
        })?;

        let major = parse_tpm_major_version(&platform_type)?;
        tracing::debug!(major, "security processor version read");
        if major < MIN_TPM_MAJOR_VERSION {
            return Ok(TpmStatus::VersionUnsupported);
        }
        Ok(TpmStatus::Supported)
    }
}

#[async_trait]
impl CapabilityOracle for PlatformCapabilityOracle {
    async fn platform_status(&self) -> Result<TpmStatus, CipherError> {
        self.probe_tpm()
    }

    async fn biometry_status(&self) -> Result<BiometryStatus, CipherError> {
        if self.hello.is_supported().await {
            return Ok(BiometryStatus::Supported);
        }

        match self.hello.check_availability().await {
            ConsentAvailability::Available => Ok(BiometryStatus::Supported),
            ConsentAvailability::DeviceNotPresent => Ok(BiometryStatus::DeviceNotPresent),
            ConsentAvailability::NotConfiguredForUser => {
                Ok(BiometryStatus::NotConfiguredForUser)
            }
            ConsentAvailability::DisabledByPolicy => Ok(BiometryStatus::DisabledByPolicy),
            ConsentAvailability::DeviceBusy => Ok(BiometryStatus::DeviceBusy),
            ConsentAvailability::SecurityUpdateRequired => {
                Ok(BiometryStatus::AndroidBiometricErrorSecurityUpdateRequired)
            }
            ConsentAvailability::Other(raw) => {
                tracing::error!(raw, "unmapped consent verifier availability");
                Err(CipherError::Unknown(format!(
                    "unmapped consent verifier availability {raw}"
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn parses_version_two() {
        assert_eq!(parse_tpm_major_version("TPM-Version:2.0").unwrap(), 2);
    }

    #[test]
    fn parses_version_embedded_in_property_list() {
        let s = "TPM-Version:2.0;PCR-Binding:True;PCR-Mask:0x0";
        assert_eq!(parse_tpm_major_version(s).unwrap(), 2);
    }

    #[test]
    fn parses_version_without_minor() {
        assert_eq!(parse_tpm_major_version("TPM-Version:12").unwrap(), 12);
    }

    #[test]
    fn parses_old_version() {
        assert_eq!(parse_tpm_major_version("TPM-Version:1.2").unwrap(), 1);
    }

    #[test]
    fn missing_token_is_version_error() {
        let err = parse_tpm_major_version("PCR-Binding:True").unwrap_err();
        assert_eq!(err.code(), ErrorCode::TpmVersionError);
    }

    #[test]
    fn non_numeric_major_is_version_error() {
        let err = parse_tpm_major_version("TPM-Version:x.0").unwrap_err();
        assert_eq!(err.code(), ErrorCode::TpmVersionError);
        assert!(parse_tpm_major_version("TPM-Version:").is_err());
    }
}
