//! Security-processor providers.
//!
//! ```text
//! TpmProvider (trait, biocipher-service)
//! ├── SysfsTpmProvider  (Linux /sys/class/tpm/tpm0)
//! ├── FixedTpmProvider  (configured platform-type string)
//! └── NullTpmProvider   (never opens)
//! ```

use std::fs;
use std::path::PathBuf;

use biocipher_service::{ProviderHandle, TpmProvider};

/// `NTE_DEVICE_NOT_FOUND`: no security processor present.
pub const NTE_DEVICE_NOT_FOUND: u32 = 0x8009_0035;
/// `NTE_NOT_FOUND`: the requested property does not exist.
pub const NTE_NOT_FOUND: u32 = 0x8009_0011;

const SYSFS_TPM_ROOT: &str = "/sys/class/tpm/tpm0";

/// Reads the kernel's TPM class directory.
pub struct SysfsTpmProvider {
    root: PathBuf,
}

impl SysfsTpmProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::with_root(SYSFS_TPM_ROOT)
    }

    /// Probe a different class directory.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for SysfsTpmProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TpmProvider for SysfsTpmProvider {
    fn open_storage_provider(&self) -> Result<ProviderHandle, u32> {
        if self.root.is_dir() {
            Ok(ProviderHandle(0))
        } else {
            tracing::debug!(root = %self.root.display(), "no TPM class directory");
            Err(NTE_DEVICE_NOT_FOUND)
        }
    }

    fn platform_type(&self, _handle: &ProviderHandle) -> Result<String, u32> {
        let major = fs::read_to_string(self.root.join("tpm_version_major"))
            .map_err(|_| NTE_NOT_FOUND)?;
        Ok(format!("TPM-Version:{}.0", major.trim()))
    }

    fn free_handle(&self, _handle: &ProviderHandle) {}
}

/// Reports a fixed platform-type string.
pub struct FixedTpmProvider {
    platform_type: String,
}

impl FixedTpmProvider {
    #[must_use]
    pub fn new(platform_type: impl Into<String>) -> Self {
        Self {
            platform_type: platform_type.into(),
        }
    }
}

impl TpmProvider for FixedTpmProvider {
    fn open_storage_provider(&self) -> Result<ProviderHandle, u32> {
        Ok(ProviderHandle(0))
    }

    fn platform_type(&self, _handle: &ProviderHandle) -> Result<String, u32> {
        Ok(self.platform_type.clone())
    }

    fn free_handle(&self, _handle: &ProviderHandle) {}
}

/// No security processor.
pub struct NullTpmProvider;

impl TpmProvider for NullTpmProvider {
    fn open_storage_provider(&self) -> Result<ProviderHandle, u32> {
        Err(NTE_DEVICE_NOT_FOUND)
    }

    fn platform_type(&self, _handle: &ProviderHandle) -> Result<String, u32> {
        Err(NTE_NOT_FOUND)
    }

    fn free_handle(&self, _handle: &ProviderHandle) {}
}
