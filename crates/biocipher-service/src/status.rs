//! Integer-valued status enums surfaced to callers.
//!
//! Discriminants are a stable ABI shared with the native plugins. Never
//! reorder or renumber.

use serde::{Deserialize, Serialize};

use crate::error::CipherError;

/// Platform security-processor status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(i32)]
pub enum TpmStatus {
    Supported = 0,
    Unsupported = 1,
    VersionUnsupported = 2,
}

impl TpmStatus {
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

impl From<TpmStatus> for i32 {
    fn from(status: TpmStatus) -> Self {
        status.as_i32()
    }
}

impl TryFrom<i32> for TpmStatus {
    type Error = CipherError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Supported),
            1 => Ok(Self::Unsupported),
            2 => Ok(Self::VersionUnsupported),
            other => Err(CipherError::InvalidArgument(format!(
                "{other} is not a valid TPM status"
            ))),
        }
    }
}

/// Biometric subsystem status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(i32)]
pub enum BiometryStatus {
    Supported = 0,
    Unsupported = 1,
    DeviceNotPresent = 2,
    NotConfiguredForUser = 3,
    DisabledByPolicy = 4,
    DeviceBusy = 5,
    /// Only reported by the mobile variant; kept so the numbering matches.
    AndroidBiometricErrorSecurityUpdateRequired = 6,
}

impl BiometryStatus {
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

impl From<BiometryStatus> for i32 {
    fn from(status: BiometryStatus) -> Self {
        status.as_i32()
    }
}

impl TryFrom<i32> for BiometryStatus {
    type Error = CipherError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Supported),
            1 => Ok(Self::Unsupported),
            2 => Ok(Self::DeviceNotPresent),
            3 => Ok(Self::NotConfiguredForUser),
            4 => Ok(Self::DisabledByPolicy),
            5 => Ok(Self::DeviceBusy),
            6 => Ok(Self::AndroidBiometricErrorSecurityUpdateRequired),
            other => Err(CipherError::InvalidArgument(format!(
                "{other} is not a valid biometry status"
            ))),
        }
    }
}
