//! Host configuration: command line and `biocipher.json`.
//!
//! The file only selects backends, prompt text and logging. The challenge
//! seed is never read from or written to it.
//!
//! Loading never fails: a missing or corrupt file yields defaults and
//! missing fields take their default values.

use std::fs;
use std::path::{Path, PathBuf};

use biocipher_service::{ConsentAvailability, ConsentPrompt};
use clap::Parser;
use serde::{Deserialize, Serialize};

/// Default config file name, resolved against the working directory.
pub const CONFIG_FILE: &str = "biocipher.json";

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser, Debug, Clone)]
#[command(name = "biocipher-host", version, about)]
pub struct Cli {
    /// Path to the JSON config file.
    #[arg(long, default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Raise the log level (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write the default config to `--config` and exit.
    #[arg(long)]
    pub write_default_config: bool,
}

// ---------------------------------------------------------------------------
// File model
// ---------------------------------------------------------------------------

/// Security-processor backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TpmBackend {
    /// Probe `/sys/class/tpm/tpm0`.
    #[default]
    Sysfs,
    /// Report `platformType` verbatim.
    Fixed,
    /// No provider.
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TpmConfig {
    pub backend: TpmBackend,
    pub platform_type: String,
}

impl Default for TpmConfig {
    fn default() -> Self {
        Self {
            backend: TpmBackend::Sysfs,
            platform_type: "TPM-Version:2.0".into(),
        }
    }
}

/// Consent-verifier availability reported when biometry is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AvailabilitySetting {
    #[default]
    Available,
    DeviceNotPresent,
    NotConfiguredForUser,
    DisabledByPolicy,
    DeviceBusy,
    SecurityUpdateRequired,
}

impl From<AvailabilitySetting> for ConsentAvailability {
    fn from(setting: AvailabilitySetting) -> Self {
        match setting {
            AvailabilitySetting::Available => Self::Available,
            AvailabilitySetting::DeviceNotPresent => Self::DeviceNotPresent,
            AvailabilitySetting::NotConfiguredForUser => Self::NotConfiguredForUser,
            AvailabilitySetting::DisabledByPolicy => Self::DisabledByPolicy,
            AvailabilitySetting::DeviceBusy => Self::DeviceBusy,
            AvailabilitySetting::SecurityUpdateRequired => Self::SecurityUpdateRequired,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BiometryConfig {
    pub supported: bool,
    pub availability: AvailabilitySetting,
}

impl Default for BiometryConfig {
    fn default() -> Self {
        Self {
            supported: true,
            availability: AvailabilitySetting::Available,
        }
    }
}

/// How the software credential store obtains user consent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConsentMode {
    AutoApprove,
    Deny,
    /// Ask on the controlling terminal.
    #[default]
    Terminal,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsentConfig {
    pub mode: ConsentMode,
    #[serde(flatten)]
    pub prompt: ConsentPrompt,
}

/// Channel name announced by the host; both names share one implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChannelName {
    #[default]
    #[serde(rename = "biometric_cipher")]
    BiometricCipher,
    #[serde(rename = "secure_mnemonic")]
    SecureMnemonic,
}

impl ChannelName {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BiometricCipher => "biometric_cipher",
            Self::SecureMnemonic => "secure_mnemonic",
        }
    }
}

/// Contents of `biocipher.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostConfig {
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    pub tpm: TpmConfig,
    pub biometry: BiometryConfig,
    pub consent: ConsentConfig,
    pub channel: ChannelName,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            log_dir: None,
            tpm: TpmConfig::default(),
            biometry: BiometryConfig::default(),
            consent: ConsentConfig::default(),
            channel: ChannelName::default(),
        }
    }
}

impl HostConfig {
    /// Load from `path`, falling back to defaults.
    ///
    /// Runs before logging is initialised, so problems are reported by the
    /// returned warning rather than through `tracing`.
    #[must_use]
    pub fn load(path: &Path) -> (Self, Option<String>) {
        match fs::read_to_string(path) {
            Err(_) => (Self::default(), None),
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => (config, None),
                Err(e) => (
                    Self::default(),
                    Some(format!("ignoring corrupt {}: {e}", path.display())),
                ),
            },
        }
    }

    /// Persist to `path` atomically (`.tmp` then rename).
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if the directory does not exist or the
    /// file system rejects the write or rename.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp, path)
    }
}
