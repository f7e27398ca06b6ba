//! `biocipher-service`: credential-bound cipher service.
//!
//! Associates caller tags with platform credentials, signs a configured
//! challenge behind a user-presence gesture, and turns the signature into
//! a per-call AES-256-GCM key. Platform boundaries are async traits so
//! hosts plug in their own secure store and tests plug in stand-ins.
//!
//! ```text
//! RequestFacade ──► CipherService ──► ConfigRegister   (challenge seed)
//!                                 ├─► CredentialVault  (biometric sign)
//!                                 ├─► kdf              (SHA-256)
//!                                 └─► EnvelopeCodec    (AES-256-GCM)
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod status;

pub mod capability;
pub mod hello;

pub mod credential;

pub mod config;

pub mod codec;

pub mod service;

pub mod facade;

pub use capability::{
    parse_tpm_major_version, CapabilityOracle, PlatformCapabilityOracle, ProviderGuard,
    ProviderHandle, TpmProvider, MIN_TPM_MAJOR_VERSION,
};
pub use codec::{AesGcmCodec, EnvelopeCodec};
pub use config::ConfigRegister;
pub use credential::{CredentialVault, HelloCredentialVault};
pub use error::{CipherError, ErrorCode};
pub use facade::{ArgumentName, MethodName, MethodResult, RequestFacade};
pub use hello::{
    ConsentAvailability, ConsentPrompt, ForegroundScope, HelloPlatform, KeyCredential,
    KeyCredentialStatus,
};
pub use service::CipherService;
pub use status::{BiometryStatus, TpmStatus};
