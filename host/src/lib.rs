//! `biocipher-host`: thin process shell around `biocipher-service`.
//!
//! Reads `biocipher.json`, installs logging, wires the platform backends
//! into a [`RequestFacade`] and serves the JSON-lines channel on
//! stdin/stdout until EOF.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod channel;
pub mod config;
pub mod logging;
pub mod platform;

use std::sync::Arc;

use biocipher_service::{
    AesGcmCodec, CapabilityOracle, CipherService, ConfigRegister, HelloCredentialVault,
    PlatformCapabilityOracle, RequestFacade,
};
use thiserror::Error;
use tokio::io::BufReader;

use crate::config::{Cli, HostConfig};

/// Host process errors.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("logging setup failed: {0}")]
    Logging(String),
}

/// Wire the service stack for `config`.
#[must_use]
pub fn build_facade(config: &HostConfig) -> RequestFacade {
    let tpm = platform::create_tpm_provider(config);
    let hello = platform::create_hello_platform(config);

    let oracle: Arc<dyn CapabilityOracle> =
        Arc::new(PlatformCapabilityOracle::new(tpm, Arc::clone(&hello)));
    let vault = Arc::new(HelloCredentialVault::new(
        hello,
        Arc::clone(&oracle),
        config.consent.prompt.clone(),
    ));
    let service = CipherService::new(
        oracle,
        vault,
        Arc::new(ConfigRegister::new()),
        Arc::new(AesGcmCodec),
    );
    RequestFacade::new(service)
}

/// Run the host until stdin closes.
///
/// # Errors
///
/// Returns `HostError` if logging cannot be installed, the default config
/// cannot be written, or the channel fails.
pub async fn run(cli: Cli) -> Result<(), HostError> {
    if cli.write_default_config {
        HostConfig::default().save(&cli.config)?;
        return Ok(());
    }

    let (config, warning) = HostConfig::load(&cli.config);
    let level = logging::effective_level(&config.log_level, cli.verbose);
    let _guard = logging::init(level, config.log_dir.as_deref())?;
    if let Some(warning) = warning {
        tracing::warn!("{warning}");
    }

    if let Err(e) = biocipher_crypto_core::disable_core_dumps() {
        tracing::warn!(error = %e, "core dumps remain enabled");
    }

    let facade = build_facade(&config);
    tracing::info!(
        channel = config.channel.as_str(),
        tpm = ?config.tpm.backend,
        consent = ?config.consent.mode,
        "biocipher host ready"
    );

    channel::serve(
        &facade,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;
    Ok(())
}
