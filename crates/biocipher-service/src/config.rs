//! Configuration Register: the challenge seed and its `configured` flag.
//!
//! The seed is long-lived sensitive material. It is never logged and is
//! zeroized whenever it is replaced or the register is dropped.

use std::sync::{PoisonError, RwLock, RwLockWriteGuard};

use zeroize::Zeroizing;

use crate::error::CipherError;

#[derive(Default)]
struct ConfigState {
    configured: bool,
    seed: Zeroizing<String>,
}

/// Holds the challenge seed. Invariant: `configured` implies a non-empty seed.
#[derive(Default)]
pub struct ConfigRegister {
    state: RwLock<ConfigState>,
}

impl ConfigRegister {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self) -> RwLockWriteGuard<'_, ConfigState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the seed.
    ///
    /// The register is marked unconfigured before validation, so a rejected
    /// seed also discards the previous one.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::Configure` if `seed` is empty.
    pub fn set(&self, seed: &str) -> Result<(), CipherError> {
        let mut state = self.write();
        state.configured = false;

        if seed.is_empty() {
            tracing::warn!("rejected empty challenge seed; register is unconfigured");
            return Err(CipherError::Configure(
                "Field 'dataToSign' can't be empty".into(),
            ));
        }

        // Dropping the old Zeroizing<String> wipes it.
        state.seed = Zeroizing::new(seed.to_owned());
        state.configured = true;
        drop(state);

        tracing::debug!("challenge seed configured");
        Ok(())
    }

    /// Whether a seed is set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .configured
    }

    /// A copy of the seed, or `None` when unconfigured.
    ///
    /// The flag and the seed are read under one lock.
    #[must_use]
    pub fn seed(&self) -> Option<Zeroizing<String>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .configured
            .then(|| Zeroizing::new(state.seed.as_str().to_owned()))
    }
}

impl std::fmt::Debug for ConfigRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigRegister")
            .field("configured", &self.is_configured())
            .field("seed", &"***")
            .finish()
    }
}
