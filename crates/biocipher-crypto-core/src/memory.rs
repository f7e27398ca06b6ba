//! Holders for signature buffers, decoded plaintext and session keys.
//!
//! Contents are wiped on drop, pinned in RAM when the OS allows it, and
//! never printed.

use crate::error::CryptoError;
use secrecy::{ExposeSecret, SecretSlice};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Best-effort `mlock` of a byte range, released on drop.
struct PageLock {
    start: *const u8,
    len: usize,
    held: bool,
}

// SAFETY: `start` is never dereferenced, only passed back to munlock.
unsafe impl Send for PageLock {}
unsafe impl Sync for PageLock {}

impl PageLock {
    fn acquire(bytes: &[u8]) -> Self {
        Self {
            start: bytes.as_ptr(),
            len: bytes.len(),
            held: sys::lock(bytes.as_ptr(), bytes.len()),
        }
    }

    const fn none() -> Self {
        Self {
            start: std::ptr::null(),
            len: 0,
            held: false,
        }
    }
}

impl Drop for PageLock {
    fn drop(&mut self) {
        if self.held {
            sys::unlock(self.start, self.len);
        }
    }
}

/// Sensitive bytes whose length is decided at runtime: a credential's
/// signature or the plaintext recovered from an envelope.
pub struct SecretBuffer {
    bytes: SecretSlice<u8>,
    lock: PageLock,
}

impl SecretBuffer {
    /// Copy `data` into a fresh buffer. The caller wipes its own copy.
    ///
    /// # Errors
    ///
    /// Never fails today; kept fallible for allocators that refuse locked pages.
    pub fn new(data: &[u8]) -> Result<Self, CryptoError> {
        Self::from_vec(data.to_vec())
    }

    /// Adopt `data` as is.
    ///
    /// # Errors
    ///
    /// As [`SecretBuffer::new`].
    pub fn from_vec(data: Vec<u8>) -> Result<Self, CryptoError> {
        let bytes = SecretSlice::from(data);
        let lock = PageLock::acquire(bytes.expose_secret());
        Ok(Self { bytes, lock })
    }

    #[must_use]
    pub fn expose(&self) -> &[u8] {
        self.bytes.expose_secret()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.expose().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }

    /// Whether the backing pages are pinned. Empty buffers report `true`.
    #[must_use]
    pub const fn is_pinned(&self) -> bool {
        self.lock.held
    }
}

impl fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBuffer({} bytes)", self.len())
    }
}

/// Fixed-width secret such as the 32-byte session key.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretBytes<const N: usize> {
    bytes: [u8; N],
    #[zeroize(skip)]
    lock: PageLock,
}

impl<const N: usize> SecretBytes<N> {
    /// Take ownership of `data`. The pin is taken at the construction
    /// address; wiping on drop does not rely on it.
    #[must_use]
    pub fn new(data: [u8; N]) -> Self {
        let mut secret = Self {
            bytes: data,
            lock: PageLock::none(),
        };
        secret.lock = PageLock::acquire(&secret.bytes);
        secret
    }

    #[must_use]
    pub const fn expose(&self) -> &[u8; N] {
        &self.bytes
    }
}

impl<const N: usize> fmt::Debug for SecretBytes<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes<{N}>(***)")
    }
}

impl<const N: usize> From<[u8; N]> for SecretBytes<N> {
    fn from(data: [u8; N]) -> Self {
        Self::new(data)
    }
}

/// Drop `RLIMIT_CORE` to zero so a crash of the host cannot leave the
/// challenge seed or a session key in a core file. Does nothing off Unix.
///
/// # Errors
///
/// `CryptoError::SecureMemory` when `setrlimit` is refused.
pub fn disable_core_dumps() -> Result<(), CryptoError> {
    sys::no_core_dumps()
}

#[cfg(unix)]
mod sys {
    use crate::error::CryptoError;

    pub(super) fn lock(start: *const u8, len: usize) -> bool {
        if len == 0 {
            return true;
        }
        // SAFETY: mlock validates the range itself and reports ENOMEM.
        unsafe { libc::mlock(start.cast(), len) == 0 }
    }

    pub(super) fn unlock(start: *const u8, len: usize) {
        if len > 0 {
            // SAFETY: same range that was passed to mlock.
            unsafe {
                libc::munlock(start.cast(), len);
            }
        }
    }

    pub(super) fn no_core_dumps() -> Result<(), CryptoError> {
        let zero = libc::rlimit {
            rlim_cur: 0,
            rlim_max: 0,
        };
        // SAFETY: plain POSIX call with a valid struct.
        match unsafe { libc::setrlimit(libc::RLIMIT_CORE, &raw const zero) } {
            0 => Ok(()),
            _ => Err(CryptoError::SecureMemory(format!(
                "setrlimit(RLIMIT_CORE) failed: {}",
                std::io::Error::last_os_error()
            ))),
        }
    }
}

#[cfg(not(unix))]
mod sys {
    use crate::error::CryptoError;

    pub(super) const fn lock(_start: *const u8, _len: usize) -> bool {
        false
    }

    pub(super) const fn unlock(_start: *const u8, _len: usize) {}

    pub(super) const fn no_core_dumps() -> Result<(), CryptoError> {
        Ok(())
    }
}
