//! `biocipher-crypto-core`: envelope cryptography for biocipher.
//!
//! This crate is the audit target: zero platform I/O, zero async.
//! It turns a platform signature into a session key and seals caller
//! payloads into `nonce || ciphertext || tag` envelopes.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod memory;

pub mod encoding;

pub mod kdf;

pub mod envelope;

pub use encoding::{decode_utf16le, encode_utf16le};
pub use envelope::{open, open_base64, seal, seal_base64, Envelope, KEY_LEN, NONCE_LEN, TAG_LEN};
pub use error::CryptoError;
pub use kdf::{derive_session_key, SessionKey, SESSION_KEY_LEN};
pub use memory::{disable_core_dumps, SecretBuffer, SecretBytes};
