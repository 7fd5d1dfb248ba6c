//! Key backends.
//!
//! The processor never touches PGP itself. It hands scalars to a
//! [`KeyBackend`], which owns keyring state and the actual crypto calls.
//!
//! ## Backends
//!
//! - **gpg**: Default. Drives the GnuPG CLI.
//!
//! ## Adding a New Backend
//!
//! 1. Implement the `KeyBackend` trait
//! 2. Add the implementation in a new file next to `gpg.rs`
//! 3. Re-export from this module

use crate::error::Result;

mod gpg;

#[cfg(any(test, feature = "test-support"))]
pub mod mock;

pub use gpg::{Gpg, GpgOptions};

/// Encrypt/decrypt/identify provider.
///
/// Implementations must tolerate concurrent calls: batch runs may share one
/// backend across files.
pub trait KeyBackend: Send + Sync {
    /// Encrypt plaintext for the configured key.
    ///
    /// Ciphertext must start with the PGP message header.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::EncryptionFailed` if encryption fails.
    fn encrypt(&self, plaintext: &str) -> Result<String>;

    /// Decrypt an armored PGP message.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::DecryptionFailed` if the private key is missing
    /// or the ciphertext is corrupt.
    fn decrypt(&self, ciphertext: &str) -> Result<String>;

    /// Identity of the key a message was encrypted for.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::KeyLookupFailed` if no key id can be read.
    fn key_identity(&self, ciphertext: &str) -> Result<String>;

    /// Backend name for display.
    fn name(&self) -> &'static str;
}
