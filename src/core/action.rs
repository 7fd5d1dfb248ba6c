//! Leaf-level actions applied to string scalars.

use std::fmt;
use zeroize::Zeroizing;

use crate::core::cipher::KeyBackend;
use crate::core::constants::PGP_HEADER;
use crate::error::{CipherError, Result};

/// What to do with each secure value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Encrypt plaintext values; ciphertext is left alone.
    Encrypt,
    /// Decrypt ciphertext values; plaintext is left alone.
    Decrypt,
    /// Decrypt with whatever key works, re-encrypt with the current key.
    Rotate,
    /// Report which key each ciphertext was encrypted for.
    Identify,
}

impl Action {
    /// Whether this action rewrites the document.
    pub fn transforms(self) -> bool {
        !matches!(self, Action::Identify)
    }

    /// Apply the action to a single string scalar.
    ///
    /// | action   | plaintext             | ciphertext              |
    /// |----------|-----------------------|-------------------------|
    /// | encrypt  | encrypted             | unchanged               |
    /// | decrypt  | unchanged             | decrypted               |
    /// | rotate   | encrypted             | decrypted, re-encrypted |
    /// | identify | `NotEncrypted` error  | key identity            |
    ///
    /// # Errors
    ///
    /// Propagates backend failures unchanged.
    pub fn apply_scalar(self, backend: &dyn KeyBackend, value: &str) -> Result<String> {
        match self {
            Action::Encrypt => encrypt(backend, value),
            Action::Decrypt => decrypt(backend, value).map(|plain| String::clone(&plain)),
            Action::Rotate => {
                let plain = decrypt(backend, value)?;
                backend.encrypt(&plain)
            }
            Action::Identify => {
                if !is_encrypted(value) {
                    return Err(CipherError::NotEncrypted.into());
                }
                backend.key_identity(value)
            }
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Encrypt => "encrypt",
            Action::Decrypt => "decrypt",
            Action::Rotate => "rotate",
            Action::Identify => "keys",
        };
        f.write_str(name)
    }
}

/// True if the text carries the PGP message header anywhere.
pub fn is_encrypted(value: &str) -> bool {
    value.contains(PGP_HEADER)
}

fn encrypt(backend: &dyn KeyBackend, value: &str) -> Result<String> {
    if is_encrypted(value) {
        return Ok(value.to_string());
    }
    backend.encrypt(value)
}

fn decrypt(backend: &dyn KeyBackend, value: &str) -> Result<Zeroizing<String>> {
    if !is_encrypted(value) {
        return Ok(Zeroizing::new(value.to_string()));
    }
    backend.decrypt(value).map(Zeroizing::new)
}
