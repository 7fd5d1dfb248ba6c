//! Mock key backend for unit and integration tests.
//!
//! Uses hex encoding wrapped in PGP armor lines. NOT cryptographically
//! secure, it only exercises the plumbing. Each mock holds the key it
//! encrypts for and the set of keys it can decrypt, and counts the calls
//! made against it.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::KeyBackend;
use crate::core::constants::PGP_HEADER;
use crate::error::{CipherError, Result};

const FOOTER: &str = "-----END PGP MESSAGE-----";

#[derive(Debug)]
pub struct MockBackend {
    key: String,
    secret_keys: Vec<String>,
    calls: AtomicUsize,
}

impl MockBackend {
    /// Encrypts for `key` and holds its private half.
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            secret_keys: vec![key.to_string()],
            calls: AtomicUsize::new(0),
        }
    }

    /// Also able to decrypt messages for `key`.
    pub fn with_secret(mut self, key: &str) -> Self {
        self.secret_keys.push(key.to_string());
        self
    }

    /// Number of backend calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn split(ciphertext: &str) -> Result<(&str, &str)> {
        let body = ciphertext
            .trim()
            .strip_prefix(PGP_HEADER)
            .and_then(|s| s.strip_suffix(FOOTER))
            .ok_or_else(|| CipherError::DecryptionFailed("not a mock message".to_string()))?;
        body.trim().split_once(':').ok_or_else(|| {
            CipherError::DecryptionFailed("malformed mock message".to_string()).into()
        })
    }
}

impl KeyBackend for MockBackend {
    fn encrypt(&self, plaintext: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let hex: String = plaintext.bytes().map(|b| format!("{:02x}", b)).collect();
        Ok(format!("{}\n\n{}:{}\n{}\n", PGP_HEADER, self.key, hex, FOOTER))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (key, hex) = Self::split(ciphertext)?;
        if !self.secret_keys.iter().any(|k| k == key) {
            return Err(
                CipherError::DecryptionFailed(format!("no secret key for {}", key)).into(),
            );
        }
        let bytes: std::result::Result<Vec<u8>, _> = (0..hex.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&hex[i..i + 2], 16))
            .collect();
        let bytes =
            bytes.map_err(|e| CipherError::DecryptionFailed(format!("invalid hex: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| CipherError::DecryptionFailed(format!("invalid utf8: {}", e)).into())
    }

    fn key_identity(&self, ciphertext: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (key, _) =
            Self::split(ciphertext).map_err(|e| CipherError::KeyLookupFailed(e.to_string()))?;
        Ok(key.to_string())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Backend that fails every call.
#[derive(Debug)]
pub struct BrokenBackend;

impl KeyBackend for BrokenBackend {
    fn encrypt(&self, _plaintext: &str) -> Result<String> {
        Err(CipherError::EncryptionFailed("key revoked".to_string()).into())
    }

    fn decrypt(&self, _ciphertext: &str) -> Result<String> {
        Err(CipherError::DecryptionFailed("no secret key".to_string()).into())
    }

    fn key_identity(&self, _ciphertext: &str) -> Result<String> {
        Err(CipherError::KeyLookupFailed("no key id".to_string()).into())
    }

    fn name(&self) -> &'static str {
        "broken"
    }
}
