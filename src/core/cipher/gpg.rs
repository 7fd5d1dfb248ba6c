//! GPG key backend.
//!
//! Encrypts pillar values using GnuPG (GNU Privacy Guard).
//!
//! ## Requirements
//!
//! - `gpg` CLI must be installed
//! - The keyring must hold the recipient public key for encryption
//! - The matching private key must be available for decryption
//!
//! ## Usage
//!
//! Pick the key on the command line (`-k "Salt Master"`) or in a profile:
//! ```toml
//! [[profiles]]
//! name = "dev"
//! default = true
//! default_key = "Dev Salt Master"
//! gnupg_home = "~/.gnupg"
//! ```

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tracing::{debug, trace};

use super::KeyBackend;
use crate::error::{CipherError, Result};

/// Keyring and recipient selection for [`Gpg`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpgOptions {
    /// Key name, email, or ID to encrypt for.
    pub recipient: Option<String>,
    /// `--homedir` override.
    pub homedir: Option<PathBuf>,
    /// Public keyring file.
    pub keyring: Option<PathBuf>,
    /// Secret keyring file.
    pub secret_keyring: Option<PathBuf>,
}

/// GPG key backend using the gpg CLI.
///
/// Holds no keyring state of its own; every call spawns a fresh `gpg`, so
/// concurrent use is safe.
#[derive(Debug, Clone, Default)]
pub struct Gpg {
    options: GpgOptions,
}

impl Gpg {
    pub fn new(options: GpgOptions) -> Self {
        Self { options }
    }

    /// Locate the gpg binary.
    fn binary() -> Result<PathBuf> {
        which::which("gpg").map_err(|_| {
            CipherError::Unavailable(
                "gpg CLI not found. Install GnuPG from https://gnupg.org/download/".to_string(),
            )
            .into()
        })
    }

    /// Keyring arguments shared by every invocation.
    fn keyring_args(&self) -> Vec<OsString> {
        let mut args = Vec::new();
        if let Some(home) = &self.options.homedir {
            args.push("--homedir".into());
            args.push(home.into());
        }
        if let Some(ring) = &self.options.keyring {
            args.push("--no-default-keyring".into());
            args.push("--keyring".into());
            args.push(ring.into());
        }
        if let Some(ring) = &self.options.secret_keyring {
            args.push("--secret-keyring".into());
            args.push(ring.into());
        }
        args
    }

    /// Spawn gpg with `args`, feed `input` on stdin, and collect output.
    fn run(&self, args: &[&str], input: &str, fail: fn(String) -> CipherError) -> Result<Output> {
        let mut cmd = Command::new(Self::binary()?);
        cmd.args(self.keyring_args())
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| fail(format!("failed to spawn gpg: {}", e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .map_err(|e| fail(format!("failed to write to gpg: {}", e)))?;
        }

        child
            .wait_with_output()
            .map_err(|e| fail(format!("gpg command failed: {}", e)).into())
    }

    /// Resolve a key id to its primary user id.
    fn user_id(&self, key_id: &str) -> Option<String> {
        let output = self
            .run(
                &["--batch", "--with-colons", "--list-keys", key_id],
                "",
                CipherError::KeyLookupFailed,
            )
            .ok()?;
        if !output.status.success() {
            return None;
        }
        parse_user_id(&String::from_utf8_lossy(&output.stdout))
    }
}

impl KeyBackend for Gpg {
    fn encrypt(&self, plaintext: &str) -> Result<String> {
        let recipient = self
            .options
            .recipient
            .as_deref()
            .ok_or(CipherError::NoRecipient)?;
        trace!(
            recipient,
            plaintext_len = plaintext.len(),
            "encrypting with GPG"
        );

        let output = self.run(
            &[
                "--encrypt",
                "--armor",
                "--trust-model",
                "always",
                "--batch",
                "--yes",
                "--recipient",
                recipient,
            ],
            plaintext,
            CipherError::EncryptionFailed,
        )?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(
                CipherError::EncryptionFailed(format!("gpg encrypt failed: {}", stderr.trim()))
                    .into(),
            );
        }

        let ciphertext = String::from_utf8(output.stdout)
            .map_err(|e| CipherError::EncryptionFailed(format!("UTF-8 error: {}", e)))?;

        trace!(ciphertext_len = ciphertext.len(), "encrypted with GPG");
        Ok(ciphertext)
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        trace!(ciphertext_len = ciphertext.len(), "decrypting with GPG");

        let output = self.run(
            &["--decrypt", "--batch", "--yes", "--quiet"],
            ciphertext,
            CipherError::DecryptionFailed,
        )?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CipherError::DecryptionFailed(format!(
                "gpg decrypt failed: {}. Ensure you have the private key in your keyring.",
                stderr.trim()
            ))
            .into());
        }

        let plaintext = String::from_utf8(output.stdout)
            .map_err(|e| CipherError::DecryptionFailed(format!("UTF-8 error: {}", e)))?;

        trace!(plaintext_len = plaintext.len(), "decrypted with GPG");
        Ok(plaintext)
    }

    fn key_identity(&self, ciphertext: &str) -> Result<String> {
        // --list-only keeps gpg from attempting the decryption.
        let output = self.run(
            &["--batch", "--list-only", "--list-packets"],
            ciphertext,
            CipherError::KeyLookupFailed,
        )?;

        let mut listing = String::from_utf8_lossy(&output.stdout).into_owned();
        listing.push_str(&String::from_utf8_lossy(&output.stderr));

        let key_ids = parse_key_ids(&listing);
        if key_ids.is_empty() {
            return Err(CipherError::KeyLookupFailed(
                "no public key encrypted session packet found".to_string(),
            )
            .into());
        }
        debug!(keys = ?key_ids, "message recipients");

        let names: Vec<String> = key_ids
            .iter()
            .map(|id| self.user_id(id).unwrap_or_else(|| id.clone()))
            .collect();
        Ok(names.join(", "))
    }

    fn name(&self) -> &'static str {
        "gpg"
    }
}

/// Key ids from `gpg --list-packets` output, in order, without duplicates.
///
/// Matches lines like `:pubkey enc packet: version 3, algo 1, keyid 0123456789ABCDEF`.
fn parse_key_ids(listing: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for line in listing.lines().filter(|l| l.contains("pubkey enc packet")) {
        let id = line
            .split_once("keyid ")
            .map(|(_, rest)| rest.split_whitespace().next().unwrap_or_default())
            .unwrap_or_default()
            .trim_end_matches(',');
        if !id.is_empty() && !ids.iter().any(|known| known == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

/// First user id from `gpg --with-colons --list-keys` output.
fn parse_user_id(colons: &str) -> Option<String> {
    colons
        .lines()
        .find(|line| line.starts_with("uid:"))
        .and_then(|line| line.split(':').nth(9))
        .filter(|uid| !uid.is_empty())
        .map(|uid| uid.replace("\\x3a", ":"))
}
