//! Configuration profiles.
//!
//! Profiles live in `~/.config/secure-pillar/config.toml` and supply a default
//! key and keyring locations, so day-to-day commands don't need `-k` and ring
//! flags every time.
//!
//! ```toml
//! [[profiles]]
//! name = "dev"
//! default = true
//! default_key = "Dev Salt Master"
//! gnupg_home = "~/.gnupg"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::cipher::GpgOptions;
use crate::core::constants;
use crate::error::{ConfigError, Result};

/// Contents of the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

/// A named set of key defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    /// Used when no profile is named.
    #[serde(default)]
    pub default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_key: Option<String>,
    /// Takes precedence over the ring paths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gnupg_home: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_pub_ring: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_sec_ring: Option<String>,
}

impl Config {
    /// Default config file location under the home directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoHome` if the home directory is unknown.
    pub fn default_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(constants::CONFIG_FILE))
            .ok_or_else(|| ConfigError::NoHome.into())
    }

    /// Load a config file. A missing file is an empty config.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadFile` or `ConfigError::Parse`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Self = toml::from_str(&contents).map_err(ConfigError::Parse)?;
        debug!(path = %path.display(), profiles = config.profiles.len(), "config loaded");
        Ok(config)
    }

    /// Pick a profile by name, or the default one when no name is given.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ProfileNotFound` for an unknown name.
    pub fn select(&self, name: Option<&str>) -> Result<Option<&Profile>> {
        match name {
            Some(name) => self
                .profiles
                .iter()
                .find(|p| p.name == name)
                .map(Some)
                .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()).into()),
            None => Ok(self.profiles.iter().find(|p| p.default)),
        }
    }
}

/// Key selection from the command line, before profiles are applied.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub profile: Option<String>,
    pub pgp_key: Option<String>,
    pub pubring: Option<PathBuf>,
    pub secring: Option<PathBuf>,
    pub gnupg_home: Option<PathBuf>,
}

impl Settings {
    /// Combine flags, profile and environment into backend options.
    ///
    /// Flags win over the profile. The profile is only consulted when no key
    /// was given on the command line.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ProfileNotFound` for an unknown profile name.
    pub fn resolve(&self, config: &Config) -> Result<GpgOptions> {
        let env_home = std::env::var_os("GNUPGHOME").map(PathBuf::from);
        self.resolve_with(config, env_home)
    }

    fn resolve_with(&self, config: &Config, env_home: Option<PathBuf>) -> Result<GpgOptions> {
        let profile = if self.pgp_key.is_some() {
            None
        } else {
            config.select(self.profile.as_deref())?
        };
        if let Some(profile) = profile {
            debug!(profile = %profile.name, "using profile");
        }

        let recipient = self
            .pgp_key
            .clone()
            .or_else(|| profile.and_then(|p| p.default_key.clone()));

        let profile_home = profile.and_then(|p| p.gnupg_home.as_deref()).map(expand_tilde);
        let homedir = self.gnupg_home.clone().or(profile_home).or(env_home);

        // A home directory carries its own rings.
        let ring_profile = profile.filter(|_| homedir.is_none());
        let keyring = self.pubring.clone().or_else(|| {
            ring_profile
                .and_then(|p| p.default_pub_ring.as_deref())
                .map(expand_tilde)
        });
        let secret_keyring = self.secring.clone().or_else(|| {
            ring_profile
                .and_then(|p| p.default_sec_ring.as_deref())
                .map(expand_tilde)
        });

        Ok(GpgOptions {
            recipient,
            homedir,
            keyring,
            secret_keyring,
        })
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let rest = if path == "~" {
        Some("")
    } else {
        path.strip_prefix("~/")
    };
    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
