//! Test support utilities for secure-pillar integration tests.
//!
//! Provides isolated temp directories, binary commands and an in-process
//! key backend.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;
pub mod skip;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use secure_pillar::core::cipher::mock::MockBackend;
#[allow(unused_imports)]
pub use fixtures::*;

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test environment with isolated temp directories.
///
/// Each test gets its own working dir and home dir. No process-global state
/// is mutated; child processes use `.current_dir()` and explicit env vars, so
/// tests can safely run in parallel.
pub struct Test {
    /// Working directory for pillar files
    pub dir: TempDir,
    /// Temporary home directory (config file and GnuPG home live here)
    pub home: TempDir,
}

impl Test {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = TempDir::new().expect("failed to create temp home");
        Self { dir, home }
    }

    /// Absolute path of a file in the working dir.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write a file in the working dir, creating parents.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        fs::write(&path, contents).expect("failed to write file");
        path
    }

    /// Read a file from the working dir.
    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).expect("failed to read file")
    }

    /// Write a config file into the home dir's default location.
    pub fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.home.path().join(".config/secure-pillar/config.toml");
        fs::create_dir_all(path.parent().unwrap()).expect("failed to create config dir");
        fs::write(&path, contents).expect("failed to write config");
        path
    }
}
