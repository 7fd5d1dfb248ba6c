//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a secure-pillar command isolated from the user's environment.
    ///
    /// - HOME points at the temporary home directory
    /// - GNUPGHOME points at an (empty) keyring inside it
    /// - Current directory is the test working dir
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd =
            Command::cargo_bin("secure-pillar").expect("failed to find secure-pillar binary");
        cmd.env("HOME", self.home.path());
        cmd.env("USERPROFILE", self.home.path());
        cmd.env("GNUPGHOME", self.home.path().join(".gnupg"));
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("SECURE_PILLAR_PROFILE");
        cmd.env_remove("SECURE_PILLAR_LOG");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Run with the given arguments and collect output.
    pub fn run(&self, args: &[&str]) -> Output {
        self.cmd().args(args).output().expect("failed to run secure-pillar")
    }

    /// Shortcut for `decrypt all -f FILE`.
    pub fn decrypt_all(&self, file: &str) -> Output {
        self.run(&["decrypt", "all", "-f", file])
    }

    /// Shortcut for `encrypt all -f FILE -u`.
    pub fn encrypt_in_place(&self, file: &str) -> Output {
        self.run(&["encrypt", "all", "-f", file, "-u"])
    }

    /// Shortcut for `keys all -f FILE`.
    pub fn keys_all(&self, file: &str) -> Output {
        self.run(&["keys", "all", "-f", file])
    }
}
