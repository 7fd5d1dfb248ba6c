//! Constants used throughout secure-pillar.
//!
//! Centralizes magic strings and configuration values.

/// Marks a scalar as PGP ciphertext.
pub const PGP_HEADER: &str = "-----BEGIN PGP MESSAGE-----";

/// Renderer declaration written ahead of every transformed pillar document.
pub const RENDERER_HEADER: &str = "#!yaml|gpg\n\n";

/// Lines containing this token are treated as include directives.
pub const INCLUDE_TOKEN: &str = "include:";

/// Path segment delimiter (`some:yaml:path`).
pub const PATH_DELIMITER: char = ':';

/// Pillar file extension matched in batch mode.
pub const SLS_EXTENSION: &str = ".sls";

/// Prefix for temporary files created during atomic writes.
pub const TEMP_PREFIX: &str = "gsp-";

/// Config file location relative to HOME.
pub const CONFIG_FILE: &str = ".config/secure-pillar/config.toml";

/// Names accepted for the standard input stream.
pub const STDIN_NAMES: &[&str] = &["-", "/dev/stdin"];

/// Names accepted for the standard output stream.
pub const STDOUT_NAMES: &[&str] = &["-", "/dev/stdout"];
