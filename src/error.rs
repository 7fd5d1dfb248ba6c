//! Error types.
//!
//! Each concern gets its own enum; [`Error`] wraps them so callers can
//! propagate with `?` and still match on the specific failure.

use thiserror::Error;

/// Top-level error for all secure-pillar operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Problems with the document itself: it cannot or must not be processed.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("{file} contains include directives")]
    IncludeDetected { file: String },

    #[error("unable to parse {file}: {reason}")]
    Parse { file: String, reason: String },

    #[error("{file} has no values to format")]
    Empty { file: String },

    #[error("unable to format {file}: {reason}")]
    Format { file: String, reason: String },
}

impl DocumentError {
    /// Attach a file name to an error raised before the source was known.
    pub fn in_file(self, name: &str) -> Self {
        match self {
            Self::IncludeDetected { .. } => Self::IncludeDetected {
                file: name.to_string(),
            },
            Self::Parse { reason, .. } => Self::Parse {
                file: name.to_string(),
                reason,
            },
            Self::Empty { .. } => Self::Empty {
                file: name.to_string(),
            },
            Self::Format { reason, .. } => Self::Format {
                file: name.to_string(),
                reason,
            },
        }
    }
}

/// A scope or path that does not fit the document's structure.
#[derive(Error, Debug)]
pub enum PathError {
    #[error("cannot set '{path}': segment '{segment}' is not a mapping")]
    Conflict { path: String, segment: String },

    #[error("no value at path '{0}'")]
    NotFound(String),

    #[error("value at path '{0}' is not a string")]
    NotScalar(String),
}

/// Key backend failures.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("error decrypting value: {0}")]
    DecryptionFailed(String),

    #[error("key lookup failed: {0}")]
    KeyLookupFailed(String),

    #[error("value is not encrypted")]
    NotEncrypted,

    #[error("no PGP key given for encryption")]
    NoRecipient,

    #[error("{0}")]
    Unavailable(String),
}

/// Reading and writing pillar files.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("error creating sls path {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {copied}/{expected} bytes copied")]
    ShortCopy {
        path: String,
        copied: u64,
        expected: u64,
    },

    #[error("{0} is a directory")]
    IsDirectory(String),

    #[error("{0} is not a directory")]
    NotADirectory(String),
}

/// Configuration file and profile errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    #[error("unable to determine home directory")]
    NoHome,
}

pub type Result<T> = std::result::Result<T, Error>;
