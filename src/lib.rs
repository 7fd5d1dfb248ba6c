//! secure-pillar - Encrypt, decrypt and inspect PGP-protected values in
//! YAML pillar files.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── create        # New pillar / add secrets to an existing one
//! │   ├── transform     # encrypt, decrypt, rotate
//! │   ├── keys          # Key identity reports
//! │   ├── output        # Terminal styling
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── document      # YAML document model
//!     ├── path          # Colon-delimited paths
//!     ├── action        # Per-scalar encrypt/decrypt/rotate/identify
//!     ├── processor     # Walks a document and applies an action
//!     ├── cipher/       # Key backends
//!     │   ├── mod       # KeyBackend trait
//!     │   └── gpg       # GnuPG CLI implementation
//!     ├── store         # Source/sink I/O and atomic writes
//!     ├── pillar        # Pillar files, rendering, jobs
//!     ├── batch         # Directory-wide runs
//!     └── config        # Profiles
//! ```
//!
//! # Features
//!
//! - Encrypts only plaintext, decrypts only ciphertext, so repeated runs are safe
//! - Whole-document, top-level element or single-path scope
//! - Key rotation in one pass
//! - Files containing include directives are never rewritten
//! - Atomic, owner-only writes

pub mod cli;
pub mod core;
pub mod error;
