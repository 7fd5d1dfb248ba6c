//! secure-pillar - PGP-protected values in YAML pillar files.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use secure_pillar::cli::output;
use secure_pillar::cli::{execute, Cli};
use secure_pillar::error::{CipherError, ConfigError, DocumentError, Error};

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries documents and reports.
    let filter = EnvFilter::try_from_env("SECURE_PILLAR_LOG").unwrap_or_else(|_| {
        if cli.global.verbose {
            EnvFilter::new("secure_pillar=debug")
        } else {
            EnvFilter::new("secure_pillar=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();

    if let Err(e) = execute(cli.command, cli.global) {
        let suggestion = match &e {
            Error::Cipher(CipherError::NoRecipient) => {
                Some("pass a key with -k or set default_key in a profile")
            }
            Error::Cipher(CipherError::Unavailable(_)) => {
                Some("install GnuPG and make sure gpg is on PATH")
            }
            Error::Config(ConfigError::ProfileNotFound(_)) => {
                Some("check the profiles in ~/.config/secure-pillar/config.toml")
            }
            Error::Document(DocumentError::IncludeDetected { .. }) => {
                Some("files with include directives are skipped; move secrets to a separate file")
            }
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
