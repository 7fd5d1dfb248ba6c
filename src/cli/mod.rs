//! Command-line interface.

pub mod completions;
pub mod create;
pub mod keys;
pub mod output;
pub mod transform;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::core::cipher::Gpg;
use crate::core::config::{Config, Settings};
use crate::core::store::{Sink, Source};
use crate::error::Result;

/// secure-pillar - Create and update encrypted content or decrypt encrypted content.
#[derive(Parser)]
#[command(
    name = "secure-pillar",
    about = "Create and update encrypted content or decrypt encrypted content",
    version,
    after_help = "Files with include directives are never processed."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Key selection and scope flags shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Profile to use from the config file
    #[arg(long, global = true, env = "SECURE_PILLAR_PROFILE")]
    pub profile: Option<String>,

    /// Config file (defaults to ~/.config/secure-pillar/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// PGP key name, email, or ID to use for encryption
    #[arg(short = 'k', long = "pgp-key", global = true)]
    pub pgp_key: Option<String>,

    /// PGP public keyring
    #[arg(long, global = true, value_name = "FILE")]
    pub pubring: Option<PathBuf>,

    /// PGP private keyring
    #[arg(long, global = true, value_name = "FILE")]
    pub secring: Option<PathBuf>,

    /// GnuPG home directory
    #[arg(long = "gnupg-home", global = true, value_name = "DIR")]
    pub gnupg_home: Option<PathBuf>,

    /// Top level element under which encrypted values are kept
    #[arg(short, long, global = true)]
    pub element: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    fn config(&self) -> Result<Config> {
        let path = match &self.config {
            Some(path) => path.clone(),
            None => match Config::default_path() {
                Ok(path) => path,
                Err(e) => {
                    debug!("skipping config: {}", e);
                    return Ok(Config::default());
                }
            },
        };
        Config::load(&path)
    }

    /// Build the gpg backend from flags and the selected profile.
    pub fn backend(&self) -> Result<Gpg> {
        let settings = Settings {
            profile: self.profile.clone(),
            pgp_key: self.pgp_key.clone(),
            pubring: self.pubring.clone(),
            secring: self.secring.clone(),
            gnupg_home: self.gnupg_home.clone(),
        };
        let options = settings.resolve(&self.config()?)?;
        debug!(?options, "gpg options");
        Ok(Gpg::new(options))
    }
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Create a new sls file
    #[command(visible_alias = "c")]
    Create {
        #[command(flatten)]
        secrets: SecretArgs,
        /// Output file (defaults to STDOUT)
        #[arg(short = 'o', long = "outfile", default_value = "-")]
        output: String,
    },

    /// Set the given names to encrypted values in an existing file
    #[command(visible_alias = "u")]
    Update {
        #[command(flatten)]
        secrets: SecretArgs,
        /// File to update (defaults to STDIN, written to STDOUT)
        #[arg(short = 'f', long = "file", default_value = "-")]
        file: String,
    },

    /// Encrypt plaintext values
    #[command(subcommand)]
    #[command(visible_alias = "e")]
    Encrypt(Target),

    /// Decrypt encrypted values (requires the private key)
    #[command(subcommand)]
    #[command(visible_alias = "d")]
    Decrypt(Target),

    /// Decrypt existing values and re-encrypt them with the given key
    #[command(visible_alias = "r")]
    Rotate(RotateArgs),

    /// Show the PGP keys values are encrypted for
    #[command(subcommand)]
    #[command(visible_alias = "k")]
    Keys(KeysTarget),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Names and values for `create` and `update`.
#[derive(Args, Debug, Clone)]
pub struct SecretArgs {
    /// Secret name; a colon path such as `app:db:password`
    #[arg(short = 'n', long = "name", required = true)]
    pub names: Vec<String>,

    /// Secret value, paired with names by position
    #[arg(short = 's', long = "value")]
    pub values: Vec<String>,
}

/// Input and output for single-file commands.
#[derive(Args, Debug, Clone)]
pub struct FileArgs {
    /// Input file (defaults to STDIN)
    #[arg(short = 'f', long = "file", default_value = "-")]
    pub input: String,

    /// Output file (defaults to STDOUT)
    #[arg(short = 'o', long = "outfile", default_value = "-")]
    pub output: String,

    /// Write back to the input file
    #[arg(short = 'u', long)]
    pub update: bool,
}

impl FileArgs {
    pub fn source(&self) -> Source {
        Source::parse(&self.input)
    }

    /// `--update` redirects output to the input file, unless input is STDIN.
    pub fn sink(&self) -> Sink {
        match self.source() {
            Source::File(path) if self.update => Sink::File(path),
            _ => Sink::parse(&self.output),
        }
    }
}

/// What `encrypt` and `decrypt` operate on.
#[derive(Subcommand, Debug, Clone)]
pub enum Target {
    /// Every value in a file
    All(FileArgs),

    /// Every .sls file under a directory, rewritten in place
    Recurse(DirArgs),

    /// The value at one path in a file
    Path {
        /// Colon path to the value
        #[arg(short = 'p', long = "path")]
        path: String,
        #[command(flatten)]
        files: FileArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct DirArgs {
    /// Directory to recurse over
    #[arg(short = 'd', long = "dir")]
    pub dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct RotateArgs {
    /// Rotate a single file instead of a directory
    #[arg(short = 'f', long = "file", required_unless_present = "dir")]
    pub input: Option<String>,

    /// Output file for --file (defaults to STDOUT)
    #[arg(short = 'o', long = "outfile")]
    pub output: Option<String>,

    /// Write back to the input file
    #[arg(short = 'u', long)]
    pub update: bool,

    /// Directory to recurse over
    #[arg(short = 'd', long = "dir", conflicts_with = "input")]
    pub dir: Option<PathBuf>,
}

/// Where a key report is read from and written to.
#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Input file (defaults to STDIN)
    #[arg(short = 'f', long = "file", default_value = "-")]
    pub input: String,

    /// Output file (defaults to STDOUT)
    #[arg(short = 'o', long = "outfile", default_value = "-")]
    pub output: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// What `keys` reports on.
#[derive(Subcommand, Debug, Clone)]
pub enum KeysTarget {
    /// Keys for every encrypted value in a file
    All(ReportArgs),

    /// Keys for every .sls file under a directory
    Recurse {
        #[command(flatten)]
        dir: DirArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Key for the value at one path
    Path {
        /// Colon path to the value
        #[arg(short = 'p', long = "path")]
        path: String,
        #[command(flatten)]
        report: ReportArgs,
    },
}

/// Execute a command.
pub fn execute(command: Command, global: GlobalArgs) -> Result<()> {
    use crate::core::action::Action;

    if let Command::Completions { shell } = command {
        return completions::execute(shell);
    }

    let backend = global.backend()?;
    let element = global.element.as_deref();

    match command {
        Command::Create { secrets, output } => create::create(&backend, &secrets, &output),
        Command::Update { secrets, file } => create::update(&backend, &secrets, &file),
        Command::Encrypt(target) => transform::execute(&backend, Action::Encrypt, target, element),
        Command::Decrypt(target) => transform::execute(&backend, Action::Decrypt, target, element),
        Command::Rotate(args) => transform::rotate(&backend, args, element),
        Command::Keys(target) => keys::execute(&backend, target, element),
        Command::Completions { .. } => Ok(()),
    }
}
