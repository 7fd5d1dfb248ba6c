//! Reading and writing pillar files.
//!
//! Writes go through a temp file that is synced and size-checked before it
//! replaces the destination, so a failed write never leaves a truncated
//! pillar behind.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::constants::{STDIN_NAMES, STDOUT_NAMES, TEMP_PREFIX};
use crate::error::{Result, StoreError};

/// Where a document is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    /// `-` and `/dev/stdin` select standard input.
    pub fn parse(name: &str) -> Self {
        if STDIN_NAMES.contains(&name) {
            Source::Stdin
        } else {
            Source::File(PathBuf::from(name))
        }
    }

    /// Name for messages.
    pub fn name(&self) -> String {
        match self {
            Source::Stdin => "stdin".to_string(),
            Source::File(path) => short_name(path),
        }
    }
}

/// Where output is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sink {
    Stdout,
    File(PathBuf),
}

impl Sink {
    /// `-` and `/dev/stdout` select standard output.
    pub fn parse(name: &str) -> Self {
        if STDOUT_NAMES.contains(&name) {
            Sink::Stdout
        } else {
            Sink::File(PathBuf::from(name))
        }
    }

    pub fn name(&self) -> String {
        match self {
            Sink::Stdout => "stdout".to_string(),
            Sink::File(path) => short_name(path),
        }
    }
}

/// Display a path relative to the working directory when possible.
pub fn short_name(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}

/// Create a directory and its parents, owner-only on Unix.
fn create_dirs(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() || dir.exists() {
        return Ok(());
    }

    #[cfg(unix)]
    let created = {
        use std::os::unix::fs::DirBuilderExt;
        fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
    };
    #[cfg(not(unix))]
    let created = fs::create_dir_all(dir);

    created.map_err(|source| {
        StoreError::CreateDir {
            path: dir.display().to_string(),
            source,
        }
        .into()
    })
}

/// Create an empty owner-only file.
fn create_empty(path: &Path) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path).map(drop)
}

/// Read a document's raw text.
///
/// A file that does not exist is created empty, directories included, and
/// read as an empty document.
///
/// # Errors
///
/// Returns `StoreError::IsDirectory` for a directory, `StoreError::CreateDir`
/// or `StoreError::Read` for filesystem failures.
pub fn read(source: &Source) -> Result<String> {
    let path = match source {
        Source::Stdin => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| StoreError::Read {
                    path: "stdin".to_string(),
                    source: e,
                })?;
            return Ok(text);
        }
        Source::File(path) => path,
    };

    let read_err = |e: io::Error| StoreError::Read {
        path: short_name(path),
        source: e,
    };

    if !path.exists() {
        debug!(path = %path.display(), "creating missing pillar file");
        if let Some(parent) = path.parent() {
            create_dirs(parent)?;
        }
        create_empty(path).map_err(read_err)?;
        return Ok(String::new());
    }

    if path.is_dir() {
        return Err(StoreError::IsDirectory(short_name(path)).into());
    }

    fs::read_to_string(path).map_err(|e| read_err(e).into())
}

/// Write `contents` to a sink, returning the number of bytes written.
///
/// # Errors
///
/// Returns `StoreError` if any step of the atomic write fails. The
/// destination is left as it was.
pub fn write(sink: &Sink, contents: &str) -> Result<usize> {
    match sink {
        Sink::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(contents.as_bytes())
                .and_then(|_| stdout.flush())
                .map_err(|e| StoreError::Write {
                    path: "stdout".to_string(),
                    source: e,
                })?;
            Ok(contents.len())
        }
        Sink::File(path) => {
            let written = write_atomic(path, contents.as_bytes(), |_| Ok(()))?;
            info!("wrote out to file: '{}'", short_name(path));
            Ok(written)
        }
    }
}

/// Atomically replace `dest` with `bytes`.
///
/// The temp file lives next to the destination so the final step is a
/// rename on the same filesystem. `before_commit` runs after the temp file
/// is synced and checked and before it replaces the destination.
pub(crate) fn write_atomic<F>(dest: &Path, bytes: &[u8], before_commit: F) -> Result<usize>
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    let write_err = |e: io::Error| StoreError::Write {
        path: short_name(dest),
        source: e,
    };

    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    create_dirs(&parent)?;

    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    // Dropping `tmp` on any early return removes the temp file.
    let mut tmp = tempfile::Builder::new()
        .prefix(&format!("{}{}", TEMP_PREFIX, file_name))
        .tempfile_in(&parent)
        .map_err(write_err)?;

    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;

    let copied = tmp.as_file().metadata().map_err(write_err)?.len();
    let expected = bytes.len() as u64;
    if copied != expected {
        return Err(StoreError::ShortCopy {
            path: short_name(tmp.path()),
            copied,
            expected,
        }
        .into());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o600)).map_err(write_err)?;
    }

    before_commit(tmp.path()).map_err(write_err)?;

    tmp.persist(dest).map_err(|e| write_err(e.error))?;
    debug!(path = %dest.display(), bytes = expected, "atomic write complete");

    Ok(bytes.len())
}
