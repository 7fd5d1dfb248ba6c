//! Batch mode: one action over every pillar file under a directory.
//!
//! Files are independent units. A failure in one is recorded and the run
//! moves on to the next.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::core::action::Action;
use crate::core::pillar::{Format, Job, Pillar};
use crate::core::processor::{KeyReport, Outcome, Processor, Scope};
use crate::core::store::{short_name, Sink, Source};
use crate::error::{DocumentError, Error, Result, StoreError};

/// What happened to each file in a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files processed successfully.
    pub processed: Vec<PathBuf>,
    /// Files with nothing to do (no values, or no encrypted values).
    pub skipped: Vec<PathBuf>,
    /// Files that failed, with the reason.
    pub failed: Vec<(PathBuf, Error)>,
    /// Key reports by file, for [`Action::Identify`].
    pub keys: BTreeMap<String, KeyReport>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.processed.len() + self.skipped.len() + self.failed.len()
    }
}

/// Find regular files under `dir` whose name contains `extension`.
///
/// Results are sorted by path. Entries that cannot be read are skipped with a
/// warning.
///
/// # Errors
///
/// Returns `StoreError::NotADirectory` if `dir` is not a directory.
pub fn find_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(StoreError::NotADirectory(short_name(dir)).into());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping unreadable entry: {}", e);
                continue;
            }
        };
        if entry.file_type().is_file() && entry.file_name().to_string_lossy().contains(extension) {
            files.push(entry.into_path());
        }
    }

    debug!(dir = %dir.display(), count = files.len(), "pillar files found");
    Ok(files)
}

/// Apply `action` to every matching file under `dir`.
///
/// Encrypt, decrypt and rotate rewrite each file in place. Identify leaves
/// files alone and collects a key report per file.
///
/// # Errors
///
/// Only fails if the directory itself cannot be walked; per-file errors are
/// collected in the report.
pub fn process_dir(
    dir: &Path,
    extension: &str,
    action: Action,
    scope: &Scope,
    processor: &Processor<'_>,
) -> Result<BatchReport> {
    let mut report = BatchReport::default();

    for path in find_files(dir, extension)? {
        let result = if action == Action::Identify {
            identify_file(&path, scope, processor).map(|keys| {
                if keys.is_empty() {
                    false
                } else {
                    report.keys.insert(short_name(&path), keys);
                    true
                }
            })
        } else {
            let job = Job {
                source: Source::File(path.clone()),
                sink: Sink::File(path.clone()),
                action,
                scope: scope.clone(),
                format: Format::Yaml,
            };
            match job.run(processor) {
                Ok(_) => Ok(true),
                Err(Error::Document(DocumentError::Empty { .. })) => Ok(false),
                Err(e) => Err(e),
            }
        };

        match result {
            Ok(true) => report.processed.push(path),
            Ok(false) => {
                debug!(file = %short_name(&path), "nothing to do");
                report.skipped.push(path);
            }
            Err(e) => {
                warn!("{}: {}", short_name(&path), e);
                report.failed.push((path, e));
            }
        }
    }

    Ok(report)
}

fn identify_file(path: &Path, scope: &Scope, processor: &Processor<'_>) -> Result<KeyReport> {
    let pillar = Pillar::open(Source::File(path.to_path_buf()))?;
    match pillar.perform(processor, Action::Identify, scope)? {
        Outcome::Keys(keys) => Ok(keys),
        Outcome::Document(_) => Ok(KeyReport::new()),
    }
}
