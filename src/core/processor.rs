//! Secure-value processor.
//!
//! Walks a document and applies an [`Action`] to every string scalar it
//! reaches. Sequences and mappings are rebuilt from their transformed
//! children; nothing else is touched. The first failing leaf aborts the walk.

use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info_span, trace};

use crate::core::action::{is_encrypted, Action};
use crate::core::cipher::KeyBackend;
use crate::core::document::{Document, Mapping, Value};
use crate::core::path::{self, YamlPath};
use crate::error::{CipherError, PathError, Result};

/// Path to key identity, produced by [`Action::Identify`].
pub type KeyReport = BTreeMap<String, String>;

/// Which part of a document an action covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Scope {
    /// The whole document.
    #[default]
    All,
    /// Only the subtree under one top-level key.
    Element(String),
    /// Exactly one value.
    Path(YamlPath),
}

impl Scope {
    /// Element scope from an optional, possibly empty name.
    pub fn element(name: Option<&str>) -> Self {
        match name {
            Some(name) if !name.is_empty() => Scope::Element(name.to_string()),
            _ => Scope::All,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::All => f.write_str("all"),
            Scope::Element(name) => write!(f, "element {}", name),
            Scope::Path(path) => write!(f, "path {}", path),
        }
    }
}

/// Result of [`Processor::perform`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The transformed document.
    Document(Document),
    /// Key identities found, for [`Action::Identify`].
    Keys(KeyReport),
}

/// Applies actions to documents through a key backend.
pub struct Processor<'a> {
    backend: &'a dyn KeyBackend,
}

impl<'a> Processor<'a> {
    pub fn new(backend: &'a dyn KeyBackend) -> Self {
        Self { backend }
    }

    /// Recursively apply `action` to every string scalar under `value`.
    ///
    /// Sequence order and length and mapping keys are preserved. `null`,
    /// booleans and numbers pass through.
    ///
    /// # Errors
    ///
    /// Returns the first leaf error; no partial result is produced.
    pub fn apply(&self, value: Value, action: Action) -> Result<Value> {
        Ok(match value {
            Value::String(s) => Value::String(action.apply_scalar(self.backend, &s)?),
            Value::Sequence(items) => Value::Sequence(
                items
                    .into_iter()
                    .map(|item| self.apply(item, action))
                    .collect::<Result<_>>()?,
            ),
            Value::Mapping(map) => Value::Mapping(self.apply_mapping(map, action)?),
            other @ (Value::Null | Value::Bool(_) | Value::Number(_)) => other,
        })
    }

    fn apply_mapping(&self, map: Mapping, action: Action) -> Result<Mapping> {
        map.into_iter()
            .map(|(key, val)| self.apply(val, action).map(|v| (key, v)))
            .collect()
    }

    /// Record the key identity of every encrypted scalar under `value`.
    ///
    /// Report keys are colon paths rooted at `prefix`; sequence items use
    /// their index. Plaintext scalars are skipped, unlike the single-path
    /// lookup, which reports them as not encrypted.
    ///
    /// # Errors
    ///
    /// Returns the first backend error.
    pub fn collect_keys(&self, value: &Value, prefix: &str, report: &mut KeyReport) -> Result<()> {
        match value {
            Value::String(s) => {
                if is_encrypted(s) {
                    let identity = self.backend.key_identity(s)?;
                    trace!(path = prefix, identity = %identity, "key found");
                    report.insert(prefix.to_string(), identity);
                }
            }
            Value::Sequence(items) => {
                for (index, item) in items.iter().enumerate() {
                    self.collect_keys(item, &path::join(prefix, &index.to_string()), report)?;
                }
            }
            Value::Mapping(map) => {
                for (key, val) in map {
                    self.collect_keys(val, &path::join(prefix, key), report)?;
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
        Ok(())
    }

    /// Run `action` over the part of `document` selected by `scope`.
    ///
    /// # Errors
    ///
    /// Returns leaf errors from the backend, `PathError` for path scopes that
    /// do not name a usable value, and `CipherError::NotEncrypted` when
    /// identifying a plaintext value by path.
    pub fn perform(&self, document: Document, action: Action, scope: &Scope) -> Result<Outcome> {
        let span = info_span!("perform", %action, %scope, backend = self.backend.name());
        let _guard = span.enter();

        if let Scope::Path(path) = scope {
            return self.perform_path(document, action, path);
        }

        if action == Action::Identify {
            let mut report = KeyReport::new();
            match scope {
                Scope::Element(name) => {
                    if let Some(value) = document.element(name) {
                        self.collect_keys(value, name, &mut report)?;
                    }
                }
                _ => {
                    for (key, value) in document.as_mapping() {
                        self.collect_keys(value, key, &mut report)?;
                    }
                }
            }
            debug!(keys = report.len(), "identify complete");
            return Ok(Outcome::Keys(report));
        }

        let mut values = document.into_mapping();
        match scope {
            Scope::Element(name) => {
                if let Some(value) = values.remove(name) {
                    values.insert(name.clone(), self.apply(value, action)?);
                } else {
                    debug!(element = %name, "element not present, nothing to do");
                }
            }
            _ => values = self.apply_mapping(values, action)?,
        }
        Ok(Outcome::Document(Document::from_mapping(values)))
    }

    /// Apply `action` to the single value at `path`.
    fn perform_path(
        &self,
        mut document: Document,
        action: Action,
        path: &YamlPath,
    ) -> Result<Outcome> {
        let text = match document.get(path) {
            None => return Err(PathError::NotFound(path.to_string()).into()),
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) if action.transforms() => None,
            Some(Value::Null | Value::Bool(_) | Value::Number(_)) if action == Action::Identify => {
                return Err(CipherError::NotEncrypted.into())
            }
            Some(_) => return Err(PathError::NotScalar(path.to_string()).into()),
        };
        let Some(text) = text else {
            return Ok(Outcome::Document(document));
        };

        let result = action.apply_scalar(self.backend, &text)?;
        if action == Action::Identify {
            let mut report = KeyReport::new();
            report.insert(path.to_string(), result);
            return Ok(Outcome::Keys(report));
        }

        document.set(path, Value::String(result))?;
        Ok(Outcome::Document(document))
    }

    /// Encrypt `plaintext` and store it at `path`, creating structure as
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns `PathError::Conflict` if the path runs through a non-mapping,
    /// or the backend's encryption error. The document is unchanged on error.
    pub fn set_secret(
        &self,
        document: &mut Document,
        path: &YamlPath,
        plaintext: &str,
    ) -> Result<()> {
        let ciphertext = Action::Encrypt.apply_scalar(self.backend, plaintext)?;
        document.set(path, Value::String(ciphertext))
    }
}
