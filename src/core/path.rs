//! Colon-delimited paths into a pillar document.
//!
//! `some:yaml:path` names the key `path` inside mapping `yaml` inside
//! top-level mapping `some`. There is no escaping: a key containing `:`
//! cannot be addressed.

use std::fmt;
use std::str::FromStr;

use crate::core::constants::PATH_DELIMITER;
use crate::core::document::{Mapping, Value};
use crate::error::{PathError, Result};

/// A parsed path expression.
///
/// Segments are taken literally; empty segments are kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct YamlPath {
    parts: Vec<String>,
}

impl YamlPath {
    pub fn parse(s: &str) -> Self {
        Self {
            parts: s.split(PATH_DELIMITER).map(str::to_string).collect(),
        }
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// The terminal key.
    pub fn last(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or_default()
    }
}

impl FromStr for YamlPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for YamlPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for part in &self.parts {
            if !first {
                write!(f, "{}", PATH_DELIMITER)?;
            }
            write!(f, "{}", part)?;
            first = false;
        }
        Ok(())
    }
}

/// Append a key to a report path.
pub fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}{}{}", prefix, PATH_DELIMITER, key)
    }
}

/// Walk `path` through nested mappings.
///
/// Returns `None` if any key is missing or an intermediate value is not a
/// mapping.
pub fn resolve<'a>(root: &'a Mapping, path: &YamlPath) -> Option<&'a Value> {
    let (last, parents) = path.parts.split_last()?;
    let mut current = root;
    for part in parents {
        current = current.get(part)?.as_mapping()?;
    }
    current.get(last)
}

/// Set the value at `path`, creating intermediate mappings as needed.
///
/// A `null` intermediate is replaced by a new mapping.
///
/// # Errors
///
/// Returns `PathError::Conflict` when an intermediate segment already holds a
/// scalar or sequence. The mapping is left unchanged in that case.
pub fn assign(root: &mut Mapping, path: &YamlPath, value: Value) -> Result<()> {
    let Some((last, parents)) = path.parts.split_last() else {
        return Ok(());
    };

    // Check first so a conflict never leaves half-built mappings behind.
    let mut cursor = Some(&*root);
    for part in parents {
        cursor = match cursor.and_then(|m| m.get(part)) {
            Some(Value::Mapping(m)) => Some(m),
            Some(Value::Null) | None => None,
            Some(_) => {
                return Err(PathError::Conflict {
                    path: path.to_string(),
                    segment: part.clone(),
                }
                .into())
            }
        };
    }

    let mut current = root;
    for part in parents {
        let slot = current
            .entry(part.clone())
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if slot.is_null() {
            *slot = Value::Mapping(Mapping::new());
        }
        current = match slot {
            Value::Mapping(m) => m,
            _ => {
                return Err(PathError::Conflict {
                    path: path.to_string(),
                    segment: part.clone(),
                }
                .into())
            }
        };
    }

    current.insert(last.clone(), value);
    Ok(())
}
