//! Pillar document model.
//!
//! A parsed pillar is a mapping of string keys to [`Value`]s. Only string
//! scalars are ever touched by an action; everything else is structure that
//! gets walked or passed through as-is.
//!
//! Plain scalars resolve the way Salt's YAML 1.1 loader reads them, so an
//! unquoted `yes` or `off` is a boolean, not a string to encrypt. Strings
//! that look like booleans, nulls or numbers are quoted on output.

use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use tracing::trace;
use yaml_rust2::parser::{Event, EventReceiver, Parser};
use yaml_rust2::scanner::TScalarStyle;
use yaml_rust2::yaml::Hash;
use yaml_rust2::{Yaml, YamlEmitter};

use crate::core::constants::INCLUDE_TOKEN;
use crate::core::path::{self, YamlPath};
use crate::error::{DocumentError, Result};

/// Mapping node. Keys are re-emitted in sorted order.
pub type Mapping = BTreeMap<String, Value>;

/// A node in a pillar document.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(serde_yaml::Number),
    /// String scalar, the only node kind actions transform.
    String(String),
    Sequence(Vec<Value>),
    Mapping(Mapping),
}

impl Value {
    /// Borrow the string scalar, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the mapping, if this is one.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the node kind, for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// Resolve an unquoted scalar to a null, boolean, number or string.
fn resolve_plain(text: &str) -> Value {
    if matches!(text, "" | "~" | "null" | "Null" | "NULL") {
        return Value::Null;
    }
    if let Some(b) = parse_bool(text) {
        return Value::Bool(b);
    }
    match text.parse::<serde_yaml::Number>() {
        Ok(n) => Value::Number(n),
        Err(_) => Value::String(text.to_string()),
    }
}

/// YAML 1.1 booleans as PyYAML reads them (`y` and `n` stay strings).
pub fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "true" | "True" | "TRUE" | "yes" | "Yes" | "YES" | "on" | "On" | "ON" => Some(true),
        "false" | "False" | "FALSE" | "no" | "No" | "NO" | "off" | "Off" | "OFF" => Some(false),
        _ => None,
    }
}

/// Collection being filled while events stream in.
enum Node {
    Sequence(Vec<Value>),
    Mapping(Mapping, Option<String>),
}

struct Frame {
    node: Node,
    anchor: usize,
}

/// Builds a [`Value`] tree from parser events, keeping the scalar style
/// that plain-scalar resolution depends on.
#[derive(Default)]
struct Loader {
    stack: Vec<Frame>,
    anchors: HashMap<usize, Value>,
    root: Option<Value>,
    error: Option<String>,
}

impl Loader {
    fn awaiting_key(&self) -> bool {
        matches!(
            self.stack.last(),
            Some(Frame {
                node: Node::Mapping(_, None),
                ..
            })
        )
    }

    fn remember(&mut self, anchor: usize, value: &Value) {
        if anchor > 0 {
            self.anchors.insert(anchor, value.clone());
        }
    }

    fn set_key(&mut self, key: String) {
        if let Some(Frame {
            node: Node::Mapping(_, pending),
            ..
        }) = self.stack.last_mut()
        {
            *pending = Some(key);
        }
    }

    /// Hand a finished value to the enclosing collection.
    fn attach(&mut self, value: Value) {
        match self.stack.last_mut() {
            None => {
                if self.root.is_none() {
                    self.root = Some(value);
                }
            }
            Some(Frame {
                node: Node::Sequence(items),
                ..
            }) => items.push(value),
            Some(Frame {
                node: Node::Mapping(map, pending),
                ..
            }) => {
                if let Some(key) = pending.take() {
                    map.insert(key, value);
                }
            }
        }
    }

    fn open(&mut self, node: Node, anchor: usize) -> std::result::Result<(), String> {
        if self.awaiting_key() {
            return Err("unsupported mapping key: collection".to_string());
        }
        self.stack.push(Frame { node, anchor });
        Ok(())
    }

    fn close(&mut self) -> std::result::Result<(), String> {
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| "unbalanced collection end".to_string())?;
        let value = match frame.node {
            Node::Sequence(items) => Value::Sequence(items),
            Node::Mapping(map, _) => Value::Mapping(map),
        };
        self.remember(frame.anchor, &value);
        self.attach(value);
        Ok(())
    }

    fn handle(&mut self, event: Event) -> std::result::Result<(), String> {
        match event {
            Event::Scalar(_, _, _, Some(tag))
            | Event::SequenceStart(_, Some(tag))
            | Event::MappingStart(_, Some(tag)) => {
                Err(format!("unsupported tag {}{}", tag.handle, tag.suffix))
            }
            Event::Scalar(text, style, anchor, None) => {
                // Keys keep their text whatever it looks like.
                if self.awaiting_key() {
                    self.remember(anchor, &Value::String(text.clone()));
                    self.set_key(text);
                    return Ok(());
                }
                let value = match style {
                    TScalarStyle::Plain => resolve_plain(&text),
                    _ => Value::String(text),
                };
                self.remember(anchor, &value);
                self.attach(value);
                Ok(())
            }
            Event::Alias(anchor) => {
                let value = self
                    .anchors
                    .get(&anchor)
                    .cloned()
                    .ok_or_else(|| format!("unknown anchor {}", anchor))?;
                if self.awaiting_key() {
                    let key = key_text(&value)?;
                    self.set_key(key);
                } else {
                    self.attach(value);
                }
                Ok(())
            }
            Event::SequenceStart(anchor, None) => self.open(Node::Sequence(Vec::new()), anchor),
            Event::MappingStart(anchor, None) => {
                self.open(Node::Mapping(Mapping::new(), None), anchor)
            }
            Event::SequenceEnd | Event::MappingEnd => self.close(),
            _ => Ok(()),
        }
    }
}

impl EventReceiver for Loader {
    fn on_event(&mut self, event: Event) {
        if self.error.is_some() {
            return;
        }
        if let Err(reason) = self.handle(event) {
            self.error = Some(reason);
        }
    }
}

fn key_text(value: &Value) -> std::result::Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(format!("unsupported mapping key: {}", other.kind())),
    }
}

/// Load the first document in `text`. `None` for an empty stream.
fn load(text: &str) -> std::result::Result<Option<Value>, String> {
    let mut loader = Loader::default();
    Parser::new_from_str(text)
        .load(&mut loader, false)
        .map_err(|e| e.to_string())?;
    match loader.error {
        Some(reason) => Err(reason),
        None => Ok(loader.root),
    }
}

fn to_node(value: &Value) -> Yaml {
    match value {
        Value::Null => Yaml::Null,
        Value::Bool(b) => Yaml::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Yaml::Integer(i),
            None => Yaml::Real(n.to_string()),
        },
        Value::String(s) => Yaml::String(s.clone()),
        Value::Sequence(items) => Yaml::Array(items.iter().map(to_node).collect()),
        Value::Mapping(map) => Yaml::Hash(to_hash(map)),
    }
}

fn to_hash(map: &Mapping) -> Hash {
    let mut hash = Hash::new();
    for (key, value) in map {
        hash.insert(Yaml::String(key.clone()), to_node(value));
    }
    hash
}

/// True when every multi-line string survives a `|` block unchanged.
fn literal_blocks_safe(value: &Value) -> bool {
    match value {
        Value::String(s) if s.contains('\n') => {
            let mut lines = s.lines().filter(|l| !l.is_empty());
            let first_ok = lines
                .next()
                .is_some_and(|l| !l.starts_with([' ', '\t']));
            first_ok
                && s.lines().all(|l| l.is_empty() || !l.trim().is_empty())
                && !s.ends_with("\n\n")
        }
        Value::Sequence(items) => items.iter().all(literal_blocks_safe),
        Value::Mapping(map) => map.values().all(literal_blocks_safe),
        _ => true,
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Sequence(items) => items.serialize(serializer),
            Value::Mapping(map) => map.serialize(serializer),
        }
    }
}

/// Scan text line by line for include directives.
///
/// Runs before any YAML parsing so a parser never gets the chance to act on
/// an include.
///
/// # Errors
///
/// Returns `DocumentError::IncludeDetected` on the first matching line.
pub fn scan_for_includes(text: &str) -> std::result::Result<(), DocumentError> {
    if let Some((line, _)) = text
        .lines()
        .enumerate()
        .find(|(_, l)| l.contains(INCLUDE_TOKEN))
    {
        trace!(line = line + 1, "include directive found");
        return Err(DocumentError::IncludeDetected {
            file: "input".to_string(),
        });
    }
    Ok(())
}

/// True when every line is blank or a comment.
fn is_blank(text: &str) -> bool {
    text.lines().all(|l| {
        let l = l.trim();
        l.is_empty() || l.starts_with('#')
    })
}

/// A parsed pillar document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Document {
    values: Mapping,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_mapping(values: Mapping) -> Self {
        Self { values }
    }

    /// Parse YAML text into a document.
    ///
    /// Blank input yields an empty document.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::IncludeDetected` if any line carries an
    /// include directive, or `DocumentError::Parse` for malformed YAML and
    /// for a top level that is not a mapping.
    pub fn parse(text: &str) -> std::result::Result<Self, DocumentError> {
        scan_for_includes(text)?;

        if is_blank(text) {
            return Ok(Self::new());
        }

        let parse_err = |reason: String| DocumentError::Parse {
            file: "input".to_string(),
            reason,
        };

        match load(text).map_err(parse_err)? {
            Some(Value::Mapping(values)) => {
                trace!(keys = values.len(), "document parsed");
                Ok(Self { values })
            }
            Some(Value::Null) | None => Ok(Self::new()),
            Some(other) => Err(parse_err(format!(
                "top level must be a mapping, found {}",
                other.kind()
            ))),
        }
    }

    /// Serialize the document as YAML.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::Format` if serialization fails.
    pub fn to_yaml(&self) -> std::result::Result<String, DocumentError> {
        let format_err = |reason: String| DocumentError::Format {
            file: "input".to_string(),
            reason,
        };

        let literal = self.values.values().all(literal_blocks_safe);
        let mut out = String::new();
        let mut emitter = YamlEmitter::new(&mut out);
        emitter.multiline_strings(literal);
        emitter
            .dump(&Yaml::Hash(to_hash(&self.values)))
            .map_err(|e| format_err(e.to_string()))?;

        let mut yaml = out.strip_prefix("---\n").unwrap_or(&out).to_string();
        yaml.push('\n');
        Ok(yaml)
    }

    /// Look up the value at a path. Never creates structure.
    pub fn get(&self, path: &YamlPath) -> Option<&Value> {
        path::resolve(&self.values, path)
    }

    /// Set the value at a path, creating intermediate mappings.
    ///
    /// # Errors
    ///
    /// Returns `PathError::Conflict` if a segment holds a non-mapping value.
    pub fn set(&mut self, path: &YamlPath, value: Value) -> Result<()> {
        path::assign(&mut self.values, path, value)
    }

    /// Value of a top-level element.
    pub fn element(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.values
    }

    pub fn into_mapping(self) -> Mapping {
        self.values
    }
}
