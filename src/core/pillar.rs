//! Pillar files.
//!
//! Ties a document to the file it came from and turns processing results
//! back into bytes: a renderer header plus YAML for documents, bare YAML or
//! JSON for key reports.

use tracing::{debug, info_span};

use crate::core::action::Action;
use crate::core::constants::RENDERER_HEADER;
use crate::core::document::Document;
use crate::core::path::YamlPath;
use crate::core::processor::{Outcome, Processor, Scope};
use crate::core::store::{self, Sink, Source};
use crate::error::{DocumentError, Result};

/// Output encoding for key reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Yaml,
    Json,
}

/// A document loaded from a source.
#[derive(Debug, Clone)]
pub struct Pillar {
    source: Source,
    document: Document,
}

impl Pillar {
    /// An empty pillar for a new file.
    pub fn empty(source: Source) -> Self {
        Self {
            source,
            document: Document::new(),
        }
    }

    /// Read and parse a pillar.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the source cannot be read, and
    /// `DocumentError::IncludeDetected` or `DocumentError::Parse` if it must
    /// not or cannot be parsed.
    pub fn open(source: Source) -> Result<Self> {
        let text = store::read(&source)?;
        Self::parse(source, &text)
    }

    /// Parse text that came from `source`.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::IncludeDetected` or `DocumentError::Parse`.
    pub fn parse(source: Source, text: &str) -> Result<Self> {
        let document = Document::parse(text).map_err(|e| e.in_file(&source.name()))?;
        debug!(file = %source.name(), keys = document.len(), "pillar loaded");
        Ok(Self { source, document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Encrypt each value and store it under the matching name.
    ///
    /// Names are colon paths. A name without a matching value stores an
    /// encrypted empty string.
    ///
    /// # Errors
    ///
    /// Stops at the first path conflict or backend failure.
    pub fn update(
        &mut self,
        processor: &Processor<'_>,
        names: &[String],
        values: &[String],
    ) -> Result<()> {
        for (index, name) in names.iter().enumerate() {
            let value = values.get(index).map(String::as_str).unwrap_or_default();
            processor.set_secret(&mut self.document, &YamlPath::parse(name), value)?;
            debug!(name = %name, "secret set");
        }
        Ok(())
    }

    /// Run an action over the pillar.
    ///
    /// # Errors
    ///
    /// See [`Processor::perform`].
    pub fn perform(
        self,
        processor: &Processor<'_>,
        action: Action,
        scope: &Scope,
    ) -> Result<Outcome> {
        processor.perform(self.document, action, scope)
    }

    /// Render this pillar's document.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::Empty` for a document with no values.
    pub fn render(&self) -> Result<String> {
        render(&Outcome::Document(self.document.clone()), &self.source.name(), Format::Yaml)
    }
}

/// Serialize a processing result.
///
/// Documents get the renderer header; key reports do not.
///
/// # Errors
///
/// Returns `DocumentError::Empty` if there is nothing to write, or
/// `DocumentError::Format` if serialization fails.
pub fn render(outcome: &Outcome, name: &str, format: Format) -> Result<String> {
    let format_err = |reason: String| DocumentError::Format {
        file: name.to_string(),
        reason,
    };

    match outcome {
        Outcome::Document(document) => {
            if document.is_empty() {
                return Err(DocumentError::Empty {
                    file: name.to_string(),
                }
                .into());
            }
            let yaml = document.to_yaml().map_err(|e| e.in_file(name))?;
            Ok(format!("{}{}", RENDERER_HEADER, yaml))
        }
        Outcome::Keys(report) => {
            if report.is_empty() {
                return Err(DocumentError::Empty {
                    file: name.to_string(),
                }
                .into());
            }
            match format {
                Format::Yaml => {
                    serde_yaml::to_string(report).map_err(|e| format_err(e.to_string()).into())
                }
                Format::Json => serde_json::to_string_pretty(report)
                    .map(|json| json + "\n")
                    .map_err(|e| format_err(e.to_string()).into()),
            }
        }
    }
}

/// One unit of work: read a source, apply an action, write a sink.
///
/// Carries everything a run needs, so jobs for different files share no
/// state beyond the key backend.
#[derive(Debug, Clone)]
pub struct Job {
    pub source: Source,
    pub sink: Sink,
    pub action: Action,
    pub scope: Scope,
    pub format: Format,
}

impl Job {
    /// Run the job, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns the first read, parse, processing or write error.
    pub fn run(&self, processor: &Processor<'_>) -> Result<usize> {
        let name = self.source.name();
        let span = info_span!("job", file = %name, output = %self.sink.name());
        let _guard = span.enter();

        let pillar = Pillar::open(self.source.clone())?;
        let outcome = pillar.perform(processor, self.action, &self.scope)?;
        let text = render(&outcome, &name, self.format)?;
        store::write(&self.sink, &text)
    }
}
