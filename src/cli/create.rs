//! create and update commands.

use crate::cli::{output, SecretArgs};
use crate::core::cipher::KeyBackend;
use crate::core::pillar::Pillar;
use crate::core::processor::Processor;
use crate::core::store::{self, short_name, Sink, Source};
use crate::error::Result;

/// Write the given secrets to a pillar.
///
/// An existing output file keeps its other values; the new names are
/// merged in.
pub fn create(backend: &dyn KeyBackend, secrets: &SecretArgs, output: &str) -> Result<()> {
    let sink = Sink::parse(output);
    let mut pillar = match &sink {
        Sink::File(path) if path.exists() => Pillar::open(Source::File(path.clone()))?,
        Sink::File(path) => Pillar::empty(Source::File(path.clone())),
        Sink::Stdout => Pillar::empty(Source::Stdin),
    };
    fill(backend, &mut pillar, secrets)?;
    write(&pillar, &sink)
}

/// Add the given secrets to an existing pillar, writing it back.
///
/// Reading from STDIN writes the result to STDOUT.
pub fn update(backend: &dyn KeyBackend, secrets: &SecretArgs, file: &str) -> Result<()> {
    let source = Source::parse(file);
    let sink = match &source {
        Source::File(path) => Sink::File(path.clone()),
        Source::Stdin => Sink::Stdout,
    };

    let mut pillar = Pillar::open(source)?;
    fill(backend, &mut pillar, secrets)?;
    write(&pillar, &sink)
}

fn fill(backend: &dyn KeyBackend, pillar: &mut Pillar, secrets: &SecretArgs) -> Result<()> {
    if secrets.values.len() > secrets.names.len() {
        output::warn(&format!(
            "{} values given for {} names; extra values ignored",
            secrets.values.len(),
            secrets.names.len()
        ));
    }
    pillar.update(&Processor::new(backend), &secrets.names, &secrets.values)
}

fn write(pillar: &Pillar, sink: &Sink) -> Result<()> {
    let text = pillar.render()?;
    store::write(sink, &text)?;
    if let Sink::File(path) = sink {
        output::success(&format!(
            "wrote out to file: '{}'",
            output::path(&short_name(path))
        ));
    }
    Ok(())
}
