//! encrypt, decrypt and rotate commands.

use std::path::Path;

use crate::cli::{output, DirArgs, RotateArgs, Target};
use crate::core::action::Action;
use crate::core::batch::{self, BatchReport};
use crate::core::cipher::KeyBackend;
use crate::core::constants::SLS_EXTENSION;
use crate::core::path::YamlPath;
use crate::core::pillar::{Format, Job};
use crate::core::processor::{Processor, Scope};
use crate::core::store::{short_name, Sink, Source};
use crate::error::Result;

/// Run `encrypt` or `decrypt` against a target.
pub fn execute(
    backend: &dyn KeyBackend,
    action: Action,
    target: Target,
    element: Option<&str>,
) -> Result<()> {
    let processor = Processor::new(backend);
    match target {
        Target::All(files) => {
            let scope = Scope::element(element);
            single(&processor, action, scope, files.source(), files.sink())
        }
        Target::Recurse(DirArgs { dir }) => {
            recurse(&processor, action, &Scope::element(element), &dir)
        }
        Target::Path { path, files } => single(
            &processor,
            action,
            Scope::Path(YamlPath::parse(&path)),
            files.source(),
            files.sink(),
        ),
    }
}

/// Decrypt and re-encrypt with the current key, for one file or a directory.
pub fn rotate(backend: &dyn KeyBackend, args: RotateArgs, element: Option<&str>) -> Result<()> {
    let processor = Processor::new(backend);
    let scope = Scope::element(element);

    if let Some(dir) = &args.dir {
        return recurse(&processor, Action::Rotate, &scope, dir);
    }

    let input = args.input.as_deref().unwrap_or("-");
    let source = Source::parse(input);
    let sink = match &source {
        Source::File(path) if args.update => Sink::File(path.clone()),
        _ => Sink::parse(args.output.as_deref().unwrap_or("-")),
    };
    single(&processor, Action::Rotate, scope, source, sink)
}

fn single(
    processor: &Processor<'_>,
    action: Action,
    scope: Scope,
    source: Source,
    sink: Sink,
) -> Result<()> {
    let job = Job {
        source,
        sink,
        action,
        scope,
        format: Format::Yaml,
    };
    job.run(processor)?;

    if let Sink::File(path) = &job.sink {
        output::success(&format!(
            "wrote out to file: '{}'",
            output::path(&short_name(path))
        ));
    }
    Ok(())
}

fn recurse(processor: &Processor<'_>, action: Action, scope: &Scope, dir: &Path) -> Result<()> {
    let report = batch::process_dir(dir, SLS_EXTENSION, action, scope, processor)?;
    summarize(action, &report);
    Ok(())
}

/// Per-file failures are reported but do not fail the run.
pub(crate) fn summarize(action: Action, report: &BatchReport) {
    for (path, err) in &report.failed {
        output::warn(&format!("{}: {}", short_name(path), err));
    }
    for path in &report.skipped {
        output::dimmed(&format!("  skipped {} (nothing to do)", short_name(path)));
    }

    if report.total() == 0 {
        output::warn("no pillar files found");
        return;
    }
    if report.is_success() {
        output::success(&format!("{}: {} files", action, report.processed.len()));
    } else {
        output::kv("processed", report.processed.len());
        output::kv("skipped", report.skipped.len());
        output::kv("failed", report.failed.len());
    }
}
