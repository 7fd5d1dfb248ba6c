//! keys command.
//!
//! Reports are payload: they go to stdout (or `-o`) without a renderer
//! header, as YAML unless `--json` is given.

use std::collections::BTreeMap;

use crate::cli::{output, DirArgs, KeysTarget, ReportArgs};
use crate::cli::transform::summarize;
use crate::core::action::Action;
use crate::core::batch;
use crate::core::cipher::KeyBackend;
use crate::core::constants::SLS_EXTENSION;
use crate::core::path::YamlPath;
use crate::core::pillar::{Format, Job};
use crate::core::processor::{Processor, Scope};
use crate::core::store::{self, Sink, Source};
use crate::error::{DocumentError, Result};

/// Run `keys` against a target.
pub fn execute(backend: &dyn KeyBackend, target: KeysTarget, element: Option<&str>) -> Result<()> {
    let processor = Processor::new(backend);
    match target {
        KeysTarget::All(report) => single(&processor, Scope::element(element), &report),
        KeysTarget::Path { path, report } => {
            single(&processor, Scope::Path(YamlPath::parse(&path)), &report)
        }
        KeysTarget::Recurse {
            dir: DirArgs { dir },
            json,
        } => {
            let report = batch::process_dir(
                &dir,
                SLS_EXTENSION,
                Action::Identify,
                &Scope::element(element),
                &processor,
            )?;
            summarize(Action::Identify, &report);
            if report.keys.is_empty() {
                return Ok(());
            }
            let text = render_all(&report.keys, format(json))?;
            store::write(&Sink::Stdout, &text)?;
            Ok(())
        }
    }
}

fn format(json: bool) -> Format {
    if json {
        Format::Json
    } else {
        Format::Yaml
    }
}

fn single(processor: &Processor<'_>, scope: Scope, args: &ReportArgs) -> Result<()> {
    let job = Job {
        source: Source::parse(&args.input),
        sink: Sink::parse(&args.output),
        action: Action::Identify,
        scope,
        format: format(args.json),
    };
    match job.run(processor) {
        Ok(_) => Ok(()),
        Err(crate::error::Error::Document(DocumentError::Empty { file })) => {
            output::dimmed(&format!("no encrypted values in {}", file));
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Reports for several files, keyed by file name.
fn render_all<T: serde::Serialize>(
    reports: &BTreeMap<String, T>,
    format: Format,
) -> Result<String> {
    let rendered = match format {
        Format::Yaml => serde_yaml::to_string(reports).map_err(|e| e.to_string()),
        Format::Json => serde_json::to_string_pretty(reports)
            .map(|json| json + "\n")
            .map_err(|e| e.to_string()),
    };
    rendered.map_err(|reason| {
        DocumentError::Format {
            file: "report".to_string(),
            reason,
        }
        .into()
    })
}
