//! Subcommand execution.

use std::io::{Read, Write};
use std::sync::Arc;

use camino::Utf8Path;
use dashpack::fetch::{FileTransport, PackFetcher, parse_pack_by_format};
use dashpack::issue::TracingSink;
use dashpack::{
    BuiltinRegistry, Issue, MergeEngine, MergeResult, Provenance, collapse, validate,
};
use serde::Serialize;
use serde_json::Value;

use crate::cli::{Command, InputArgs};
use crate::error::DashpackError;
use crate::output::{emit, render};
use crate::settings::Settings;

/// Input path that reads JSON from standard input.
pub const STDIN_INPUT: &str = "-";

/// JSON printed by `dashpack merge`.
#[derive(Debug, Serialize)]
pub struct MergeReport<'a> {
    /// Fingerprint of the merged document.
    pub checksum: String,
    /// The merged document.
    pub merged: Value,
    /// Provenance, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance: Option<&'a Provenance>,
    /// Every issue raised while merging.
    pub issues: &'a [Issue],
}

/// JSON printed by `dashpack fingerprint`.
#[derive(Debug, Serialize)]
pub struct FingerprintReport {
    /// Fingerprint of the merged document.
    pub checksum: String,
}

/// Build the merge engine described by `settings`.
#[must_use]
pub fn engine(settings: &Settings, registry: BuiltinRegistry) -> MergeEngine {
    let transport = match &settings.pack_root {
        Some(root) => FileTransport::with_root(root.clone()),
        None => FileTransport::new(),
    };
    let fetcher = PackFetcher::with_options(Arc::new(transport), settings.fetch_options());
    MergeEngine::new(registry)
        .with_fetcher(Arc::new(fetcher))
        .with_sink(Arc::new(TracingSink))
}

/// Read and parse the user document named by `input`.
///
/// # Errors
///
/// Returns [`DashpackError::Io`] when the input cannot be read and
/// [`DashpackError::Input`] when it does not parse to a mapping.
pub fn read_input(input: &Utf8Path, stdin: &mut impl Read) -> Result<Value, DashpackError> {
    let (label, bytes) = if input.as_str() == STDIN_INPUT {
        let mut buffer = Vec::new();
        stdin
            .read_to_end(&mut buffer)
            .map_err(|err| DashpackError::io("<stdin>", err))?;
        ("stdin.json", buffer)
    } else {
        let bytes = std::fs::read(input).map_err(|err| DashpackError::io(input, err))?;
        (input.as_str(), bytes)
    };
    Ok(parse_pack_by_format(label, &bytes)?)
}

/// Execute `command` against `engine`, writing results to `stdout`.
///
/// # Errors
///
/// Returns a [`DashpackError`] when input or output fails, or
/// [`DashpackError::Invalid`] when `validate` finds errors.
pub async fn execute(
    command: &Command,
    engine: &MergeEngine,
    settings: &Settings,
    io: (&mut impl Read, &mut impl Write),
) -> Result<(), DashpackError> {
    let (stdin, stdout) = io;
    match command {
        Command::Merge(args) => {
            let user = read_input(&args.io.input, stdin)?;
            let result = engine.merge(&user).await;
            let report = merge_report(&result, args.should_include_provenance);
            finish(&args.io, &render(&report, settings.pretty)?, stdout)
        }
        Command::Validate(args) => {
            let user = read_input(&args.input, stdin)?;
            let result = engine.merge(&user).await;
            let report = validate(&result.merged, Some(&user));
            finish(args, &render(&report, settings.pretty)?, stdout)?;
            if report.is_valid() {
                Ok(())
            } else {
                Err(DashpackError::Invalid {
                    errors: report.errors.len(),
                })
            }
        }
        Command::Collapse(args) => {
            let user = read_input(&args.input, stdin)?;
            finish(args, &render(&collapse(&user), settings.pretty)?, stdout)
        }
        Command::Fingerprint(args) => {
            let user = read_input(&args.input, stdin)?;
            let checksum = engine.merge(&user).await.checksum();
            let report = FingerprintReport { checksum };
            finish(args, &render(&report, settings.pretty)?, stdout)
        }
    }
}

fn merge_report(result: &MergeResult, with_provenance: bool) -> MergeReport<'_> {
    MergeReport {
        checksum: result.checksum(),
        merged: result.merged.to_value(),
        provenance: with_provenance.then_some(&result.provenance),
        issues: &result.issues,
    }
}

fn finish(args: &InputArgs, text: &str, stdout: &mut impl Write) -> Result<(), DashpackError> {
    emit(text, args.output.as_deref(), stdout)
}
