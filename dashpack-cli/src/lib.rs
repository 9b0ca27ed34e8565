//! Library backing the `dashpack` command.
//!
//! The binary parses [`cli::Args`] and hands them to [`run`]. Settings are
//! layered by [`settings::Settings::load`], the merge engine is built from
//! them, and each subcommand prints JSON to stdout or the `--output` file.

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod settings;

use std::io;

use dashpack::BuiltinRegistry;
use tracing_subscriber::EnvFilter;

use crate::cli::Args;
use crate::error::DashpackError;
use crate::settings::Settings;

/// Filter used when the configured directive does not parse.
const FALLBACK_LOG_FILTER: &str = "warn";

/// Run the command described by `args`.
///
/// # Errors
///
/// Returns a [`DashpackError`] when settings are invalid, the runtime cannot
/// start, or the subcommand fails.
pub fn run(args: &Args) -> Result<(), DashpackError> {
    let settings = Settings::load(args.config.as_deref(), &args.overrides)?;
    init_tracing(&settings.log);
    tracing::debug!(?settings, "settings loaded");

    let engine = commands::engine(&settings, BuiltinRegistry::new());
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(DashpackError::Runtime)?;
    let mut stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    runtime.block_on(commands::execute(
        &args.command,
        &engine,
        &settings,
        (&mut stdin, &mut stdout),
    ))
}

/// Install a stderr `tracing` subscriber filtered by `directive`.
///
/// Invalid directives fall back to `warn`. A subscriber installed earlier
/// stays in place.
pub fn init_tracing(directive: &str) {
    let (filter, rejected) = match EnvFilter::try_new(directive) {
        Ok(filter) => (filter, None),
        Err(err) => (EnvFilter::new(FALLBACK_LOG_FILTER), Some(err)),
    };
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    if let Some(err) = rejected {
        tracing::warn!(%err, directive, "ignoring invalid log filter");
    }
}
