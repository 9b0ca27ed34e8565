//! Command-line interface definitions for `dashpack`.

use camino::Utf8PathBuf;
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde::Serialize;

/// Parsed CLI arguments for `dashpack`.
#[derive(Debug, Parser)]
#[command(name = "dashpack")]
#[command(about = "Merge and validate layered dashboard packs")]
#[command(version)]
pub struct Args {
    /// Settings file to read.
    #[arg(long, value_name = "path", global = true)]
    pub config: Option<Utf8PathBuf>,
    /// Settings supplied as flags.
    #[command(flatten)]
    pub overrides: SettingsOverrides,
    /// Action to perform.
    #[command(subcommand)]
    pub command: Command,
}

/// Settings that flags may override; absent flags leave lower layers intact.
#[derive(Debug, Clone, Default, ClapArgs, Serialize)]
pub struct SettingsOverrides {
    /// Largest accepted external pack body, in bytes.
    #[arg(long, value_name = "bytes", global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pack_bytes: Option<usize>,
    /// Time allowed for one external pack fetch, in milliseconds.
    #[arg(long, value_name = "ms", global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_timeout_ms: Option<u64>,
    /// Directory relative pack paths resolve against.
    #[arg(long, value_name = "path", global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pack_root: Option<Utf8PathBuf>,
    /// `tracing` filter directive.
    #[arg(long, value_name = "filter", global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub pretty: bool,
}

/// Subcommands supported by `dashpack`.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Merge a user document with its packs and print the result.
    Merge(MergeArgs),
    /// Merge, then report validation findings; fails on errors.
    Validate(InputArgs),
    /// Print the user document reduced to the keys a merge reads.
    Collapse(InputArgs),
    /// Print the checksum of the merged document.
    Fingerprint(InputArgs),
}

/// Input and output locations shared by every subcommand.
#[derive(Debug, Clone, ClapArgs)]
pub struct InputArgs {
    /// User document (JSON, YAML or TOML by extension); `-` reads JSON from stdin.
    #[arg(value_name = "input")]
    pub input: Utf8PathBuf,
    /// Write output to this file instead of stdout.
    #[arg(long, short, value_name = "path")]
    pub output: Option<Utf8PathBuf>,
}

/// Arguments for `dashpack merge`.
#[derive(Debug, Clone, ClapArgs)]
pub struct MergeArgs {
    /// Input and output locations.
    #[command(flatten)]
    pub io: InputArgs,
    /// Include provenance in the output.
    #[arg(long = "provenance")]
    pub should_include_provenance: bool,
}

#[cfg(test)]
mod tests {
    //! Argument parsing.
    #![expect(clippy::expect_used, reason = "tests panic on broken fixtures")]

    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parses_global_flags_after_the_subcommand() {
        let args = Args::try_parse_from([
            "dashpack",
            "merge",
            "user.yaml",
            "--provenance",
            "--max-pack-bytes",
            "1024",
            "--pretty",
        ])
        .expect("arguments parse");
        assert_eq!(args.overrides.max_pack_bytes, Some(1024));
        assert!(args.overrides.pretty);
        let Command::Merge(merge) = args.command else {
            panic!("expected merge subcommand");
        };
        assert!(merge.should_include_provenance);
        assert_eq!(merge.io.input.as_str(), "user.yaml");
    }

    #[rstest]
    fn unset_flags_serialise_to_nothing() {
        let value = serde_json::to_value(SettingsOverrides::default()).expect("serialise");
        assert_eq!(value, serde_json::json!({}));
    }

    #[rstest]
    #[case(&["dashpack"])]
    #[case(&["dashpack", "merge"])]
    #[case(&["dashpack", "explode", "x.json"])]
    fn rejects_incomplete_invocations(#[case] argv: &[&str]) {
        assert!(Args::try_parse_from(argv).is_err());
    }
}
