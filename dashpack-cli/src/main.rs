//! CLI entrypoint for `dashpack`.

use clap::Parser;
use dashpack_cli::cli::Args;
use dashpack_cli::error::DashpackError;

fn main() -> Result<(), DashpackError> {
    dashpack_cli::run(&Args::parse())
}
