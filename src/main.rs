//! esld - Command-line tool for converting ESRI symbol exports to SLD

use std::process::ExitCode;

use esri2sld::cli;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    cli::run()
}
