//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod convert;
mod kinds;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use glob::glob;

use crate::config::OutputFormat;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Check if a path looks like an exported layer document (.json).
///
/// Styles written with `--format json` (`.sld.json`) are not layer documents.
pub fn is_layer_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".json") && !name.ends_with(".sld.json")
}

/// Find all layer documents in a directory (recursively).
pub fn find_layer_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let dir_str = dir.display().to_string();

    if let Ok(paths) = glob(&format!("{}/**/*.json", dir_str)) {
        files.extend(paths.filter_map(Result::ok).filter(|path| is_layer_file(path)));
    }

    files.sort();
    files
}

/// Expand the command-line inputs into a list of files.
///
/// Directories are searched recursively, other arguments are treated as glob
/// patterns. A pattern that matches nothing is returned as-is so the caller
/// reports it as missing.
pub fn expand_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            files.extend(find_layer_files(input));
            continue;
        }

        let pattern = input.display().to_string();
        let matched: Vec<PathBuf> = match glob(&pattern) {
            Ok(paths) => paths.filter_map(Result::ok).filter(|p| p.is_file()).collect(),
            Err(_) => Vec::new(),
        };
        if matched.is_empty() {
            files.push(input.clone());
        } else {
            files.extend(matched);
        }
    }

    files.dedup();
    files
}

/// esri2sld - Convert ESRI symbol exports to OGC SLD
#[derive(Parser)]
#[command(name = "esld")]
#[command(about = "esri2sld - Convert ESRI symbol definitions (MXD/LYR JSON exports) into OGC SLD styles")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert layer documents to SLD files
    Convert {
        /// Input files, directories or glob patterns
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (default from esld.toml, else ./sld)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Strict mode: treat diagnostics as errors
        #[arg(long)]
        strict: bool,

        /// Path to an esld.toml (default: discovered from the working directory)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of documents converted in parallel
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Directory for picture-fill images
        #[arg(long)]
        picture_dir: Option<PathBuf>,

        /// Added to every text symbol's font size
        #[arg(long, allow_negative_numbers = true)]
        font_size_factor: Option<f64>,
    },

    /// List the supported symbol kinds and renderers
    Kinds {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Parse arguments and run the selected command.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            inputs,
            output,
            strict,
            config,
            jobs,
            format,
            picture_dir,
            font_size_factor,
        } => convert::run_convert(convert::ConvertArgs {
            inputs,
            output,
            strict,
            config,
            jobs,
            format,
            picture_dir,
            font_size_factor,
        }),
        Commands::Kinds { json } => kinds::run_kinds(json),
    }
}
