//! Convert command implementation

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::config::{
    load_config, merge_cli_overrides, CliOverrides, EsldConfig, OutputConfig, OutputFormat,
};
use crate::diagnostics::Diagnostics;
use crate::document::convert_json;
use crate::output::{generate_output_path, save_sld};
use crate::renderer::RendererRegistry;
use crate::sld::xml::write_sld;
use crate::symbols::SymbolRegistry;

use super::{expand_inputs, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Arguments of `esld convert`
#[derive(Debug, Default)]
pub struct ConvertArgs {
    pub inputs: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub strict: bool,
    pub config: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub format: Option<OutputFormat>,
    pub picture_dir: Option<PathBuf>,
    pub font_size_factor: Option<f64>,
}

/// Outcome of converting one input file.
#[derive(Debug)]
struct FileReport {
    input: PathBuf,
    written: Vec<PathBuf>,
    diagnostics: Diagnostics,
    error: Option<String>,
}

impl FileReport {
    fn new(input: &Path) -> Self {
        Self { input: input.to_path_buf(), written: Vec::new(), diagnostics: Diagnostics::new(), error: None }
    }

    fn failed(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Run the convert command
pub fn run_convert(args: ConvertArgs) -> ExitCode {
    let mut config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let overrides = CliOverrides {
        out: args.output,
        picture_dir: args.picture_dir,
        format: args.format,
        font_size_factor: args.font_size_factor,
        strict: args.strict.then_some(true),
        jobs: args.jobs,
    };
    merge_cli_overrides(&mut config, &overrides);

    let errors = config.validate();
    if !errors.is_empty() {
        for error in errors {
            eprintln!("Error: {}", error);
        }
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let files = expand_inputs(&args.inputs);
    if files.is_empty() {
        eprintln!("Error: No input files found");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let pool = match ThreadPoolBuilder::new()
        .num_threads(config.convert.jobs.unwrap_or(0))
        .thread_name(|idx| format!("esld-convert-{idx}"))
        .build()
    {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Error: Failed to build thread pool: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let symbols = SymbolRegistry::with_defaults(config.convert_options());
    let renderers = RendererRegistry::with_defaults();

    let reports: Vec<FileReport> = pool.install(|| {
        files.par_iter().map(|input| convert_file(input, &symbols, &renderers, &config)).collect()
    });

    print_reports(&reports, config.convert.strict)
}

/// Print per-file results and pick the exit code.
fn print_reports(reports: &[FileReport], strict: bool) -> ExitCode {
    let mut failed = false;

    for report in reports {
        for diagnostic in report.diagnostics.iter() {
            let level = if strict { "Error" } else { "Warning" };
            eprintln!("{}: {}: {}", level, report.input.display(), diagnostic);
        }
        if let Some(error) = &report.error {
            eprintln!("Error: {}: {}", report.input.display(), error);
            failed = true;
        }
        for path in &report.written {
            println!("Wrote {}", path.display());
        }
    }

    if failed {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}

/// Convert one input document and write a file per converted layer.
///
/// In strict mode a document with diagnostics writes nothing.
fn convert_file(
    input: &Path,
    symbols: &SymbolRegistry,
    renderers: &RendererRegistry,
    config: &EsldConfig,
) -> FileReport {
    let _span = tracing::info_span!("convert", input = %input.display()).entered();
    let report = FileReport::new(input);

    let json = match fs::read_to_string(input) {
        Ok(json) => json,
        Err(e) => return report.failed(format!("Cannot read file: {}", e)),
    };

    let mut conversion = match convert_json(symbols, renderers, &json) {
        Ok(conversion) => conversion,
        Err(e) => return report.failed(e.to_string()),
    };

    let mut report =
        FileReport { diagnostics: std::mem::take(&mut conversion.diagnostics), ..report };
    if config.convert.strict && !report.diagnostics.is_empty() {
        let count = report.diagnostics.len();
        return report.failed(format!("{} diagnostic(s) in strict mode, nothing written", count));
    }
    if conversion.styles.is_empty() {
        tracing::info!("no layer converted");
    }

    let single = conversion.styles.len() == 1;
    let paths: Vec<PathBuf> = conversion
        .styles
        .iter()
        .map(|style| output_path(input, &style.layer_name, &config.output, single))
        .collect();
    if let Some(path) = paths.iter().find(|path| is_same_file(input, path)) {
        return report.failed(format!("Refusing to overwrite the input with {}", path.display()));
    }

    match conversion.save_pictures() {
        Ok(pictures) => report.written.extend(pictures),
        Err(e) => return report.failed(e.to_string()),
    }

    for (style, path) in conversion.styles.iter().zip(paths) {
        let contents = match config.output.format {
            OutputFormat::Sld => match write_sld(&style.sld) {
                Ok(xml) => xml,
                Err(e) => return report.failed(format!("Cannot serialise '{}': {}", style.layer_name, e)),
            },
            OutputFormat::Json => match serde_json::to_string_pretty(&style.sld) {
                Ok(json) => json,
                Err(e) => return report.failed(format!("Cannot serialise '{}': {}", style.layer_name, e)),
            },
        };

        if let Err(e) = save_sld(&contents, &path) {
            return report.failed(format!("Cannot write {}: {}", path.display(), e));
        }
        tracing::debug!(path = %path.display(), "wrote style");
        report.written.push(path);
    }

    report
}

fn output_path(input: &Path, layer_name: &str, output: &OutputConfig, single: bool) -> PathBuf {
    let path = generate_output_path(input, layer_name, output.output_dir(), single);
    match output.format {
        OutputFormat::Sld => path,
        OutputFormat::Json => path.with_extension(output.format.extension()),
    }
}

/// Whether `output` is an existing file that is also `input`.
fn is_same_file(input: &Path, output: &Path) -> bool {
    match (fs::canonicalize(input), fs::canonicalize(output)) {
        (Ok(input), Ok(output)) => input == output,
        _ => false,
    }
}
