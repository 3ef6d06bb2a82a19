//! Configuration loading and discovery for `esld.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::{EsldConfig, OutputFormat};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name searched for during discovery
pub const CONFIG_FILE_NAME: &str = "esld.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse esld.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override output directory
    pub out: Option<PathBuf>,
    /// Override picture directory
    pub picture_dir: Option<PathBuf>,
    /// Override output format
    pub format: Option<OutputFormat>,
    /// Override font size factor
    pub font_size_factor: Option<f64>,
    /// Enable strict mode
    pub strict: Option<bool>,
    /// Number of parallel jobs
    pub jobs: Option<usize>,
}

/// Find esld.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for esld.toml
/// 2. Check XDG_CONFIG_HOME/esri2sld/esld.toml (or ~/.config/esri2sld/esld.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find esld.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("esri2sld").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find esld.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from an esld.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the default
/// configuration.
///
/// Relative directories in a loaded file are resolved against the directory
/// containing it.
pub fn load_config(path: Option<&Path>) -> Result<EsldConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            tracing::debug!(path = %p.display(), "loading config");
            load_config_file(&p)
        }
        None => Ok(EsldConfig::default()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<EsldConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let mut config: EsldConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    if let Some(root) = config_root(path) {
        if config.output.output_dir().is_some() {
            config.output.dir = resolve_path(root, &config.output.dir);
        }
        config.output.picture_dir = resolve_path(root, &config.output.picture_dir);
    }

    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut EsldConfig, overrides: &CliOverrides) {
    if let Some(ref out) = overrides.out {
        config.output.dir = out.clone();
    }
    if let Some(ref picture_dir) = overrides.picture_dir {
        config.output.picture_dir = picture_dir.clone();
    }
    if let Some(format) = overrides.format {
        config.output.format = format;
    }
    if let Some(factor) = overrides.font_size_factor {
        config.text.font_size_factor = factor;
    }
    if let Some(strict) = overrides.strict {
        config.convert.strict = strict;
    }
    if let Some(jobs) = overrides.jobs {
        config.convert.jobs = Some(jobs);
    }
}

/// Get the directory containing a config file.
///
/// Returns `None` for a bare file name (the config is in the working directory).
pub fn config_root(config_path: &Path) -> Option<&Path> {
    config_path.parent().filter(|p| !p.as_os_str().is_empty())
}

/// Resolve a path relative to the config root.
///
/// If the path is absolute, returns it unchanged.
/// If relative, joins it with the config root.
pub fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &Path, contents: &str) -> PathBuf {
        let config_path = dir.join(CONFIG_FILE_NAME);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(contents.as_bytes())
            .expect("should write config content");
        config_path
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "[convert]\nstrict = true");

        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "");

        let subdir = temp.path().join("maps").join("city");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        let found = find_config_from(subdir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, None);
    }

    #[test]
    fn test_load_config_resolves_relative_dirs() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(
            temp.path(),
            r#"
[output]
dir = "out"
picture_dir = "/abs/pictures"

[text]
font_size_factor = 2.0
"#,
        );

        let config = load_config(Some(&config_path)).expect("should load valid config");
        assert_eq!(config.output.dir, temp.path().join("out"));
        assert_eq!(config.output.picture_dir, PathBuf::from("/abs/pictures"));
        assert_eq!(config.text.font_size_factor, 2.0);
    }

    #[test]
    fn test_load_config_keeps_empty_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "[output]\ndir = \"\"");

        let config = load_config(Some(&config_path)).expect("should load valid config");
        assert_eq!(config.output.output_dir(), None);
    }

    #[test]
    fn test_load_config_missing_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let result = load_config(Some(&temp.path().join("nonexistent.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "this is not valid toml {{{");

        let result = load_config(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "[convert]\njobs = 0");

        let result = load_config(Some(&config_path));
        match result {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("convert.jobs"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_cli_overrides() {
        let mut config = EsldConfig::default();
        let overrides = CliOverrides {
            out: Some(PathBuf::from("dist")),
            format: Some(OutputFormat::Json),
            strict: Some(true),
            jobs: Some(2),
            ..Default::default()
        };

        merge_cli_overrides(&mut config, &overrides);
        assert_eq!(config.output.dir, PathBuf::from("dist"));
        assert_eq!(config.output.picture_dir, PathBuf::from("."));
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.convert.strict);
        assert_eq!(config.convert.jobs, Some(2));
    }

    #[test]
    fn test_merge_empty_overrides_changes_nothing() {
        let mut config = EsldConfig::default();
        merge_cli_overrides(&mut config, &CliOverrides::default());
        assert_eq!(config.output.dir, PathBuf::from("sld"));
        assert!(!config.convert.strict);
    }

    #[test]
    fn test_resolve_path() {
        let root = Path::new("/project");
        assert_eq!(resolve_path(root, Path::new("/other/path")), PathBuf::from("/other/path"));
        assert_eq!(resolve_path(root, Path::new("sld")), PathBuf::from("/project/sld"));
    }

    #[test]
    fn test_config_root() {
        assert_eq!(config_root(Path::new("/project/esld.toml")), Some(Path::new("/project")));
        assert_eq!(config_root(Path::new("esld.toml")), None);
    }
}
