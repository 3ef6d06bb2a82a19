//! Configuration schema types for `esld.toml`
//!
//! Defines the structure and validation rules for converter configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::color::parse_hex_colour;
use crate::symbols::ConvertOptions;

/// Output document format
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// SLD 1.0 XML
    #[default]
    Sld,
    /// The SLD object model as JSON
    Json,
}

impl OutputFormat {
    /// File extension of written styles. JSON output keeps an `.sld` part so
    /// it never takes the name of a `.json` layer document.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Sld => "sld",
            OutputFormat::Json => "sld.json",
        }
    }
}

/// Where converted files are written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for generated SLD files; empty means next to each input
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
    /// Directory for picture-fill images
    #[serde(default = "default_picture_dir")]
    pub picture_dir: PathBuf,
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_dir() -> PathBuf {
    PathBuf::from("sld")
}

fn default_picture_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: default_dir(), picture_dir: default_picture_dir(), format: OutputFormat::default() }
    }
}

impl OutputConfig {
    /// The configured output directory, or `None` to write next to the input.
    pub fn output_dir(&self) -> Option<&Path> {
        if self.dir.as_os_str().is_empty() {
            None
        } else {
            Some(&self.dir)
        }
    }
}

/// Label settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextConfig {
    /// Added to every text symbol's font size
    #[serde(default)]
    pub font_size_factor: f64,
}

/// Conversion settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Treat any diagnostic as a failure
    #[serde(default)]
    pub strict: bool,
    /// Hatch colour for line fills without an outline, as `#RRGGBB`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_stroke_colour: Option<String>,
    /// Number of documents converted in parallel (default: all cores)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
}

/// Complete esld.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EsldConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub text: TextConfig,
    #[serde(default)]
    pub convert: ConvertConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "convert.jobs")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "esld.toml: '{}' {}", self.field, self.message)
    }
}

impl EsldConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.output.picture_dir.as_os_str().is_empty() {
            errors.push(ConfigValidationError {
                field: "output.picture_dir".to_string(),
                message: "must be a non-empty path".to_string(),
            });
        }

        if !self.text.font_size_factor.is_finite() {
            errors.push(ConfigValidationError {
                field: "text.font_size_factor".to_string(),
                message: "must be a finite number".to_string(),
            });
        }

        if let Some(colour) = &self.convert.default_stroke_colour {
            if let Err(e) = parse_hex_colour(colour) {
                errors.push(ConfigValidationError {
                    field: "convert.default_stroke_colour".to_string(),
                    message: format!("is not a valid colour: {}", e),
                });
            }
        }

        if self.convert.jobs == Some(0) {
            errors.push(ConfigValidationError {
                field: "convert.jobs".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        errors
    }

    /// Symbol conversion settings derived from this configuration.
    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            font_size_factor: self.text.font_size_factor,
            picture_dir: self.output.picture_dir.clone(),
            default_stroke_colour: self
                .convert
                .default_stroke_colour
                .as_deref()
                .and_then(|colour| parse_hex_colour(colour).ok()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Colour;

    #[test]
    fn test_minimal_config() {
        let config: EsldConfig = toml::from_str("").unwrap();
        assert_eq!(config.output.dir, PathBuf::from("sld"));
        assert_eq!(config.output.picture_dir, PathBuf::from("."));
        assert_eq!(config.output.format, OutputFormat::Sld);
        assert_eq!(config.text.font_size_factor, 0.0);
        assert!(!config.convert.strict);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_full_config() {
        let config: EsldConfig = toml::from_str(
            r##"
[output]
dir = "styles"
picture_dir = "styles/images"
format = "json"

[text]
font_size_factor = 1.5

[convert]
strict = true
default_stroke_colour = "#808080"
jobs = 4
"##,
        )
        .unwrap();

        assert_eq!(config.output.output_dir(), Some(Path::new("styles")));
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.convert.strict);
        assert_eq!(config.convert.jobs, Some(4));

        let options = config.convert_options();
        assert_eq!(options.font_size_factor, 1.5);
        assert_eq!(options.picture_dir, PathBuf::from("styles/images"));
        assert_eq!(options.default_stroke_colour, Some(Colour::GREY));
    }

    #[test]
    fn test_empty_dir_means_beside_input() {
        let config: EsldConfig = toml::from_str("[output]\ndir = \"\"").unwrap();
        assert_eq!(config.output.output_dir(), None);
    }

    #[test]
    fn test_validation_errors() {
        let config: EsldConfig = toml::from_str(
            r#"
[output]
picture_dir = ""

[convert]
default_stroke_colour = "grey"
jobs = 0
"#,
        )
        .unwrap();

        let fields: Vec<_> = config.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["output.picture_dir", "convert.default_stroke_colour", "convert.jobs"]
        );
    }

    #[test]
    fn test_unknown_format_rejected() {
        let result: Result<EsldConfig, _> = toml::from_str("[output]\nformat = \"mapcss\"");
        assert!(result.is_err());
    }
}
