//! SLD and picture output, and file path generation

use image::{DynamicImage, ImageFormat, RgbaImage};
use std::fs::File;
use std::io::{self, BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};

/// Error type for output operations
#[derive(Debug)]
pub enum OutputError {
    /// IO error during file operations
    Io(io::Error),
    /// Image encoding error
    Image(image::ImageError),
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Io(e) => write!(f, "IO error: {}", e),
            OutputError::Image(e) => write!(f, "Image error: {}", e),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Io(e) => Some(e),
            OutputError::Image(e) => Some(e),
        }
    }
}

impl From<io::Error> for OutputError {
    fn from(e: io::Error) -> Self {
        OutputError::Io(e)
    }
}

impl From<image::ImageError> for OutputError {
    fn from(e: image::ImageError) -> Self {
        OutputError::Image(e)
    }
}

fn create_parent_dirs(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Encode an image in the given format.
///
/// Formats without an alpha channel (JPEG) get the image flattened to RGB
/// first.
pub fn encode_picture(image: &RgbaImage, format: ImageFormat) -> Result<Vec<u8>, OutputError> {
    let mut encoded = DynamicImage::ImageRgba8(image.clone());
    if format == ImageFormat::Jpeg {
        encoded = DynamicImage::ImageRgb8(encoded.to_rgb8());
    }

    let mut bytes = Cursor::new(Vec::new());
    encoded.write_to(&mut bytes, format)?;
    Ok(bytes.into_inner())
}

/// Write encoded picture bytes to `path`, creating parent directories.
///
/// The file is owned by this call and closed before it returns, on success
/// and on failure.
pub fn save_picture(bytes: &[u8], path: &Path) -> Result<(), OutputError> {
    create_parent_dirs(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(bytes)?;
    writer.flush()?;
    Ok(())
}

/// Write an SLD document to a file.
pub fn save_sld(xml: &str, path: &Path) -> Result<(), OutputError> {
    create_parent_dirs(path)?;
    std::fs::write(path, xml)?;
    Ok(())
}

/// Make a layer name safe to use as a file stem.
///
/// Path separators and characters rejected by common filesystems become `_`.
/// An empty name becomes `layer`.
pub fn file_stem_for(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if stem.is_empty() {
        "layer".to_string()
    } else {
        stem
    }
}

/// Generate the output path for one layer's SLD.
///
/// # Output Naming Rules
///
/// | Scenario | Output |
/// |----------|--------|
/// | Single layer, no output dir | `{input_stem}.sld` next to the input |
/// | Multiple layers, no output dir | `{input_stem}_{layer}.sld` next to the input |
/// | With an output dir | `{dir}/{layer}.sld` |
///
/// # Arguments
///
/// * `input` - The input file path (used for default naming)
/// * `layer_name` - The name of the layer being saved
/// * `output_dir` - The output directory, if configured
/// * `is_single_layer` - Whether there's only one layer in the input
pub fn generate_output_path(
    input: &Path,
    layer_name: &str,
    output_dir: Option<&Path>,
    is_single_layer: bool,
) -> PathBuf {
    let input_stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("output");

    match output_dir {
        Some(dir) => {
            let stem = if layer_name.trim().is_empty() { input_stem } else { layer_name };
            dir.join(format!("{}.sld", file_stem_for(stem)))
        }
        None => {
            let file_name = if is_single_layer {
                format!("{}.sld", input_stem)
            } else {
                format!("{}_{}.sld", input_stem, file_stem_for(layer_name))
            };
            let parent = input.parent().unwrap_or(Path::new(""));
            if parent.as_os_str().is_empty() {
                PathBuf::from(file_name)
            } else {
                parent.join(file_name)
            }
        }
    }
}
