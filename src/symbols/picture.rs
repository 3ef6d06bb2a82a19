//! `PictureFillSymbol`: polygon fills tiled with an embedded raster.
//!
//! The raster travels base64-encoded inside the ESRI document. It is decoded,
//! optionally recoloured and re-encoded, and referenced from the fill as an
//! external graphic at `<picture_dir>/<layer>.<type>`. The encoded bytes ride
//! along on the graphic as a [`PendingPicture`]; nothing touches the disk
//! until the caller saves them (see `Conversion::save_pictures`).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use base64::Engine;
use image::{ImageFormat, RgbaImage};
use serde_json::Value;
use url::Url;

use super::attributes::{
    exists, expect_object, get_colour, get_double, get_int, get_object, get_string,
    get_transparency, JsonObject,
};
use super::error::ConvertError;
use super::keys;
use super::registry::SymbolRegistry;
use super::traits::{FillProvider, SymbolConverter};
use crate::color::Colour;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::output::{encode_picture, file_stem_for};
use crate::sld::{
    Displacement, ExternalGraphic, Fill, Graphic, PendingPicture, PolygonSymbolizer, Rule,
    Symbolizer,
};

/// MIME type SLD expects for an image file extension.
pub fn image_mime_type(extension: &str) -> String {
    match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png".to_string(),
        "jpg" | "jpeg" => "image/jpeg".to_string(),
        "gif" => "image/gif".to_string(),
        "bmp" => "image/bmp".to_string(),
        "tif" | "tiff" => "image/tiff".to_string(),
        "svg" => "image/svg+xml".to_string(),
        other => format!("image/{}", other),
    }
}

/// Replace every non-background pixel with the foreground colour.
///
/// Only images with exactly two distinct RGB values are recoloured; alpha is
/// ignored when counting and preserved when writing. Returns whether the image
/// was changed.
pub fn recolour(image: &mut RgbaImage, foreground: Colour, background: Colour) -> bool {
    let mut palette = HashSet::new();
    for pixel in image.pixels() {
        palette.insert(Colour::from_rgba(*pixel));
        if palette.len() > 2 {
            return false;
        }
    }
    if palette.len() != 2 {
        return false;
    }

    for pixel in image.pixels_mut() {
        if Colour::from_rgba(*pixel) != background {
            *pixel = foreground.with_alpha(pixel[3]);
        }
    }
    true
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PictureFillSymbol;

impl PictureFillSymbol {
    /// Decode, recolour and re-encode the embedded picture.
    ///
    /// Returns the picture and its extension, or `None` after reporting a
    /// diagnostic.
    fn prepare_picture(
        &self,
        registry: &SymbolRegistry,
        diagnostics: &mut Diagnostics,
        layer_name: &str,
        obj: &JsonObject,
        picture: &JsonObject,
    ) -> Result<Option<(PendingPicture, String)>, ConvertError> {
        let encoded = get_string(picture, keys::PICTURE_IMAGE)?;
        let image_type = get_string(picture, keys::PICTURE_TYPE)?.to_ascii_lowercase();
        let declared = (get_int(picture, keys::PICTURE_WIDTH)?, get_int(picture, keys::PICTURE_HEIGHT)?);

        let bytes = match base64::engine::general_purpose::STANDARD.decode(encoded.trim()) {
            Ok(bytes) => bytes,
            Err(e) => {
                diagnostics.report(
                    DiagnosticKind::PictureFill,
                    format!("Layer '{}': invalid base64 picture: {}", layer_name, e),
                );
                return Ok(None);
            }
        };
        let mut image = match image::load_from_memory(&bytes) {
            Ok(image) => image.to_rgba8(),
            Err(e) => {
                diagnostics.report(
                    DiagnosticKind::PictureFill,
                    format!("Layer '{}': cannot decode picture: {}", layer_name, e),
                );
                return Ok(None);
            }
        };
        if declared != (i64::from(image.width()), i64::from(image.height())) {
            tracing::debug!(
                layer = layer_name,
                "picture is {}x{}, declared {}x{}",
                image.width(),
                image.height(),
                declared.0,
                declared.1
            );
        }

        let foreground = get_colour(obj.get(keys::COLOUR))?;
        let background = get_colour(obj.get(keys::BACKGROUND_COLOUR))?;
        if let (Some(foreground), Some(background)) = (foreground, background) {
            if recolour(&mut image, foreground, background) {
                tracing::debug!(layer = layer_name, "recoloured two-colour picture");
            }
        }

        let Some(format) = ImageFormat::from_extension(&image_type) else {
            diagnostics.report(
                DiagnosticKind::PictureFill,
                format!("Layer '{}': unsupported picture type '{}'", layer_name, image_type),
            );
            return Ok(None);
        };
        let bytes = match encode_picture(&image, format) {
            Ok(bytes) => bytes,
            Err(e) => {
                diagnostics.report(
                    DiagnosticKind::PictureFill,
                    format!("Layer '{}': cannot encode picture: {}", layer_name, e),
                );
                return Ok(None);
            }
        };

        let file_name = format!("{}.{}", file_stem_for(layer_name), image_type);
        let path = registry.options().picture_dir.join(file_name);
        Ok(Some((PendingPicture { path, bytes }, image_type)))
    }

    fn file_url(diagnostics: &mut Diagnostics, path: &Path) -> Option<String> {
        let absolute: PathBuf = match std::path::absolute(path) {
            Ok(absolute) => absolute,
            Err(e) => {
                diagnostics.report(
                    DiagnosticKind::PictureFill,
                    format!("cannot resolve {}: {}", path.display(), e),
                );
                return None;
            }
        };
        match Url::from_file_path(&absolute) {
            Ok(url) => Some(url.to_string()),
            Err(()) => {
                diagnostics.report(
                    DiagnosticKind::PictureFill,
                    format!("cannot express {} as a file URL", absolute.display()),
                );
                None
            }
        }
    }

    fn fill(
        &self,
        registry: &SymbolRegistry,
        diagnostics: &mut Diagnostics,
        layer_name: &str,
        obj: &JsonObject,
        transparency: i64,
    ) -> Result<Fill, ConvertError> {
        let mut graphic = None;

        if let Some(picture) = get_object(obj, keys::PICTURE)? {
            if exists(picture, keys::PICTURE_IMAGE) {
                let prepared = self.prepare_picture(registry, diagnostics, layer_name, obj, picture)?;
                if let Some((pending, extension)) = prepared {
                    if let Some(url) = Self::file_url(diagnostics, &pending.path) {
                        let mut external = ExternalGraphic::new(url, image_mime_type(&extension));
                        external.pending = Some(pending);
                        graphic = Some(Box::new(Graphic {
                            rotation: Some(get_double(obj, keys::ANGLE)?),
                            displacement: Some(Displacement::new(
                                get_double(obj, keys::X_OFFSET)?,
                                get_double(obj, keys::Y_OFFSET)?,
                            )),
                            ..Graphic::external(external)
                        }));
                    }
                }
            }
        }

        Ok(Fill {
            color: get_colour(obj.get(keys::COLOUR))?,
            opacity: get_transparency(transparency),
            graphic_fill: graphic,
        })
    }
}

impl SymbolConverter for PictureFillSymbol {
    fn name(&self) -> &'static str {
        keys::PICTURE_FILL_SYMBOL
    }

    /// Convert with the first outline stroke as the polygon border.
    fn convert(
        &self,
        registry: &SymbolRegistry,
        diagnostics: &mut Diagnostics,
        rule: &mut Rule,
        value: &Value,
        layer_name: &str,
        transparency: i64,
    ) -> Result<(), ConvertError> {
        let obj = expect_object(value, self.name())?;
        let stroke = registry.stroke_list(diagnostics, obj.get(keys::OUTLINE))?.into_iter().next();
        let fill = self.fill(registry, diagnostics, layer_name, obj, transparency)?;
        rule.symbolizers.push(Symbolizer::Polygon(PolygonSymbolizer { fill: Some(fill), stroke }));
        Ok(())
    }

    fn as_fill(&self) -> Option<&dyn FillProvider> {
        Some(self)
    }
}

impl FillProvider for PictureFillSymbol {
    fn fill_symbolizers(
        &self,
        registry: &SymbolRegistry,
        diagnostics: &mut Diagnostics,
        layer_name: &str,
        value: &Value,
        transparency: i64,
    ) -> Result<Vec<Symbolizer>, ConvertError> {
        let obj = expect_object(value, self.name())?;
        let fill = self.fill(registry, diagnostics, layer_name, obj, transparency)?;
        Ok(vec![Symbolizer::Polygon(PolygonSymbolizer { fill: Some(fill), stroke: None })])
    }
}
