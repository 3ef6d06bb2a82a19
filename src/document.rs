//! ESRI layer documents and their conversion to SLD
//!
//! A layer document is the JSON the MXD/LYR exporter writes:
//!
//! ```json
//! { "layers": [ { "name": "Roads", "transparency": 0, "minScale": 0,
//!                 "maxScale": 50000, "renderer": { "SimpleRenderer": { ... } } } ] }
//! ```
//!
//! Each layer with a supported renderer becomes one [`LayerStyle`].

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::diagnostics::Diagnostics;
use crate::output::{save_picture, OutputError};
use crate::renderer::{LayerSettings, RendererRegistry};
use crate::sld::StyledLayerDescriptor;
use crate::symbols::{ConvertError, SymbolRegistry};

/// Error type for layer document conversion
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The input is not JSON or does not have the layer document shape
    #[error("invalid layer document: {0}")]
    Json(#[from] serde_json::Error),
    /// A symbol or renderer field had the wrong JSON type
    #[error("layer '{layer}': {source}")]
    Convert {
        layer: String,
        #[source]
        source: ConvertError,
    },
    /// A picture-fill image could not be saved
    #[error("cannot write {}: {source}", path.display())]
    Picture {
        path: PathBuf,
        #[source]
        source: OutputError,
    },
}

/// Top-level layer document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayerDocument {
    #[serde(default)]
    pub layers: Vec<LayerEntry>,
}

/// One layer and its renderer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerEntry {
    #[serde(default)]
    pub name: String,
    /// Layer transparency percentage (0-100)
    #[serde(default)]
    pub transparency: i64,
    #[serde(default)]
    pub min_scale: f64,
    #[serde(default)]
    pub max_scale: f64,
    #[serde(default)]
    pub renderer: Option<Value>,
}

impl LayerDocument {
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The SLD produced for one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStyle {
    pub layer_name: String,
    pub sld: StyledLayerDescriptor,
}

/// Result of converting a whole document.
#[derive(Debug, Clone, Default)]
pub struct Conversion {
    pub styles: Vec<LayerStyle>,
    pub diagnostics: Diagnostics,
}

impl Conversion {
    /// Save the picture-fill images the styles reference.
    ///
    /// Conversion itself never writes files, so callers decide whether a
    /// conversion is worth keeping before anything lands on disk. Returns the
    /// written paths in document order.
    pub fn save_pictures(&self) -> Result<Vec<PathBuf>, DocumentError> {
        let mut written = Vec::new();
        for style in &self.styles {
            for picture in style.sld.pending_pictures() {
                save_picture(&picture.bytes, &picture.path)
                    .map_err(|source| DocumentError::Picture { path: picture.path.clone(), source })?;
                tracing::debug!(path = %picture.path.display(), "wrote picture");
                written.push(picture.path.clone());
            }
        }
        Ok(written)
    }
}

/// Convert every layer of a document.
///
/// Layers whose renderer is missing or unsupported are skipped with a
/// diagnostic. A structural JSON error stops the conversion.
pub fn convert_document(
    symbols: &SymbolRegistry,
    renderers: &RendererRegistry,
    document: &LayerDocument,
) -> Result<Conversion, DocumentError> {
    let mut conversion = Conversion::default();

    for entry in &document.layers {
        let _span = tracing::debug_span!("layer", name = %entry.name).entered();
        let settings = LayerSettings {
            name: &entry.name,
            min_scale: entry.min_scale,
            max_scale: entry.max_scale,
            transparency: entry.transparency,
        };
        let sld = renderers
            .convert(symbols, &mut conversion.diagnostics, entry.renderer.as_ref(), &settings)
            .map_err(|source| DocumentError::Convert { layer: entry.name.clone(), source })?;

        if let Some(sld) = sld {
            tracing::debug!(rules = sld.rule_count(), "converted layer");
            conversion.styles.push(LayerStyle { layer_name: entry.name.clone(), sld });
        }
    }

    Ok(conversion)
}

/// Parse and convert a JSON layer document.
pub fn convert_json(
    symbols: &SymbolRegistry,
    renderers: &RendererRegistry,
    json: &str,
) -> Result<Conversion, DocumentError> {
    let document = LayerDocument::from_json(json)?;
    convert_document(symbols, renderers, &document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;
    use crate::symbols::ConvertOptions;

    fn convert(json: &str) -> Result<Conversion, DocumentError> {
        let symbols = SymbolRegistry::with_defaults(ConvertOptions::default());
        convert_json(&symbols, RendererRegistry::global(), json)
    }

    #[test]
    fn test_layer_fields() {
        let document = LayerDocument::from_json(
            r#"{"layers": [{"name": "Roads", "transparency": 30, "minScale": 100, "maxScale": 5000}]}"#,
        )
        .unwrap();
        let layer = &document.layers[0];
        assert_eq!(layer.name, "Roads");
        assert_eq!(layer.transparency, 30);
        assert_eq!(layer.min_scale, 100.0);
        assert_eq!(layer.max_scale, 5000.0);
        assert!(layer.renderer.is_none());
    }

    #[test]
    fn test_converts_each_layer() {
        let conversion = convert(
            r#"{"layers": [
                {"name": "Roads", "renderer": {"SimpleRenderer": {"symbol": {"SimpleLineSymbol": {"width": 1}}}}},
                {"name": "Charts", "renderer": {"ChartRenderer": {}}},
                {"name": "Parks", "renderer": {"SimpleRenderer": {"symbol": {"SimpleFillSymbol": {}}}}}
            ]}"#,
        )
        .unwrap();

        let names: Vec<_> = conversion.styles.iter().map(|s| s.layer_name.as_str()).collect();
        assert_eq!(names, vec!["Roads", "Parks"]);
        assert_eq!(conversion.diagnostics.count(DiagnosticKind::UnsupportedRenderer), 1);
    }

    #[test]
    fn test_structural_error_names_layer() {
        let err = convert(
            r#"{"layers": [{"name": "Bad", "renderer": {"SimpleRenderer": {"symbol": {"SimpleLineSymbol": {"width": "wide"}}}}}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, DocumentError::Convert { ref layer, .. } if layer == "Bad"));
        assert!(err.to_string().contains("width"));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(convert("{layers"), Err(DocumentError::Json(_))));
        assert!(matches!(convert(r#"{"layers": 3}"#), Err(DocumentError::Json(_))));
    }

    #[test]
    fn test_empty_document() {
        let conversion = convert("{}").unwrap();
        assert!(conversion.styles.is_empty());
        assert!(conversion.diagnostics.is_empty());
    }

    fn picture_conversion(path: PathBuf) -> Conversion {
        use crate::sld::{
            ExternalGraphic, FeatureTypeStyle, Graphic, NamedLayer, PendingPicture,
            PointSymbolizer, Rule, Symbolizer, UserStyle,
        };

        let mut external = ExternalGraphic::new("file:///unused.png", "image/png");
        external.pending = Some(PendingPicture { path, bytes: b"png bytes".to_vec() });
        let mut rule = Rule::new();
        rule.symbolizers.push(Symbolizer::Point(PointSymbolizer { graphic: Graphic::external(external) }));

        let sld = StyledLayerDescriptor {
            layers: vec![NamedLayer {
                name: Some("Sites".into()),
                styles: vec![UserStyle {
                    name: None,
                    feature_type_styles: vec![FeatureTypeStyle { rules: vec![rule] }],
                }],
            }],
        };
        Conversion {
            styles: vec![LayerStyle { layer_name: "Sites".into(), sld }],
            diagnostics: Diagnostics::new(),
        }
    }

    #[test]
    fn test_save_pictures_writes_pending_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pictures/Sites.png");
        let conversion = picture_conversion(path.clone());

        assert!(!path.exists());
        let written = conversion.save_pictures().unwrap();
        assert_eq!(written, vec![path.clone()]);
        assert_eq!(std::fs::read(&path).unwrap(), b"png bytes");
    }

    #[test]
    fn test_save_pictures_reports_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocked = dir.path().join("blocked.png");
        // A directory already occupies the picture file name
        std::fs::create_dir(&blocked).unwrap();

        let err = picture_conversion(blocked.clone()).save_pictures().unwrap_err();
        assert!(matches!(err, DocumentError::Picture { ref path, .. } if *path == blocked));
        assert!(err.to_string().contains("blocked.png"));
    }
}
