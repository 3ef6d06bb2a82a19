//! Layer renderers: turn an ESRI renderer object into an SLD document
//!
//! A renderer decides how features are split into rules (one rule for a
//! simple renderer, one per value for a unique-value renderer). The symbols of
//! each rule are converted through the [`SymbolRegistry`].

mod simple;
mod unique_value;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use serde_json::Value;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::registry::Registry;
use crate::sld::{FeatureTypeStyle, NamedLayer, StyledLayerDescriptor, UserStyle};
use crate::symbols::attributes::{expect_object, extract_name, JsonObject};
use crate::symbols::{ConvertError, SymbolRegistry};

pub use simple::SimpleRenderer;
pub use unique_value::UniqueValueRenderer;

/// Scale and opacity settings of the layer being styled.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayerSettings<'a> {
    pub name: &'a str,
    pub min_scale: f64,
    pub max_scale: f64,
    pub transparency: i64,
}

/// A converter for one ESRI renderer kind.
pub trait RendererConverter: Send + Sync {
    /// The kind key this converter handles, e.g. `UniqueValueRenderer`.
    fn name(&self) -> &'static str;

    fn convert(
        &self,
        symbols: &SymbolRegistry,
        diagnostics: &mut Diagnostics,
        renderer: &JsonObject,
        layer: &LayerSettings<'_>,
    ) -> Result<StyledLayerDescriptor, ConvertError>;
}

/// Wrap a single feature type style in a one-layer SLD document.
pub(crate) fn single_layer_sld(
    layer_name: Option<String>,
    style_name: &str,
    fts: FeatureTypeStyle,
) -> StyledLayerDescriptor {
    let style = UserStyle { name: Some(style_name.to_string()), feature_type_styles: vec![fts] };
    StyledLayerDescriptor { layers: vec![NamedLayer { name: layer_name, styles: vec![style] }] }
}

/// Renderer converters keyed by kind name, tried in name order.
pub struct RendererRegistry {
    renderers: BTreeMap<&'static str, Box<dyn RendererConverter>>,
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.renderers.keys()).finish()
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self { renderers: BTreeMap::new() }
    }

    /// Create a registry with every built-in renderer.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        tracing::debug!("Renderers supported:");
        registry.register(Box::new(SimpleRenderer));
        registry.register(Box::new(UniqueValueRenderer));
        registry
    }

    pub fn global() -> &'static RendererRegistry {
        static GLOBAL: OnceLock<RendererRegistry> = OnceLock::new();
        GLOBAL.get_or_init(RendererRegistry::with_defaults)
    }

    pub fn register(&mut self, renderer: Box<dyn RendererConverter>) {
        tracing::debug!("\t{}", renderer.name());
        self.renderers.insert(renderer.name(), renderer);
    }

    /// Convert a `{ <RendererKind>: {...} }` object into an SLD document.
    ///
    /// Returns `None`, after recording a diagnostic, when the renderer is
    /// missing, unrecognised or ambiguous.
    pub fn convert(
        &self,
        symbols: &SymbolRegistry,
        diagnostics: &mut Diagnostics,
        json: Option<&Value>,
        layer: &LayerSettings<'_>,
    ) -> Result<Option<StyledLayerDescriptor>, ConvertError> {
        let Some(element) = json.filter(|v| !v.is_null()) else {
            diagnostics.report(
                DiagnosticKind::UnsupportedRenderer,
                format!("Layer '{}' has no renderer", layer.name),
            );
            return Ok(None);
        };
        let obj = expect_object(element, "renderer")?;

        let hits: Vec<(&dyn RendererConverter, &Value)> = self
            .renderers
            .iter()
            .filter_map(|(name, renderer)| {
                obj.get(*name).filter(|v| !v.is_null()).map(|value| (renderer.as_ref(), value))
            })
            .collect();

        match hits.as_slice() {
            [(renderer, value)] => {
                let renderer_obj = expect_object(value, renderer.name())?;
                renderer.convert(symbols, diagnostics, renderer_obj, layer).map(Some)
            }
            [] => {
                diagnostics.report(
                    DiagnosticKind::UnsupportedRenderer,
                    format!("Unsupported renderer : {}", extract_name(element)),
                );
                Ok(None)
            }
            _ => {
                let names: Vec<_> = hits.iter().map(|(renderer, _)| renderer.name()).collect();
                diagnostics.report(
                    DiagnosticKind::AmbiguousSymbol,
                    format!("Ambiguous renderer : found {}", names.join(", ")),
                );
                Ok(None)
            }
        }
    }
}

impl Registry<dyn RendererConverter> for RendererRegistry {
    fn contains(&self, name: &str) -> bool {
        self.renderers.contains_key(name)
    }

    fn get(&self, name: &str) -> Option<&(dyn RendererConverter + 'static)> {
        self.renderers.get(name).map(|renderer| renderer.as_ref())
    }

    fn len(&self) -> usize {
        self.renderers.len()
    }

    fn names(&self) -> Box<dyn Iterator<Item = &'static str> + '_> {
        Box::new(self.renderers.keys().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::ConvertOptions;
    use serde_json::json;

    fn layer() -> LayerSettings<'static> {
        LayerSettings { name: "roads", ..Default::default() }
    }

    #[test]
    fn test_defaults() {
        let registry = RendererRegistry::with_defaults();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["SimpleRenderer", "UniqueValueRenderer"]);
    }

    #[test]
    fn test_get_by_kind_name() {
        let registry: &dyn Registry<dyn RendererConverter> = RendererRegistry::global();
        assert_eq!(registry.get("UniqueValueRenderer").map(|r| r.name()), Some("UniqueValueRenderer"));
        assert!(registry.get("HeatMapRenderer").is_none());
        assert!(registry.contains("SimpleRenderer"));
    }

    #[test]
    fn test_unsupported_renderer() {
        let symbols = SymbolRegistry::with_defaults(ConvertOptions::default());
        let mut diagnostics = Diagnostics::new();
        let json = json!({"ClassBreaksRenderer": {}});

        let sld = RendererRegistry::global()
            .convert(&symbols, &mut diagnostics, Some(&json), &layer())
            .unwrap();

        assert!(sld.is_none());
        assert_eq!(diagnostics.count(DiagnosticKind::UnsupportedRenderer), 1);
        assert!(diagnostics.iter().next().unwrap().message.contains("ClassBreaksRenderer"));
    }

    #[test]
    fn test_missing_renderer() {
        let symbols = SymbolRegistry::with_defaults(ConvertOptions::default());
        let mut diagnostics = Diagnostics::new();
        let sld = RendererRegistry::global().convert(&symbols, &mut diagnostics, None, &layer()).unwrap();
        assert!(sld.is_none());
        assert_eq!(diagnostics.count(DiagnosticKind::UnsupportedRenderer), 1);
    }

    #[test]
    fn test_ambiguous_renderer() {
        let symbols = SymbolRegistry::with_defaults(ConvertOptions::default());
        let mut diagnostics = Diagnostics::new();
        let json = json!({"SimpleRenderer": {}, "UniqueValueRenderer": {}});
        let sld = RendererRegistry::global()
            .convert(&symbols, &mut diagnostics, Some(&json), &layer())
            .unwrap();
        assert!(sld.is_none());
        assert_eq!(diagnostics.count(DiagnosticKind::AmbiguousSymbol), 1);
    }

    #[test]
    fn test_renderer_must_be_object() {
        let symbols = SymbolRegistry::with_defaults(ConvertOptions::default());
        let mut diagnostics = Diagnostics::new();
        let json = json!({"SimpleRenderer": "circle"});
        assert!(RendererRegistry::global()
            .convert(&symbols, &mut diagnostics, Some(&json), &layer())
            .is_err());
    }
}
