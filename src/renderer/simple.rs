//! `SimpleRenderer`: every feature drawn with the same symbol.

use super::{single_layer_sld, LayerSettings, RendererConverter};
use crate::diagnostics::Diagnostics;
use crate::sld::{FeatureTypeStyle, Rule, StyledLayerDescriptor};
use crate::symbols::attributes::{get_string, JsonObject};
use crate::symbols::{ConvertError, SymbolRegistry};

const SIMPLE_RENDERER: &str = "SimpleRenderer";
const SYMBOL: &str = "symbol";
const LABEL: &str = "label";
const DESCRIPTION: &str = "description";

#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleRenderer;

impl RendererConverter for SimpleRenderer {
    fn name(&self) -> &'static str {
        SIMPLE_RENDERER
    }

    fn convert(
        &self,
        symbols: &SymbolRegistry,
        diagnostics: &mut Diagnostics,
        renderer: &JsonObject,
        layer: &LayerSettings<'_>,
    ) -> Result<StyledLayerDescriptor, ConvertError> {
        let label = get_string(renderer, LABEL)?;
        let description = get_string(renderer, DESCRIPTION)?;

        let mut rule = Rule::new();
        if !label.is_empty() {
            rule.name = Some(label.clone());
            rule.title = Some(label);
        }
        if !description.is_empty() {
            rule.abstract_text = Some(description);
        }
        rule.set_scale_range(layer.min_scale, layer.max_scale);
        symbols.convert_symbols(
            diagnostics,
            &mut rule,
            layer.name,
            layer.transparency,
            renderer.get(SYMBOL),
        )?;

        let fts = FeatureTypeStyle { rules: vec![rule] };
        Ok(single_layer_sld(Some(layer.name.to_string()), layer.name, fts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sld::Symbolizer;
    use crate::symbols::ConvertOptions;
    use serde_json::json;

    #[test]
    fn test_single_rule() {
        let symbols = SymbolRegistry::with_defaults(ConvertOptions::default());
        let mut diagnostics = Diagnostics::new();
        let renderer = json!({
            "label": "All roads",
            "description": "Every road segment",
            "symbol": {"SimpleLineSymbol": {"width": 2}}
        });
        let layer = LayerSettings { name: "roads", min_scale: 0.0, max_scale: 25_000.0, transparency: 0 };

        let sld = SimpleRenderer
            .convert(&symbols, &mut diagnostics, renderer.as_object().unwrap(), &layer)
            .unwrap();

        assert_eq!(sld.layers[0].name.as_deref(), Some("roads"));
        let rules: Vec<_> = sld.rules().collect();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name.as_deref(), Some("All roads"));
        assert_eq!(rules[0].abstract_text.as_deref(), Some("Every road segment"));
        assert_eq!(rules[0].min_scale_denominator, None);
        assert_eq!(rules[0].max_scale_denominator, Some(25_000.0));
        assert!(matches!(&rules[0].symbolizers[..], [Symbolizer::Line(_)]));
        assert!(rules[0].filter.is_none());
    }

    #[test]
    fn test_unsupported_symbol_keeps_rule() {
        let symbols = SymbolRegistry::with_defaults(ConvertOptions::default());
        let mut diagnostics = Diagnostics::new();
        let renderer = json!({"symbol": {"3DChartSymbol": {}}});
        let layer = LayerSettings { name: "charts", ..Default::default() };

        let sld = SimpleRenderer
            .convert(&symbols, &mut diagnostics, renderer.as_object().unwrap(), &layer)
            .unwrap();

        assert_eq!(sld.rule_count(), 1);
        assert!(sld.rules().all(|rule| rule.symbolizers.is_empty()));
        assert_eq!(diagnostics.len(), 1);
    }
}
