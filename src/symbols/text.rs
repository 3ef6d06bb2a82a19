//! `TextSymbol`: label font, colour and placement.

use serde_json::Value;

use super::attributes::{
    expect_object, get_bool, get_colour, get_double, get_object, get_string, JsonObject,
};
use super::error::ConvertError;
use super::keys;
use super::registry::SymbolRegistry;
use super::traits::{SymbolConverter, TextProvider};
use crate::diagnostics::Diagnostics;
use crate::sld::{
    Displacement, Fill, Font, FontStyle, FontWeight, Halo, PointPlacement, Rule, Symbolizer,
    TextSymbolizer,
};

/// Text opacity. Text symbols carry transparency as a byte (0-255), not a
/// percentage; `0` means no explicit opacity.
pub fn text_opacity(transparency: i64) -> Option<f64> {
    if transparency == 0 {
        None
    } else {
        Some(transparency as f64 / 255.0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextSymbol;

impl TextSymbol {
    fn font(font: &JsonObject, size: f64) -> Result<Font, ConvertError> {
        Ok(Font {
            family: get_string(font, keys::FONT_NAME)?,
            style: if get_bool(font, keys::ITALIC)? { FontStyle::Italic } else { FontStyle::Normal },
            weight: if get_bool(font, keys::BOLD)? { FontWeight::Bold } else { FontWeight::Normal },
            size,
        })
    }

    /// Halo approximating a drop shadow; none without a shadow colour or offset.
    fn halo(obj: &JsonObject) -> Result<Option<Halo>, ConvertError> {
        let Some(colour) = get_colour(obj.get(keys::SHADOW_COLOUR))? else {
            return Ok(None);
        };
        let radius = get_double(obj, keys::SHADOW_X_OFFSET)?
            .abs()
            .max(get_double(obj, keys::SHADOW_Y_OFFSET)?.abs());
        if radius == 0.0 {
            return Ok(None);
        }
        Ok(Some(Halo { radius, fill: Fill::solid(Some(colour), None) }))
    }
}

impl SymbolConverter for TextSymbol {
    fn name(&self) -> &'static str {
        keys::TEXT_SYMBOL
    }

    fn convert(
        &self,
        registry: &SymbolRegistry,
        _diagnostics: &mut Diagnostics,
        rule: &mut Rule,
        value: &Value,
        _layer_name: &str,
        transparency: i64,
    ) -> Result<(), ConvertError> {
        let symbolizer = self.text_symbolizer(registry, value, transparency)?;
        rule.symbolizers.push(Symbolizer::Text(symbolizer));
        Ok(())
    }

    fn as_text(&self) -> Option<&dyn TextProvider> {
        Some(self)
    }
}

impl TextProvider for TextSymbol {
    fn text_symbolizer(
        &self,
        registry: &SymbolRegistry,
        value: &Value,
        transparency: i64,
    ) -> Result<TextSymbolizer, ConvertError> {
        let obj = expect_object(value, self.name())?;
        let size = get_double(obj, keys::SIZE)? + registry.options().font_size_factor;

        let font = match get_object(obj, keys::FONT)? {
            Some(font) => Some(Self::font(font, size)?),
            None => None,
        };
        let placement = PointPlacement {
            anchor: Displacement::new(0.0, 0.0),
            displacement: Displacement::new(
                get_double(obj, keys::X_OFFSET)?,
                get_double(obj, keys::Y_OFFSET)?,
            ),
            rotation: get_double(obj, keys::ANGLE)?,
        };

        Ok(TextSymbolizer {
            label: None,
            font,
            placement: Some(placement),
            halo: Self::halo(obj)?,
            fill: Some(Fill::solid(get_colour(obj.get(keys::COLOUR))?, text_opacity(transparency))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Colour;
    use crate::diagnostics::DiagnosticKind;
    use crate::symbols::ConvertOptions;
    use serde_json::json;

    fn convert(registry: &SymbolRegistry, json: Value, transparency: i64) -> TextSymbolizer {
        let mut diagnostics = Diagnostics::new();
        registry
            .convert_text_symbols(&mut diagnostics, transparency, Some(&json))
            .unwrap()
            .unwrap()
    }

    fn defaults() -> SymbolRegistry {
        SymbolRegistry::with_defaults(ConvertOptions::default())
    }

    #[test]
    fn test_font_and_fill() {
        let text = convert(
            &defaults(),
            json!({"TextSymbol": {
                "font": {"fontName": "Arial", "bold": true, "italic": false},
                "size": 10,
                "color": {"red": 20, "green": 40, "blue": 60}
            }}),
            0,
        );
        let font = text.font.unwrap();
        assert_eq!(font.family, "Arial");
        assert_eq!(font.weight, FontWeight::Bold);
        assert_eq!(font.style, FontStyle::Normal);
        assert_eq!(font.size, 10.0);
        let fill = text.fill.unwrap();
        assert_eq!(fill.color, Some(Colour::new(20, 40, 60)));
        assert_eq!(fill.opacity, None);
    }

    #[test]
    fn test_opacity_uses_byte_scale() {
        let text = convert(&defaults(), json!({"TextSymbol": {}}), 51);
        assert_eq!(text.fill.unwrap().opacity, Some(0.2));
        assert_eq!(text_opacity(255), Some(1.0));
        assert_eq!(text_opacity(0), None);
    }

    #[test]
    fn test_font_size_factor() {
        let registry = SymbolRegistry::with_defaults(ConvertOptions {
            font_size_factor: 2.5,
            ..Default::default()
        });
        let text = convert(&registry, json!({"TextSymbol": {"font": {"fontName": "Tahoma"}, "size": 8}}), 0);
        assert_eq!(text.font.unwrap().size, 10.5);
    }

    #[test]
    fn test_no_font_object_leaves_font_unset() {
        let text = convert(&defaults(), json!({"TextSymbol": {"size": 8}}), 0);
        assert!(text.font.is_none());
    }

    #[test]
    fn test_placement_and_halo() {
        let text = convert(
            &defaults(),
            json!({"TextSymbol": {
                "angle": 30,
                "xOffset": 1,
                "yOffset": -2,
                "shadowColor": {"red": 255, "green": 255, "blue": 255},
                "shadowXOffset": -1.5,
                "shadowYOffset": 1
            }}),
            0,
        );
        let placement = text.placement.unwrap();
        assert_eq!(placement.anchor, Displacement::new(0.0, 0.0));
        assert_eq!(placement.displacement, Displacement::new(1.0, -2.0));
        assert_eq!(placement.rotation, 30.0);
        let halo = text.halo.unwrap();
        assert_eq!(halo.radius, 1.5);
        assert_eq!(halo.fill.color, Some(Colour::new(255, 255, 255)));
    }

    #[test]
    fn test_shadow_without_offset_has_no_halo() {
        let text = convert(
            &defaults(),
            json!({"TextSymbol": {"shadowColor": {"red": 0, "green": 0, "blue": 0}}}),
            0,
        );
        assert!(text.halo.is_none());
    }

    #[test]
    fn test_unsupported_text_kind() {
        let mut diagnostics = Diagnostics::new();
        let json = json!({"BalloonCallout": {}});
        let result = defaults().convert_text_symbols(&mut diagnostics, 0, Some(&json)).unwrap();
        assert!(result.is_none());
        assert_eq!(diagnostics.count(DiagnosticKind::UnsupportedTextSymbol), 1);
    }

    #[test]
    fn test_convert_appends_text_symbolizer() {
        let registry = defaults();
        let mut diagnostics = Diagnostics::new();
        let mut rule = Rule::new();
        let json = json!({"TextSymbol": {"font": {"fontName": "Verdana"}, "size": 9}});
        registry.convert_symbols(&mut diagnostics, &mut rule, "labels", 0, Some(&json)).unwrap();
        assert!(matches!(&rule.symbolizers[..], [Symbolizer::Text(_)]));
    }
}
