//! Marker symbol converters: simple shapes, font glyphs and multi-layer markers.

use serde_json::Value;

use super::attributes::{
    expect_array, expect_object, get_bool, get_colour, get_double, get_int, get_object,
    get_string, get_transparency, normalise_angle, JsonObject,
};
use super::error::ConvertError;
use super::keys;
use super::registry::SymbolRegistry;
use super::traits::{MarkerProvider, SymbolConverter};
use crate::diagnostics::Diagnostics;
use crate::sld::{Displacement, Fill, Graphic, Mark, PointSymbolizer, Rule, Stroke, Symbolizer};

/// Size, rotation and offset shared by every marker kind.
fn place(mut graphic: Graphic, obj: &JsonObject, extra_rotation: f64) -> Result<Graphic, ConvertError> {
    graphic.size = Some(get_double(obj, keys::SIZE)?);

    let angle = get_double(obj, keys::ANGLE)? + extra_rotation;
    if angle != 0.0 {
        graphic.rotation = Some(normalise_angle(angle));
    }

    let displacement =
        Displacement::new(get_double(obj, keys::X_OFFSET)?, get_double(obj, keys::Y_OFFSET)?);
    if !displacement.is_zero() {
        graphic.displacement = Some(displacement);
    }
    Ok(graphic)
}

/// Append one point symbolizer per graphic, applying the layer opacity.
fn push_point_symbolizers(rule: &mut Rule, graphics: Vec<Graphic>, transparency: i64) {
    let opacity = get_transparency(transparency);
    for mut graphic in graphics {
        if graphic.opacity.is_none() {
            graphic.opacity = opacity;
        }
        rule.symbolizers.push(Symbolizer::Point(PointSymbolizer { graphic }));
    }
}

/// `SimpleMarkerSymbol`: a filled well-known shape with an optional outline.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleMarkerSymbol;

impl SimpleMarkerSymbol {
    /// Well-known name and extra rotation for an ESRI marker style.
    fn shape(style: i64) -> (&'static str, f64) {
        match style {
            1 => ("square", 0.0),
            2 => ("cross", 0.0),
            3 => ("x", 0.0),
            4 => ("square", 45.0),
            _ => ("circle", 0.0),
        }
    }
}

impl SymbolConverter for SimpleMarkerSymbol {
    fn name(&self) -> &'static str {
        keys::SIMPLE_MARKER_SYMBOL
    }

    fn convert(
        &self,
        registry: &SymbolRegistry,
        diagnostics: &mut Diagnostics,
        rule: &mut Rule,
        value: &Value,
        _layer_name: &str,
        transparency: i64,
    ) -> Result<(), ConvertError> {
        let graphics = self.graphics(registry, diagnostics, value)?;
        push_point_symbolizers(rule, graphics, transparency);
        Ok(())
    }

    fn as_marker(&self) -> Option<&dyn MarkerProvider> {
        Some(self)
    }
}

impl MarkerProvider for SimpleMarkerSymbol {
    fn graphics(
        &self,
        _registry: &SymbolRegistry,
        _diagnostics: &mut Diagnostics,
        value: &Value,
    ) -> Result<Vec<Graphic>, ConvertError> {
        let obj = expect_object(value, self.name())?;
        let (well_known_name, extra_rotation) = Self::shape(get_int(obj, keys::STYLE)?);

        let stroke = if get_bool(obj, keys::OUTLINE)? {
            Some(Stroke::new(
                get_colour(obj.get(keys::OUTLINE_COLOUR))?,
                get_double(obj, keys::OUTLINE_SIZE)?,
            ))
        } else {
            None
        };
        let mark = Mark {
            well_known_name: well_known_name.to_string(),
            fill: Some(Fill::solid(get_colour(obj.get(keys::COLOUR))?, None)),
            stroke,
        };

        Ok(vec![place(Graphic::mark(mark), obj, extra_rotation)?])
    }
}

/// `CharacterMarkerSymbol`: a glyph from a TrueType font.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterMarkerSymbol;

impl CharacterMarkerSymbol {
    /// `ttf://` well-known name for a font glyph.
    pub fn glyph_name(font_name: &str, character_index: i64) -> String {
        format!("ttf://{}#0x{:04X}", font_name, character_index.max(0))
    }
}

impl SymbolConverter for CharacterMarkerSymbol {
    fn name(&self) -> &'static str {
        keys::CHARACTER_MARKER_SYMBOL
    }

    fn convert(
        &self,
        registry: &SymbolRegistry,
        diagnostics: &mut Diagnostics,
        rule: &mut Rule,
        value: &Value,
        _layer_name: &str,
        transparency: i64,
    ) -> Result<(), ConvertError> {
        let graphics = self.graphics(registry, diagnostics, value)?;
        push_point_symbolizers(rule, graphics, transparency);
        Ok(())
    }

    fn as_marker(&self) -> Option<&dyn MarkerProvider> {
        Some(self)
    }
}

impl MarkerProvider for CharacterMarkerSymbol {
    fn graphics(
        &self,
        _registry: &SymbolRegistry,
        _diagnostics: &mut Diagnostics,
        value: &Value,
    ) -> Result<Vec<Graphic>, ConvertError> {
        let obj = expect_object(value, self.name())?;
        let font_name = match get_object(obj, keys::FONT)? {
            Some(font) => get_string(font, keys::FONT_NAME)?,
            None => String::new(),
        };

        let mark = Mark {
            well_known_name: Self::glyph_name(&font_name, get_int(obj, keys::CHARACTER_INDEX)?),
            fill: Some(Fill::solid(get_colour(obj.get(keys::COLOUR))?, None)),
            stroke: None,
        };

        Ok(vec![place(Graphic::mark(mark), obj, 0.0)?])
    }
}

/// `MultiLayerMarkerSymbol`: an ordered array of marker symbols, bottom first.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiLayerMarkerSymbol;

impl SymbolConverter for MultiLayerMarkerSymbol {
    fn name(&self) -> &'static str {
        keys::MULTI_LAYER_MARKER_SYMBOL
    }

    fn convert(
        &self,
        registry: &SymbolRegistry,
        diagnostics: &mut Diagnostics,
        rule: &mut Rule,
        value: &Value,
        _layer_name: &str,
        transparency: i64,
    ) -> Result<(), ConvertError> {
        let graphics = self.graphics(registry, diagnostics, value)?;
        push_point_symbolizers(rule, graphics, transparency);
        Ok(())
    }

    fn as_marker(&self) -> Option<&dyn MarkerProvider> {
        Some(self)
    }
}

impl MarkerProvider for MultiLayerMarkerSymbol {
    fn graphics(
        &self,
        registry: &SymbolRegistry,
        diagnostics: &mut Diagnostics,
        value: &Value,
    ) -> Result<Vec<Graphic>, ConvertError> {
        let mut graphics = Vec::new();
        for layer in expect_array(value, self.name())? {
            graphics.extend(registry.marker_list(diagnostics, Some(layer))?);
        }
        Ok(graphics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Colour;
    use crate::symbols::ConvertOptions;
    use serde_json::json;

    fn graphics(json: Value) -> Vec<Graphic> {
        let registry = SymbolRegistry::with_defaults(ConvertOptions::default());
        let mut diagnostics = Diagnostics::new();
        let graphics = registry.marker_list(&mut diagnostics, Some(&json)).unwrap();
        assert!(diagnostics.is_empty());
        graphics
    }

    #[test]
    fn test_simple_marker_circle() {
        let result = graphics(json!({"SimpleMarkerSymbol": {
            "color": {"red": 255, "green": 255, "blue": 0},
            "size": 8,
            "style": 0
        }}));
        assert_eq!(result.len(), 1);
        let mark = result[0].first_mark().unwrap();
        assert_eq!(mark.well_known_name, "circle");
        assert_eq!(mark.fill.as_ref().unwrap().color, Some(Colour::new(255, 255, 0)));
        assert!(mark.stroke.is_none());
        assert_eq!(result[0].size, Some(8.0));
        assert_eq!(result[0].rotation, None);
        assert_eq!(result[0].displacement, None);
    }

    #[test]
    fn test_simple_marker_outline_and_offset() {
        let result = graphics(json!({"SimpleMarkerSymbol": {
            "style": 3,
            "size": 6,
            "angle": 10,
            "xOffset": 1,
            "yOffset": 2,
            "outline": true,
            "outlineColor": {"red": 0, "green": 0, "blue": 0},
            "outlineSize": 0.5
        }}));
        let mark = result[0].first_mark().unwrap();
        assert_eq!(mark.well_known_name, "x");
        let stroke = mark.stroke.as_ref().unwrap();
        assert_eq!(stroke.color, Some(Colour::BLACK));
        assert_eq!(stroke.width, Some(0.5));
        assert_eq!(result[0].rotation, Some(10.0));
        assert_eq!(result[0].displacement, Some(Displacement::new(1.0, 2.0)));
    }

    #[test]
    fn test_diamond_is_rotated_square() {
        let result = graphics(json!({"SimpleMarkerSymbol": {"style": 4, "angle": 330}}));
        assert_eq!(result[0].first_mark().unwrap().well_known_name, "square");
        assert_eq!(result[0].rotation, Some(15.0));
    }

    #[test]
    fn test_huge_angle_is_normalised() {
        let result = graphics(json!({"SimpleMarkerSymbol": {"style": 0, "angle": -7.77e31}}));
        let rotation = result[0].rotation.unwrap_or(0.0);
        assert!((0.0..=360.0).contains(&rotation));
    }

    #[test]
    fn test_character_marker_glyph() {
        let result = graphics(json!({"CharacterMarkerSymbol": {
            "characterIndex": 65,
            "font": {"fontName": "ESRI Default Marker"},
            "size": 12
        }}));
        assert_eq!(
            result[0].first_mark().unwrap().well_known_name,
            "ttf://ESRI Default Marker#0x0041"
        );
    }

    #[test]
    fn test_multi_layer_marker_order() {
        let result = graphics(json!({"MultiLayerMarkerSymbol": [
            {"SimpleMarkerSymbol": {"style": 1}},
            {"CharacterMarkerSymbol": {"characterIndex": 33}},
            {"SimpleMarkerSymbol": {"style": 2}}
        ]}));
        let names: Vec<_> =
            result.iter().map(|g| g.first_mark().unwrap().well_known_name.clone()).collect();
        assert_eq!(names, vec!["square", "ttf://#0x0021", "cross"]);
    }

    #[test]
    fn test_convert_makes_point_symbolizers() {
        let registry = SymbolRegistry::with_defaults(ConvertOptions::default());
        let mut diagnostics = Diagnostics::new();
        let mut rule = Rule::new();
        let json = json!({"MultiLayerMarkerSymbol": [
            {"SimpleMarkerSymbol": {}},
            {"SimpleMarkerSymbol": {}}
        ]});
        registry.convert_symbols(&mut diagnostics, &mut rule, "wells", 20, Some(&json)).unwrap();

        assert_eq!(rule.symbolizers.len(), 2);
        for symbolizer in &rule.symbolizers {
            match symbolizer {
                Symbolizer::Point(point) => assert_eq!(point.graphic.opacity, Some(0.8)),
                other => panic!("unexpected symbolizer {:?}", other),
            }
        }
    }
}
