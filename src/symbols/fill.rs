//! Fill symbol converters: simple, hatched line and multi-layer fills.

use serde_json::Value;

use super::attributes::{
    angle_matches, expect_array, expect_object, get_colour, get_double, get_int,
    get_transparency, normalise_angle,
};
use super::error::ConvertError;
use super::keys;
use super::registry::SymbolRegistry;
use super::traits::{FillProvider, SymbolConverter};
use crate::color::Colour;
use crate::diagnostics::Diagnostics;
use crate::sld::{Fill, Graphic, Mark, PolygonSymbolizer, Rule, Stroke, Symbolizer};

pub const HORLINE: &str = "shape://horline";
pub const VERTLINE: &str = "shape://vertline";
pub const SLASH: &str = "shape://slash";
pub const BACKSLASH: &str = "shape://backslash";
pub const PLUS: &str = "shape://plus";
pub const TIMES: &str = "shape://times";

/// Pick the hatch mark for a line-fill angle.
///
/// Angles on a 45 degree boundary map to one of the four canonical hatch
/// shapes. Anything else is drawn as a vertical hatch rotated by the angle
/// exactly as given.
///
/// ```
/// use esri2sld::symbols::fill::hatch_for_angle;
///
/// assert_eq!(hatch_for_angle(0.0), ("shape://horline", None));
/// assert_eq!(hatch_for_angle(45.0), ("shape://slash", None));
/// assert_eq!(hatch_for_angle(30.0), ("shape://vertline", Some(30.0)));
/// assert_eq!(hatch_for_angle(390.0), ("shape://vertline", Some(390.0)));
/// ```
pub fn hatch_for_angle(angle: f64) -> (&'static str, Option<f64>) {
    let normalised = normalise_angle(angle);
    let canonical = [
        (0.0, HORLINE),
        (180.0, HORLINE),
        (360.0, HORLINE),
        (90.0, VERTLINE),
        (270.0, VERTLINE),
        (45.0, SLASH),
        (225.0, SLASH),
        (135.0, BACKSLASH),
        (315.0, BACKSLASH),
    ];
    canonical
        .iter()
        .find(|(target, _)| angle_matches(normalised, *target))
        .map(|(_, name)| (*name, None))
        .unwrap_or((VERTLINE, Some(angle)))
}

/// Resolve a fill's `outline` to its first stroke, with the layer opacity.
fn outline_stroke(
    registry: &SymbolRegistry,
    diagnostics: &mut Diagnostics,
    outline: Option<&Value>,
    opacity: Option<f64>,
) -> Result<Option<Stroke>, ConvertError> {
    let stroke = registry.stroke_list(diagnostics, outline)?.into_iter().next();
    Ok(stroke.map(|mut stroke| {
        if stroke.opacity.is_none() {
            stroke.opacity = opacity;
        }
        stroke
    }))
}

/// A fill made of one repeated mark.
fn graphic_fill(well_known_name: &str, stroke: Stroke, size: Option<f64>, rotation: Option<f64>) -> Fill {
    let mark = Mark { well_known_name: well_known_name.to_string(), fill: None, stroke: Some(stroke) };
    let graphic = Graphic { size, rotation, ..Graphic::mark(mark) };
    Fill { graphic_fill: Some(Box::new(graphic)), ..Default::default() }
}

/// `SimpleFillSymbol`: solid, empty or hatched fill with an optional outline.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleFillSymbol;

impl SimpleFillSymbol {
    fn hatch_name(style: i64) -> Option<&'static str> {
        match style {
            2 => Some(HORLINE),
            3 => Some(VERTLINE),
            4 => Some(SLASH),
            5 => Some(BACKSLASH),
            6 => Some(PLUS),
            7 => Some(TIMES),
            _ => None,
        }
    }
}

impl SymbolConverter for SimpleFillSymbol {
    fn name(&self) -> &'static str {
        keys::SIMPLE_FILL_SYMBOL
    }

    fn convert(
        &self,
        registry: &SymbolRegistry,
        diagnostics: &mut Diagnostics,
        rule: &mut Rule,
        value: &Value,
        layer_name: &str,
        transparency: i64,
    ) -> Result<(), ConvertError> {
        let symbolizers =
            self.fill_symbolizers(registry, diagnostics, layer_name, value, transparency)?;
        rule.symbolizers.extend(symbolizers);
        Ok(())
    }

    fn as_fill(&self) -> Option<&dyn FillProvider> {
        Some(self)
    }
}

impl FillProvider for SimpleFillSymbol {
    fn fill_symbolizers(
        &self,
        registry: &SymbolRegistry,
        diagnostics: &mut Diagnostics,
        _layer_name: &str,
        value: &Value,
        transparency: i64,
    ) -> Result<Vec<Symbolizer>, ConvertError> {
        let obj = expect_object(value, self.name())?;
        let colour = get_colour(obj.get(keys::COLOUR))?;
        let style = get_int(obj, keys::STYLE)?;
        let opacity = get_transparency(transparency);
        let stroke = outline_stroke(registry, diagnostics, obj.get(keys::OUTLINE), opacity)?;

        let fill = match style {
            1 => None,
            _ => match Self::hatch_name(style) {
                Some(name) => {
                    let mut fill = graphic_fill(name, Stroke::new(colour, 1.0), None, None);
                    fill.opacity = opacity;
                    Some(fill)
                }
                None => Some(Fill::solid(colour, opacity)),
            },
        };

        Ok(vec![Symbolizer::Polygon(PolygonSymbolizer { fill, stroke })])
    }
}

/// `LineFillSymbol`: parallel hatch lines at an arbitrary angle.
///
/// SLD only has the four canonical hatch shapes, so other angles are
/// approximated with a rotated vertical hatch.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFillSymbol;

impl SymbolConverter for LineFillSymbol {
    fn name(&self) -> &'static str {
        keys::LINE_FILL_SYMBOL
    }

    fn convert(
        &self,
        registry: &SymbolRegistry,
        diagnostics: &mut Diagnostics,
        rule: &mut Rule,
        value: &Value,
        layer_name: &str,
        transparency: i64,
    ) -> Result<(), ConvertError> {
        let symbolizers =
            self.fill_symbolizers(registry, diagnostics, layer_name, value, transparency)?;
        rule.symbolizers.extend(symbolizers);
        Ok(())
    }

    fn as_fill(&self) -> Option<&dyn FillProvider> {
        Some(self)
    }
}

impl FillProvider for LineFillSymbol {
    fn fill_symbolizers(
        &self,
        registry: &SymbolRegistry,
        diagnostics: &mut Diagnostics,
        _layer_name: &str,
        value: &Value,
        transparency: i64,
    ) -> Result<Vec<Symbolizer>, ConvertError> {
        let obj = expect_object(value, self.name())?;
        let (well_known_name, rotation) = hatch_for_angle(get_double(obj, keys::ANGLE)?);
        let separation = get_double(obj, keys::SEPARATION)?;

        let hatch_stroke = match outline_stroke(registry, diagnostics, obj.get(keys::OUTLINE), None)? {
            Some(stroke) => stroke,
            None => {
                let colour: Option<Colour> = get_colour(obj.get(keys::COLOUR))?
                    .or(registry.options().default_stroke_colour);
                Stroke::new(colour, 1.0)
            }
        };

        let size = (separation > 0.0).then_some(separation);
        let mut fill = graphic_fill(well_known_name, hatch_stroke, size, rotation);
        fill.opacity = get_transparency(transparency);

        Ok(vec![Symbolizer::Polygon(PolygonSymbolizer { fill: Some(fill), stroke: None })])
    }
}

/// `MultiLayerFillSymbol`: an ordered array of fill symbols, bottom first.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiLayerFillSymbol;

impl SymbolConverter for MultiLayerFillSymbol {
    fn name(&self) -> &'static str {
        keys::MULTI_LAYER_FILL_SYMBOL
    }

    fn convert(
        &self,
        registry: &SymbolRegistry,
        diagnostics: &mut Diagnostics,
        rule: &mut Rule,
        value: &Value,
        layer_name: &str,
        transparency: i64,
    ) -> Result<(), ConvertError> {
        let symbolizers =
            self.fill_symbolizers(registry, diagnostics, layer_name, value, transparency)?;
        rule.symbolizers.extend(symbolizers);
        Ok(())
    }

    fn as_fill(&self) -> Option<&dyn FillProvider> {
        Some(self)
    }
}

impl FillProvider for MultiLayerFillSymbol {
    fn fill_symbolizers(
        &self,
        registry: &SymbolRegistry,
        diagnostics: &mut Diagnostics,
        layer_name: &str,
        value: &Value,
        transparency: i64,
    ) -> Result<Vec<Symbolizer>, ConvertError> {
        let mut symbolizers = Vec::new();
        for layer in expect_array(value, self.name())? {
            symbolizers.extend(registry.fill_symbolizers(
                diagnostics,
                layer_name,
                Some(layer),
                transparency,
            )?);
        }
        Ok(symbolizers)
    }
}
