//! Line symbol converters: simple, cartographic and multi-layer lines.

use serde_json::Value;

use super::attributes::{
    exists, expect_array, expect_object, get_array, get_colour, get_double, get_int,
    get_transparency, JsonObject,
};
use super::error::ConvertError;
use super::keys;
use super::registry::SymbolRegistry;
use super::traits::{LineProvider, SymbolConverter};
use crate::diagnostics::Diagnostics;
use crate::sld::{LineCap, LineJoin, LineSymbolizer, Rule, Stroke, Symbolizer};

/// ESRI simple line styles.
const STYLE_SOLID: i64 = 0;
const STYLE_DASH: i64 = 1;
const STYLE_DOT: i64 = 2;
const STYLE_DASH_DOT: i64 = 3;
const STYLE_DASH_DOT_DOT: i64 = 4;
const STYLE_NULL: i64 = 5;

/// Dash pattern for a simple line style, in multiples of the line width.
fn dash_pattern(style: i64) -> &'static [f64] {
    match style {
        STYLE_DASH => &[4.0, 2.0],
        STYLE_DOT => &[1.0, 2.0],
        STYLE_DASH_DOT => &[4.0, 2.0, 1.0, 2.0],
        STYLE_DASH_DOT_DOT => &[4.0, 2.0, 1.0, 2.0, 1.0, 2.0],
        // solid and inside-frame
        _ => &[],
    }
}

/// Append one line symbolizer per stroke, applying the layer opacity.
fn push_line_symbolizers(rule: &mut Rule, strokes: Vec<Stroke>, transparency: i64) {
    let opacity = get_transparency(transparency);
    for mut stroke in strokes {
        if stroke.opacity.is_none() {
            stroke.opacity = opacity;
        }
        rule.symbolizers.push(Symbolizer::Line(LineSymbolizer { stroke }));
    }
}

/// `SimpleLineSymbol`: colour, width and one of the ESRI dash styles.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleLineSymbol;

impl SimpleLineSymbol {
    fn stroke(obj: &JsonObject) -> Result<Option<Stroke>, ConvertError> {
        let style = get_int(obj, keys::STYLE)?;
        if style == STYLE_NULL {
            return Ok(None);
        }
        let width = get_double(obj, keys::WIDTH)?;
        let mut stroke = Stroke::new(get_colour(obj.get(keys::COLOUR))?, width);
        if style != STYLE_SOLID {
            let unit = width.max(1.0);
            stroke.dash_array = dash_pattern(style).iter().map(|d| d * unit).collect();
        }
        Ok(Some(stroke))
    }
}

impl SymbolConverter for SimpleLineSymbol {
    fn name(&self) -> &'static str {
        keys::SIMPLE_LINE_SYMBOL
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
        let strokes = self.strokes(registry, diagnostics, value)?;
        push_line_symbolizers(rule, strokes, transparency);
        Ok(())
    }

    fn as_line(&self) -> Option<&dyn LineProvider> {
        Some(self)
    }
}

impl LineProvider for SimpleLineSymbol {
    fn strokes(
        &self,
        _registry: &SymbolRegistry,
        _diagnostics: &mut Diagnostics,
        value: &Value,
    ) -> Result<Vec<Stroke>, ConvertError> {
        let obj = expect_object(value, self.name())?;
        Ok(Self::stroke(obj)?.into_iter().collect())
    }
}

/// `CartographicLineSymbol`: a line with a dash template, caps and joins.
#[derive(Debug, Clone, Copy, Default)]
pub struct CartographicLineSymbol;

impl CartographicLineSymbol {
    /// Flatten `[{mark, gap}, ...]` into `[mark0, gap0, mark1, gap1, ...]`.
    fn dash_array(template: &[Value]) -> Result<Vec<f64>, ConvertError> {
        let mut dashes = Vec::with_capacity(template.len() * 2);
        for entry in template {
            let entry = expect_object(entry, keys::TEMPLATE)?;
            dashes.push(get_double(entry, keys::TEMPLATE_MARK)?);
            dashes.push(get_double(entry, keys::TEMPLATE_GAP)?);
        }
        Ok(dashes)
    }

    fn line_cap(obj: &JsonObject) -> Result<Option<LineCap>, ConvertError> {
        if !exists(obj, keys::CAP) {
            return Ok(None);
        }
        Ok(match get_int(obj, keys::CAP)? {
            1 => Some(LineCap::Round),
            2 => Some(LineCap::Square),
            _ => Some(LineCap::Butt),
        })
    }

    fn line_join(obj: &JsonObject) -> Result<Option<LineJoin>, ConvertError> {
        if !exists(obj, keys::JOIN) {
            return Ok(None);
        }
        Ok(match get_int(obj, keys::JOIN)? {
            1 => Some(LineJoin::Round),
            2 => Some(LineJoin::Bevel),
            _ => Some(LineJoin::Mitre),
        })
    }
}

impl SymbolConverter for CartographicLineSymbol {
    fn name(&self) -> &'static str {
        keys::CARTOGRAPHIC_LINE_SYMBOL
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
        let strokes = self.strokes(registry, diagnostics, value)?;
        push_line_symbolizers(rule, strokes, transparency);
        Ok(())
    }

    fn as_line(&self) -> Option<&dyn LineProvider> {
        Some(self)
    }
}

impl LineProvider for CartographicLineSymbol {
    fn strokes(
        &self,
        _registry: &SymbolRegistry,
        _diagnostics: &mut Diagnostics,
        value: &Value,
    ) -> Result<Vec<Stroke>, ConvertError> {
        let obj = expect_object(value, self.name())?;
        let mut stroke =
            Stroke::new(get_colour(obj.get(keys::COLOUR))?, get_double(obj, keys::WIDTH)?);

        if let Some(template) = get_array(obj, keys::TEMPLATE)? {
            stroke.dash_array = Self::dash_array(template)?;
        }
        if exists(obj, keys::LINE_START_OFFSET) {
            stroke.dash_offset = Some(get_double(obj, keys::LINE_START_OFFSET)?);
        }
        stroke.line_cap = Self::line_cap(obj)?;
        stroke.line_join = Self::line_join(obj)?;

        Ok(vec![stroke])
    }
}

/// `MultiLayerLineSymbol`: an ordered array of line symbols, bottom first.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiLayerLineSymbol;

impl SymbolConverter for MultiLayerLineSymbol {
    fn name(&self) -> &'static str {
        keys::MULTI_LAYER_LINE_SYMBOL
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
        let strokes = self.strokes(registry, diagnostics, value)?;
        push_line_symbolizers(rule, strokes, transparency);
        Ok(())
    }

    fn as_line(&self) -> Option<&dyn LineProvider> {
        Some(self)
    }
}

impl LineProvider for MultiLayerLineSymbol {
    fn strokes(
        &self,
        registry: &SymbolRegistry,
        diagnostics: &mut Diagnostics,
        value: &Value,
    ) -> Result<Vec<Stroke>, ConvertError> {
        let mut strokes = Vec::new();
        for layer in expect_array(value, self.name())? {
            strokes.extend(registry.stroke_list(diagnostics, Some(layer))?);
        }
        Ok(strokes)
    }
}
