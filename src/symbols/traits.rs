//! Capability traits implemented by the per-kind converters.
//!
//! Every converter implements [`SymbolConverter`]. The role traits are
//! optional; a converter advertises them through the `as_*` accessors, and
//! [`SymbolRegistry::register`](super::SymbolRegistry::register) files it into
//! the matching lookup tables.

use serde_json::Value;

use super::error::ConvertError;
use super::registry::SymbolRegistry;
use crate::diagnostics::Diagnostics;
use crate::sld::{Graphic, Rule, Stroke, Symbolizer, TextSymbolizer};

/// A converter for one ESRI symbol kind.
pub trait SymbolConverter: Send + Sync {
    /// The kind key this converter handles, e.g. `SimpleFillSymbol`.
    fn name(&self) -> &'static str;

    /// Convert the kind's attribute value and append the result to `rule`.
    fn convert(
        &self,
        registry: &SymbolRegistry,
        diagnostics: &mut Diagnostics,
        rule: &mut Rule,
        value: &Value,
        layer_name: &str,
        transparency: i64,
    ) -> Result<(), ConvertError>;

    fn as_line(&self) -> Option<&dyn LineProvider> {
        None
    }

    fn as_fill(&self) -> Option<&dyn FillProvider> {
        None
    }

    fn as_marker(&self) -> Option<&dyn MarkerProvider> {
        None
    }

    fn as_text(&self) -> Option<&dyn TextProvider> {
        None
    }
}

/// Produces strokes, for line symbols and fill outlines.
pub trait LineProvider {
    fn strokes(
        &self,
        registry: &SymbolRegistry,
        diagnostics: &mut Diagnostics,
        value: &Value,
    ) -> Result<Vec<Stroke>, ConvertError>;
}

/// Produces polygon symbolizers for a fill.
pub trait FillProvider {
    fn fill_symbolizers(
        &self,
        registry: &SymbolRegistry,
        diagnostics: &mut Diagnostics,
        layer_name: &str,
        value: &Value,
        transparency: i64,
    ) -> Result<Vec<Symbolizer>, ConvertError>;
}

/// Produces point graphics.
pub trait MarkerProvider {
    fn graphics(
        &self,
        registry: &SymbolRegistry,
        diagnostics: &mut Diagnostics,
        value: &Value,
    ) -> Result<Vec<Graphic>, ConvertError>;
}

/// Produces a text symbolizer for labels.
pub trait TextProvider {
    fn text_symbolizer(
        &self,
        registry: &SymbolRegistry,
        value: &Value,
        transparency: i64,
    ) -> Result<TextSymbolizer, ConvertError>;
}
