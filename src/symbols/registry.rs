//! Symbol registry: kind tables and key-presence dispatch.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

use serde_json::Value;

use super::attributes::{expect_object, extract_name, JsonObject};
use super::error::ConvertError;
use super::fill::{LineFillSymbol, MultiLayerFillSymbol, SimpleFillSymbol};
use super::line::{CartographicLineSymbol, MultiLayerLineSymbol, SimpleLineSymbol};
use super::marker::{CharacterMarkerSymbol, MultiLayerMarkerSymbol, SimpleMarkerSymbol};
use super::picture::PictureFillSymbol;
use super::text::TextSymbol;
use super::traits::SymbolConverter;
use crate::color::Colour;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::registry::Registry;
use crate::sld::{Graphic, Rule, Stroke, Symbolizer, TextSymbolizer};

/// Settings that change how symbols are translated.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Added to every text symbol's font size
    pub font_size_factor: f64,
    /// Directory picture-fill images are written to
    pub picture_dir: PathBuf,
    /// Hatch colour used when a line fill has no resolvable outline
    pub default_stroke_colour: Option<Colour>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            font_size_factor: 0.0,
            picture_dir: PathBuf::from("."),
            default_stroke_colour: None,
        }
    }
}

/// Capability role a kind table serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Symbol,
    Line,
    Fill,
    Marker,
    Text,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Symbol, Role::Line, Role::Fill, Role::Marker, Role::Text];

    fn label(self) -> &'static str {
        match self {
            Role::Symbol => "symbol",
            Role::Line => "line symbol",
            Role::Fill => "fill symbol",
            Role::Marker => "marker symbol",
            Role::Text => "text symbol",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of probing a symbol object against one kind table.
enum KindMatch<'r, 'v> {
    Found(&'r dyn SymbolConverter, &'v Value),
    Unrecognised,
    Ambiguous(Vec<&'static str>),
}

/// Lookup tables from ESRI kind name to converter, one per capability role.
///
/// Tables are ordered by kind name so probing is deterministic. The registry
/// is immutable once built; share it by reference.
pub struct SymbolRegistry {
    options: ConvertOptions,
    symbols: BTreeMap<&'static str, Box<dyn SymbolConverter>>,
    lines: BTreeSet<&'static str>,
    fills: BTreeSet<&'static str>,
    markers: BTreeSet<&'static str>,
    texts: BTreeSet<&'static str>,
}

impl fmt::Debug for SymbolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolRegistry")
            .field("options", &self.options)
            .field("symbols", &self.symbols.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SymbolRegistry {
    /// Create an empty registry.
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            symbols: BTreeMap::new(),
            lines: BTreeSet::new(),
            fills: BTreeSet::new(),
            markers: BTreeSet::new(),
            texts: BTreeSet::new(),
        }
    }

    /// Create a registry with every built-in converter.
    pub fn with_defaults(options: ConvertOptions) -> Self {
        let mut registry = Self::new(options);
        tracing::debug!("Symbols supported:");
        registry.register(Box::new(CharacterMarkerSymbol));
        registry.register(Box::new(CartographicLineSymbol));
        registry.register(Box::new(TextSymbol));
        registry.register(Box::new(SimpleMarkerSymbol));
        registry.register(Box::new(SimpleLineSymbol));
        registry.register(Box::new(LineFillSymbol));
        registry.register(Box::new(MultiLayerFillSymbol));
        registry.register(Box::new(MultiLayerLineSymbol));
        registry.register(Box::new(MultiLayerMarkerSymbol));
        registry.register(Box::new(SimpleFillSymbol));
        registry.register(Box::new(PictureFillSymbol));
        registry
    }

    /// Process-wide registry with default options, built on first use.
    pub fn global() -> &'static SymbolRegistry {
        static GLOBAL: OnceLock<SymbolRegistry> = OnceLock::new();
        GLOBAL.get_or_init(|| SymbolRegistry::with_defaults(ConvertOptions::default()))
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Add a converter to the general table and every role table it supports.
    ///
    /// A converter registered under an existing name replaces the old one.
    pub fn register(&mut self, converter: Box<dyn SymbolConverter>) {
        let name = converter.name();
        tracing::debug!("\t{}", name);

        for table in [&mut self.lines, &mut self.fills, &mut self.markers, &mut self.texts] {
            table.remove(name);
        }
        if converter.as_line().is_some() {
            self.lines.insert(name);
        }
        if converter.as_fill().is_some() {
            self.fills.insert(name);
        }
        if converter.as_marker().is_some() {
            self.markers.insert(name);
        }
        if converter.as_text().is_some() {
            self.texts.insert(name);
        }
        self.symbols.insert(name, converter);
    }

    /// Kind names registered for a role, in lookup order.
    pub fn kinds(&self, role: Role) -> Vec<&'static str> {
        match role {
            Role::Symbol => self.symbols.keys().copied().collect(),
            Role::Line => self.lines.iter().copied().collect(),
            Role::Fill => self.fills.iter().copied().collect(),
            Role::Marker => self.markers.iter().copied().collect(),
            Role::Text => self.texts.iter().copied().collect(),
        }
    }

    fn find<'v>(&self, role: Role, obj: &'v JsonObject) -> KindMatch<'_, 'v> {
        let mut hits: Vec<(&'static str, &'v Value)> = self
            .kinds(role)
            .into_iter()
            .filter_map(|name| obj.get(name).filter(|v| !v.is_null()).map(|value| (name, value)))
            .collect();

        match hits.len() {
            0 => KindMatch::Unrecognised,
            1 => {
                let (name, value) = hits.remove(0);
                match self.symbols.get(name) {
                    Some(converter) => KindMatch::Found(converter.as_ref(), value),
                    None => KindMatch::Unrecognised,
                }
            }
            _ => KindMatch::Ambiguous(hits.into_iter().map(|(name, _)| name).collect()),
        }
    }

    /// Match `json` against a role table, reporting misses and ambiguity.
    fn dispatch<'v>(
        &self,
        diagnostics: &mut Diagnostics,
        role: Role,
        json: Option<&'v Value>,
    ) -> Result<Option<(&dyn SymbolConverter, &'v Value)>, ConvertError> {
        let Some(element) = json.filter(|v| !v.is_null()) else {
            return Ok(None);
        };
        let obj = expect_object(element, role.label())?;

        match self.find(role, obj) {
            KindMatch::Found(converter, value) => Ok(Some((converter, value))),
            KindMatch::Unrecognised => {
                let kind = match role {
                    Role::Text => DiagnosticKind::UnsupportedTextSymbol,
                    _ => DiagnosticKind::UnsupportedSymbol,
                };
                diagnostics.report(kind, format!("Unsupported {} : {}", role, extract_name(element)));
                Ok(None)
            }
            KindMatch::Ambiguous(names) => {
                diagnostics.report(
                    DiagnosticKind::AmbiguousSymbol,
                    format!("Ambiguous {} : found {}", role, names.join(", ")),
                );
                Ok(None)
            }
        }
    }

    /// Convert a symbol object and append its symbolizers to `rule`.
    ///
    /// An absent symbol is a no-op. An unrecognised symbol records one
    /// diagnostic and leaves `rule` untouched.
    pub fn convert_symbols(
        &self,
        diagnostics: &mut Diagnostics,
        rule: &mut Rule,
        layer_name: &str,
        transparency: i64,
        json: Option<&Value>,
    ) -> Result<(), ConvertError> {
        match self.dispatch(diagnostics, Role::Symbol, json)? {
            Some((converter, value)) => {
                converter.convert(self, diagnostics, rule, value, layer_name, transparency)
            }
            None => Ok(()),
        }
    }

    /// Resolve a line symbol object into strokes.
    pub fn stroke_list(
        &self,
        diagnostics: &mut Diagnostics,
        json: Option<&Value>,
    ) -> Result<Vec<Stroke>, ConvertError> {
        match self.dispatch(diagnostics, Role::Line, json)? {
            Some((converter, value)) => match converter.as_line() {
                Some(line) => line.strokes(self, diagnostics, value),
                None => Ok(Vec::new()),
            },
            None => Ok(Vec::new()),
        }
    }

    /// Resolve a fill symbol object into polygon symbolizers.
    pub fn fill_symbolizers(
        &self,
        diagnostics: &mut Diagnostics,
        layer_name: &str,
        json: Option<&Value>,
        transparency: i64,
    ) -> Result<Vec<Symbolizer>, ConvertError> {
        match self.dispatch(diagnostics, Role::Fill, json)? {
            Some((converter, value)) => match converter.as_fill() {
                Some(fill) => {
                    fill.fill_symbolizers(self, diagnostics, layer_name, value, transparency)
                }
                None => Ok(Vec::new()),
            },
            None => Ok(Vec::new()),
        }
    }

    /// Resolve a marker symbol object into graphics.
    pub fn marker_list(
        &self,
        diagnostics: &mut Diagnostics,
        json: Option<&Value>,
    ) -> Result<Vec<Graphic>, ConvertError> {
        match self.dispatch(diagnostics, Role::Marker, json)? {
            Some((converter, value)) => match converter.as_marker() {
                Some(marker) => marker.graphics(self, diagnostics, value),
                None => Ok(Vec::new()),
            },
            None => Ok(Vec::new()),
        }
    }

    /// Resolve a text symbol object into a text symbolizer.
    pub fn convert_text_symbols(
        &self,
        diagnostics: &mut Diagnostics,
        transparency: i64,
        json: Option<&Value>,
    ) -> Result<Option<TextSymbolizer>, ConvertError> {
        match self.dispatch(diagnostics, Role::Text, json)? {
            Some((converter, value)) => match converter.as_text() {
                Some(text) => text.text_symbolizer(self, value, transparency).map(Some),
                None => Ok(None),
            },
            None => Ok(None),
        }
    }
}

impl Registry<dyn SymbolConverter> for SymbolRegistry {
    fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    fn get(&self, name: &str) -> Option<&(dyn SymbolConverter + 'static)> {
        self.symbols.get(name).map(|converter| converter.as_ref())
    }

    fn len(&self) -> usize {
        self.symbols.len()
    }

    fn names(&self) -> Box<dyn Iterator<Item = &'static str> + '_> {
        Box::new(self.symbols.keys().copied())
    }
}
