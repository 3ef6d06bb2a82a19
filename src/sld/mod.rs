//! SLD object model produced by the converters
//!
//! A trimmed-down Styled Layer Descriptor graph: only the primitives the ESRI
//! converters can emit. Every type serialises to JSON (for `--format json`)
//! and to SLD 1.0 XML through [`xml::write_sld`].

pub mod xml;

use std::path::PathBuf;

use serde::Serialize;

use crate::color::Colour;

/// Offset of a graphic or label from its anchor, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Displacement {
    pub x: f64,
    pub y: f64,
}

impl Displacement {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Stroke end cap style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

impl LineCap {
    pub fn as_str(self) -> &'static str {
        match self {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
            LineCap::Square => "square",
        }
    }
}

/// Stroke corner join style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    Mitre,
    Round,
    Bevel,
}

impl LineJoin {
    pub fn as_str(self) -> &'static str {
        match self {
            LineJoin::Mitre => "mitre",
            LineJoin::Round => "round",
            LineJoin::Bevel => "bevel",
        }
    }
}

/// SLD `<Stroke>`. An empty dash array means a solid line.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Stroke {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Colour>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dash_array: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash_offset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_cap: Option<LineCap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_join: Option<LineJoin>,
}

impl Stroke {
    pub fn new(color: Option<Colour>, width: f64) -> Self {
        Self { color, width: Some(width), ..Default::default() }
    }

    pub fn is_dashed(&self) -> bool {
        !self.dash_array.is_empty()
    }
}

/// SLD `<Fill>`: a solid colour, a repeated graphic, or both.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Fill {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Colour>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graphic_fill: Option<Box<Graphic>>,
}

impl Fill {
    pub fn solid(color: Option<Colour>, opacity: Option<f64>) -> Self {
        Self { color, opacity, graphic_fill: None }
    }

    fn collect_pending<'a>(&'a self, pictures: &mut Vec<&'a PendingPicture>) {
        if let Some(graphic) = &self.graphic_fill {
            graphic.collect_pending(pictures);
        }
    }
}

/// A built-in shape selected by well-known name.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Mark {
    pub well_known_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
}

/// An image referenced by URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalGraphic {
    pub url: String,
    pub format: String,
    /// Image bytes that must be saved before `url` resolves
    #[serde(skip)]
    pub pending: Option<PendingPicture>,
}

impl ExternalGraphic {
    pub fn new(url: impl Into<String>, format: impl Into<String>) -> Self {
        Self { url: url.into(), format: format.into(), pending: None }
    }
}

/// An encoded image waiting to be written to `path`.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPicture {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GraphicalSymbol {
    Mark(Mark),
    External(ExternalGraphic),
}

/// SLD `<Graphic>`: one or more symbols with size, rotation and offset.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Graphic {
    pub symbols: Vec<GraphicalSymbol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub displacement: Option<Displacement>,
}

impl Graphic {
    pub fn mark(mark: Mark) -> Self {
        Self { symbols: vec![GraphicalSymbol::Mark(mark)], ..Default::default() }
    }

    pub fn external(external: ExternalGraphic) -> Self {
        Self { symbols: vec![GraphicalSymbol::External(external)], ..Default::default() }
    }

    /// The first mark in the symbol list, if any.
    pub fn first_mark(&self) -> Option<&Mark> {
        self.symbols.iter().find_map(|symbol| match symbol {
            GraphicalSymbol::Mark(mark) => Some(mark),
            GraphicalSymbol::External(_) => None,
        })
    }

    fn collect_pending<'a>(&'a self, pictures: &mut Vec<&'a PendingPicture>) {
        for symbol in &self.symbols {
            match symbol {
                GraphicalSymbol::External(external) => pictures.extend(external.pending.as_ref()),
                GraphicalSymbol::Mark(mark) => {
                    if let Some(fill) = &mark.fill {
                        fill.collect_pending(pictures);
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl FontStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    pub fn as_str(self) -> &'static str {
        match self {
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Font {
    pub family: String,
    pub style: FontStyle,
    pub weight: FontWeight,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Halo {
    pub radius: f64,
    pub fill: Fill,
}

/// Label placement relative to a point.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PointPlacement {
    pub anchor: Displacement,
    pub displacement: Displacement,
    pub rotation: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PolygonSymbolizer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LineSymbolizer {
    pub stroke: Stroke,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PointSymbolizer {
    pub graphic: Graphic,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TextSymbolizer {
    /// Attribute used as the label text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<PointPlacement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halo: Option<Halo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Symbolizer {
    Polygon(PolygonSymbolizer),
    Line(LineSymbolizer),
    Point(PointSymbolizer),
    Text(TextSymbolizer),
}

/// Attribute filter attached to a rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Filter {
    PropertyIsEqualTo { property: String, literal: String },
    And { filters: Vec<Filter> },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Rule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub else_filter: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_scale_denominator: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_scale_denominator: Option<f64>,
    pub symbolizers: Vec<Symbolizer>,
}

impl Rule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set scale denominators, ignoring non-positive values.
    pub fn set_scale_range(&mut self, min_scale: f64, max_scale: f64) {
        if min_scale > 0.0 {
            self.min_scale_denominator = Some(min_scale);
        }
        if max_scale > 0.0 {
            self.max_scale_denominator = Some(max_scale);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FeatureTypeStyle {
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct UserStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub feature_type_styles: Vec<FeatureTypeStyle>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NamedLayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub styles: Vec<UserStyle>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StyledLayerDescriptor {
    pub layers: Vec<NamedLayer>,
}

impl StyledLayerDescriptor {
    /// Total number of rules across every layer and style.
    pub fn rule_count(&self) -> usize {
        self.rules().count()
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.layers
            .iter()
            .flat_map(|layer| &layer.styles)
            .flat_map(|style| &style.feature_type_styles)
            .flat_map(|fts| &fts.rules)
    }

    /// Images referenced by this descriptor that have not been saved yet,
    /// in document order.
    pub fn pending_pictures(&self) -> Vec<&PendingPicture> {
        let mut pictures = Vec::new();
        for rule in self.rules() {
            for symbolizer in &rule.symbolizers {
                match symbolizer {
                    Symbolizer::Polygon(s) => {
                        if let Some(fill) = &s.fill {
                            fill.collect_pending(&mut pictures);
                        }
                    }
                    Symbolizer::Point(s) => s.graphic.collect_pending(&mut pictures),
                    Symbolizer::Text(s) => {
                        if let Some(halo) = &s.halo {
                            halo.fill.collect_pending(&mut pictures);
                        }
                        if let Some(fill) = &s.fill {
                            fill.collect_pending(&mut pictures);
                        }
                    }
                    Symbolizer::Line(_) => {}
                }
            }
        }
        pictures
    }
}
