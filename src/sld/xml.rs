//! SLD 1.0.0 XML serialisation

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

use super::{
    Displacement, Fill, Filter, Font, Graphic, GraphicalSymbol, Halo, LineSymbolizer, Mark,
    NamedLayer, PointPlacement, PointSymbolizer, PolygonSymbolizer, Rule, Stroke,
    StyledLayerDescriptor, Symbolizer, TextSymbolizer,
};

const SLD_NS: &str = "http://www.opengis.net/sld";
const OGC_NS: &str = "http://www.opengis.net/ogc";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str =
    "http://www.opengis.net/sld http://schemas.opengis.net/sld/1.0.0/StyledLayerDescriptor.xsd";

/// Error type for SLD serialisation
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("XML write error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("XML output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Format a number without a trailing `.0` for whole values.
fn fmt_num(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn open(w: &mut XmlWriter, tag: &str) -> Result<(), WriteError> {
    w.write_event(Event::Start(BytesStart::new(tag)))?;
    Ok(())
}

fn close(w: &mut XmlWriter, tag: &str) -> Result<(), WriteError> {
    w.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Element holding only text.
fn leaf(w: &mut XmlWriter, tag: &str, text: &str) -> Result<(), WriteError> {
    w.create_element(tag).write_text_content(BytesText::new(text))?;
    Ok(())
}

fn css(w: &mut XmlWriter, name: &str, value: &str) -> Result<(), WriteError> {
    w.create_element("sld:CssParameter")
        .with_attribute(("name", name))
        .write_text_content(BytesText::new(value))?;
    Ok(())
}

/// Serialise a descriptor to SLD 1.0.0 XML.
pub fn write_sld(sld: &StyledLayerDescriptor) -> Result<String, WriteError> {
    let mut w = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("sld:StyledLayerDescriptor");
    root.push_attribute(("xmlns:sld", SLD_NS));
    root.push_attribute(("xmlns:ogc", OGC_NS));
    root.push_attribute(("xmlns:xlink", XLINK_NS));
    root.push_attribute(("xmlns:xsi", XSI_NS));
    root.push_attribute(("xsi:schemaLocation", SCHEMA_LOCATION));
    root.push_attribute(("version", "1.0.0"));
    w.write_event(Event::Start(root))?;

    for layer in &sld.layers {
        write_named_layer(&mut w, layer)?;
    }
    close(&mut w, "sld:StyledLayerDescriptor")?;

    Ok(String::from_utf8(w.into_inner().into_inner())?)
}

fn write_named_layer(w: &mut XmlWriter, layer: &NamedLayer) -> Result<(), WriteError> {
    open(w, "sld:NamedLayer")?;
    if let Some(name) = &layer.name {
        leaf(w, "sld:Name", name)?;
    }
    for style in &layer.styles {
        open(w, "sld:UserStyle")?;
        if let Some(name) = &style.name {
            leaf(w, "sld:Name", name)?;
        }
        for fts in &style.feature_type_styles {
            open(w, "sld:FeatureTypeStyle")?;
            for rule in &fts.rules {
                write_rule(w, rule)?;
            }
            close(w, "sld:FeatureTypeStyle")?;
        }
        close(w, "sld:UserStyle")?;
    }
    close(w, "sld:NamedLayer")
}

fn write_rule(w: &mut XmlWriter, rule: &Rule) -> Result<(), WriteError> {
    open(w, "sld:Rule")?;
    if let Some(name) = &rule.name {
        leaf(w, "sld:Name", name)?;
    }
    if let Some(title) = &rule.title {
        leaf(w, "sld:Title", title)?;
    }
    if let Some(text) = &rule.abstract_text {
        leaf(w, "sld:Abstract", text)?;
    }
    if let Some(filter) = &rule.filter {
        open(w, "ogc:Filter")?;
        write_filter(w, filter)?;
        close(w, "ogc:Filter")?;
    }
    if rule.else_filter {
        w.write_event(Event::Empty(BytesStart::new("sld:ElseFilter")))?;
    }
    if let Some(min) = rule.min_scale_denominator {
        leaf(w, "sld:MinScaleDenominator", &fmt_num(min))?;
    }
    if let Some(max) = rule.max_scale_denominator {
        leaf(w, "sld:MaxScaleDenominator", &fmt_num(max))?;
    }
    for symbolizer in &rule.symbolizers {
        match symbolizer {
            Symbolizer::Polygon(s) => write_polygon(w, s)?,
            Symbolizer::Line(s) => write_line(w, s)?,
            Symbolizer::Point(s) => write_point(w, s)?,
            Symbolizer::Text(s) => write_text(w, s)?,
        }
    }
    close(w, "sld:Rule")
}

fn write_filter(w: &mut XmlWriter, filter: &Filter) -> Result<(), WriteError> {
    match filter {
        Filter::PropertyIsEqualTo { property, literal } => {
            open(w, "ogc:PropertyIsEqualTo")?;
            leaf(w, "ogc:PropertyName", property)?;
            leaf(w, "ogc:Literal", literal)?;
            close(w, "ogc:PropertyIsEqualTo")
        }
        Filter::And { filters } => {
            open(w, "ogc:And")?;
            for f in filters {
                write_filter(w, f)?;
            }
            close(w, "ogc:And")
        }
    }
}

fn write_polygon(w: &mut XmlWriter, s: &PolygonSymbolizer) -> Result<(), WriteError> {
    open(w, "sld:PolygonSymbolizer")?;
    if let Some(fill) = &s.fill {
        write_fill(w, fill)?;
    }
    if let Some(stroke) = &s.stroke {
        write_stroke(w, stroke)?;
    }
    close(w, "sld:PolygonSymbolizer")
}

fn write_line(w: &mut XmlWriter, s: &LineSymbolizer) -> Result<(), WriteError> {
    open(w, "sld:LineSymbolizer")?;
    write_stroke(w, &s.stroke)?;
    close(w, "sld:LineSymbolizer")
}

fn write_point(w: &mut XmlWriter, s: &PointSymbolizer) -> Result<(), WriteError> {
    open(w, "sld:PointSymbolizer")?;
    write_graphic(w, &s.graphic)?;
    close(w, "sld:PointSymbolizer")
}

fn write_text(w: &mut XmlWriter, s: &TextSymbolizer) -> Result<(), WriteError> {
    open(w, "sld:TextSymbolizer")?;
    if let Some(label) = &s.label {
        open(w, "sld:Label")?;
        leaf(w, "ogc:PropertyName", label)?;
        close(w, "sld:Label")?;
    }
    if let Some(font) = &s.font {
        write_font(w, font)?;
    }
    if let Some(placement) = &s.placement {
        write_placement(w, placement)?;
    }
    if let Some(halo) = &s.halo {
        write_halo(w, halo)?;
    }
    if let Some(fill) = &s.fill {
        write_fill(w, fill)?;
    }
    close(w, "sld:TextSymbolizer")
}

fn write_font(w: &mut XmlWriter, font: &Font) -> Result<(), WriteError> {
    open(w, "sld:Font")?;
    css(w, "font-family", &font.family)?;
    css(w, "font-size", &fmt_num(font.size))?;
    css(w, "font-style", font.style.as_str())?;
    css(w, "font-weight", font.weight.as_str())?;
    close(w, "sld:Font")
}

fn write_placement(w: &mut XmlWriter, placement: &PointPlacement) -> Result<(), WriteError> {
    open(w, "sld:LabelPlacement")?;
    open(w, "sld:PointPlacement")?;
    open(w, "sld:AnchorPoint")?;
    leaf(w, "sld:AnchorPointX", &fmt_num(placement.anchor.x))?;
    leaf(w, "sld:AnchorPointY", &fmt_num(placement.anchor.y))?;
    close(w, "sld:AnchorPoint")?;
    write_displacement(w, &placement.displacement)?;
    leaf(w, "sld:Rotation", &fmt_num(placement.rotation))?;
    close(w, "sld:PointPlacement")?;
    close(w, "sld:LabelPlacement")
}

fn write_halo(w: &mut XmlWriter, halo: &Halo) -> Result<(), WriteError> {
    open(w, "sld:Halo")?;
    leaf(w, "sld:Radius", &fmt_num(halo.radius))?;
    write_fill(w, &halo.fill)?;
    close(w, "sld:Halo")
}

fn write_displacement(w: &mut XmlWriter, d: &Displacement) -> Result<(), WriteError> {
    open(w, "sld:Displacement")?;
    leaf(w, "sld:DisplacementX", &fmt_num(d.x))?;
    leaf(w, "sld:DisplacementY", &fmt_num(d.y))?;
    close(w, "sld:Displacement")
}

fn write_fill(w: &mut XmlWriter, fill: &Fill) -> Result<(), WriteError> {
    open(w, "sld:Fill")?;
    if let Some(graphic) = &fill.graphic_fill {
        open(w, "sld:GraphicFill")?;
        write_graphic(w, graphic)?;
        close(w, "sld:GraphicFill")?;
    }
    if let Some(color) = fill.color {
        css(w, "fill", &color.to_hex())?;
    }
    if let Some(opacity) = fill.opacity {
        css(w, "fill-opacity", &fmt_num(opacity))?;
    }
    close(w, "sld:Fill")
}

fn write_stroke(w: &mut XmlWriter, stroke: &Stroke) -> Result<(), WriteError> {
    open(w, "sld:Stroke")?;
    if let Some(color) = stroke.color {
        css(w, "stroke", &color.to_hex())?;
    }
    if let Some(width) = stroke.width {
        css(w, "stroke-width", &fmt_num(width))?;
    }
    if let Some(opacity) = stroke.opacity {
        css(w, "stroke-opacity", &fmt_num(opacity))?;
    }
    if let Some(cap) = stroke.line_cap {
        css(w, "stroke-linecap", cap.as_str())?;
    }
    if let Some(join) = stroke.line_join {
        css(w, "stroke-linejoin", join.as_str())?;
    }
    if stroke.is_dashed() {
        let dashes: Vec<String> = stroke.dash_array.iter().map(|d| fmt_num(*d)).collect();
        css(w, "stroke-dasharray", &dashes.join(" "))?;
    }
    if let Some(offset) = stroke.dash_offset {
        css(w, "stroke-dashoffset", &fmt_num(offset))?;
    }
    close(w, "sld:Stroke")
}

fn write_mark(w: &mut XmlWriter, mark: &Mark) -> Result<(), WriteError> {
    open(w, "sld:Mark")?;
    leaf(w, "sld:WellKnownName", &mark.well_known_name)?;
    if let Some(fill) = &mark.fill {
        write_fill(w, fill)?;
    }
    if let Some(stroke) = &mark.stroke {
        write_stroke(w, stroke)?;
    }
    close(w, "sld:Mark")
}

/// Write a `<sld:Graphic>`.
///
/// A marker offset is written as `<sld:Displacement>` after the rotation.
/// SLD 1.0.0 has no such child of `Graphic` (it comes from SE 1.1); GeoServer
/// and GeoTools read it from 1.0.0 documents as a vendor extension, and
/// without it marker offsets would be lost.
fn write_graphic(w: &mut XmlWriter, graphic: &Graphic) -> Result<(), WriteError> {
    open(w, "sld:Graphic")?;
    for symbol in &graphic.symbols {
        match symbol {
            GraphicalSymbol::Mark(mark) => write_mark(w, mark)?,
            GraphicalSymbol::External(external) => {
                open(w, "sld:ExternalGraphic")?;
                let mut resource = BytesStart::new("sld:OnlineResource");
                resource.push_attribute(("xlink:type", "simple"));
                resource.push_attribute(("xlink:href", external.url.as_str()));
                w.write_event(Event::Empty(resource))?;
                leaf(w, "sld:Format", &external.format)?;
                close(w, "sld:ExternalGraphic")?;
            }
        }
    }
    if let Some(opacity) = graphic.opacity {
        leaf(w, "sld:Opacity", &fmt_num(opacity))?;
    }
    if let Some(size) = graphic.size {
        leaf(w, "sld:Size", &fmt_num(size))?;
    }
    if let Some(rotation) = graphic.rotation {
        leaf(w, "sld:Rotation", &fmt_num(rotation))?;
    }
    if let Some(displacement) = &graphic.displacement {
        write_displacement(w, displacement)?;
    }
    close(w, "sld:Graphic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Colour;
    use crate::sld::{FeatureTypeStyle, UserStyle};

    fn single_rule_sld(rule: Rule) -> StyledLayerDescriptor {
        StyledLayerDescriptor {
            layers: vec![NamedLayer {
                name: Some("roads & rails".into()),
                styles: vec![UserStyle {
                    name: None,
                    feature_type_styles: vec![FeatureTypeStyle { rules: vec![rule] }],
                }],
            }],
        }
    }

    #[test]
    fn test_fmt_num_drops_trailing_zero() {
        assert_eq!(fmt_num(2.0), "2");
        assert_eq!(fmt_num(0.5), "0.5");
        assert_eq!(fmt_num(-45.0), "-45");
    }

    #[test]
    fn test_layer_name_is_escaped() {
        let xml = write_sld(&single_rule_sld(Rule::new())).unwrap();
        assert!(xml.contains("<sld:Name>roads &amp; rails</sld:Name>"));
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    }

    #[test]
    fn test_dashed_line_symbolizer() {
        let mut rule = Rule::new();
        rule.symbolizers.push(Symbolizer::Line(LineSymbolizer {
            stroke: Stroke {
                color: Some(Colour::new(0, 0, 255)),
                width: Some(1.5),
                dash_array: vec![2.0, 1.0, 4.0, 2.0],
                dash_offset: Some(3.0),
                ..Default::default()
            },
        }));
        let xml = write_sld(&single_rule_sld(rule)).unwrap();
        assert!(xml.contains("<sld:CssParameter name=\"stroke\">#0000FF</sld:CssParameter>"));
        assert!(xml.contains("<sld:CssParameter name=\"stroke-width\">1.5</sld:CssParameter>"));
        assert!(xml.contains(
            "<sld:CssParameter name=\"stroke-dasharray\">2 1 4 2</sld:CssParameter>"
        ));
        assert!(xml.contains("<sld:CssParameter name=\"stroke-dashoffset\">3</sld:CssParameter>"));
    }

    #[test]
    fn test_filter_and_else() {
        let mut rule = Rule::new();
        rule.filter = Some(Filter::And {
            filters: vec![
                Filter::PropertyIsEqualTo { property: "TYPE".into(), literal: "A".into() },
                Filter::PropertyIsEqualTo { property: "CLASS".into(), literal: "1".into() },
            ],
        });
        let xml = write_sld(&single_rule_sld(rule)).unwrap();
        assert!(xml.contains("<ogc:And>"));
        assert_eq!(xml.matches("<ogc:PropertyIsEqualTo>").count(), 2);
        assert!(!xml.contains("ElseFilter"));

        let mut else_rule = Rule::new();
        else_rule.else_filter = true;
        let xml = write_sld(&single_rule_sld(else_rule)).unwrap();
        assert!(xml.contains("<sld:ElseFilter/>"));
    }

    #[test]
    fn test_text_and_attributes_are_escaped() {
        let mut rule = Rule::new();
        rule.filter = Some(Filter::PropertyIsEqualTo {
            property: "NAME".into(),
            literal: "A<B & C".into(),
        });
        rule.symbolizers.push(Symbolizer::Point(PointSymbolizer {
            graphic: Graphic::external(crate::sld::ExternalGraphic::new("file:///tmp/a&b.png", "image/png")),
        }));
        let xml = write_sld(&single_rule_sld(rule)).unwrap();
        assert!(xml.contains("<ogc:Literal>A&lt;B &amp; C</ogc:Literal>"));
        assert!(xml.contains("xlink:href=\"file:///tmp/a&amp;b.png\""));
    }

    #[test]
    fn test_output_is_well_formed() {
        let mut rule = Rule::new();
        rule.else_filter = true;
        rule.symbolizers.push(Symbolizer::Line(LineSymbolizer {
            stroke: Stroke::new(Some(Colour::new(1, 2, 3)), 1.0),
        }));
        let xml = write_sld(&single_rule_sld(rule)).unwrap();

        let mut reader = quick_xml::Reader::from_str(&xml);
        let mut depth = 0;
        loop {
            match reader.read_event().unwrap() {
                Event::Start(_) => depth += 1,
                Event::End(_) => depth -= 1,
                Event::Eof => break,
                _ => {}
            }
        }
        assert_eq!(depth, 0);
    }

    #[test]
    fn test_marker_offset_follows_rotation() {
        let mark = Mark { well_known_name: "circle".into(), ..Default::default() };
        let graphic = Graphic {
            rotation: Some(45.0),
            displacement: Some(Displacement::new(2.0, -1.5)),
            ..Graphic::mark(mark)
        };
        let mut rule = Rule::new();
        rule.symbolizers.push(Symbolizer::Point(PointSymbolizer { graphic }));
        let xml = write_sld(&single_rule_sld(rule)).unwrap();

        let rotation = xml.find("<sld:Rotation>45</sld:Rotation>").unwrap();
        let displacement = xml.find("<sld:Displacement>").unwrap();
        let end = xml.find("</sld:Graphic>").unwrap();
        assert!(rotation < displacement && displacement < end);
        assert!(xml.contains("<sld:DisplacementY>-1.5</sld:DisplacementY>"));
    }

    #[test]
    fn test_external_graphic_href() {
        let mut rule = Rule::new();
        rule.symbolizers.push(Symbolizer::Point(PointSymbolizer {
            graphic: Graphic::external(crate::sld::ExternalGraphic::new("file:/tmp/parks.png", "image/png")),
        }));
        let xml = write_sld(&single_rule_sld(rule)).unwrap();
        assert!(xml.contains("xlink:href=\"file:/tmp/parks.png\""));
        assert!(xml.contains("<sld:Format>image/png</sld:Format>"));
    }
}
