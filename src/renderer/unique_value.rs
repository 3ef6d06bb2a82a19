//! `UniqueValueRenderer`: one rule per attribute value.

use serde_json::Value;

use super::{single_layer_sld, LayerSettings, RendererConverter};
use crate::diagnostics::Diagnostics;
use crate::sld::{FeatureTypeStyle, Filter, Rule, StyledLayerDescriptor};
use crate::symbols::attributes::{
    exists, expect_object, get_array, get_bool, get_string, JsonObject,
};
use crate::symbols::{ConvertError, SymbolRegistry};

const UNIQUE_VALUE_RENDERER: &str = "UniqueValueRenderer";
const LABEL: &str = "label";
const FIELDS: &str = "fields";
const FIELD_NAME: &str = "name";
const FIELD_DELIMITER: &str = "fieldDelimiter";
const USE_DEFAULT_SYMBOL: &str = "useDefaultSymbol";
const DEFAULT_SYMBOL: &str = "defaultSymbol";
const DEFAULT_LABEL: &str = "defaultLabel";
const VALUES: &str = "values";
const VALUE: &str = "value";
const VALUE_LABEL: &str = "label";
const VALUE_HEADING: &str = "heading";
const VALUE_SYMBOL: &str = "symbol";

/// Read a class value as text; numbers and booleans are accepted as exported.
fn value_text(value: Option<&Value>) -> Result<Option<String>, ConvertError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(ConvertError::unexpected(VALUE, "string", other)),
    }
}

/// Attribute filter matching one class value.
///
/// Multi-field renderers join the field values with the delimiter; each part is
/// matched against its field and the comparisons combined with `And`.
pub fn value_filter(fields: &[String], delimiter: Option<&str>, value: &str) -> Option<Filter> {
    let parts: Vec<&str> = match delimiter {
        Some(delimiter) if !delimiter.is_empty() => value.split(delimiter).collect(),
        _ => vec![value],
    };
    if parts.len() > fields.len() {
        tracing::debug!("value '{}' has more parts than the {} renderer fields", value, fields.len());
    }

    let mut filters: Vec<Filter> = fields
        .iter()
        .zip(parts)
        .map(|(field, part)| Filter::PropertyIsEqualTo {
            property: field.clone(),
            literal: part.to_string(),
        })
        .collect();

    match filters.len() {
        0 => None,
        1 => filters.pop(),
        _ => Some(Filter::And { filters }),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UniqueValueRenderer;

impl UniqueValueRenderer {
    fn field_names(renderer: &JsonObject) -> Result<Option<Vec<String>>, ConvertError> {
        let Some(fields) = get_array(renderer, FIELDS)? else {
            return Ok(None);
        };
        let mut names = Vec::with_capacity(fields.len());
        for field in fields {
            names.push(get_string(expect_object(field, FIELDS)?, FIELD_NAME)?);
        }
        Ok(Some(names))
    }
}

impl RendererConverter for UniqueValueRenderer {
    fn name(&self) -> &'static str {
        UNIQUE_VALUE_RENDERER
    }

    fn convert(
        &self,
        symbols: &SymbolRegistry,
        diagnostics: &mut Diagnostics,
        renderer: &JsonObject,
        layer: &LayerSettings<'_>,
    ) -> Result<StyledLayerDescriptor, ConvertError> {
        let use_default_symbol = get_bool(renderer, USE_DEFAULT_SYMBOL)?;
        let fields = Self::field_names(renderer)?;
        let delimiter = get_string(renderer, FIELD_DELIMITER)?;
        let delimiter = exists(renderer, FIELD_DELIMITER).then_some(delimiter.as_str());

        let mut fts = FeatureTypeStyle::default();

        for entry in get_array(renderer, VALUES)?.unwrap_or_default() {
            let entry = expect_object(entry, VALUES)?;
            let value = value_text(entry.get(VALUE))?;
            let label = get_string(entry, VALUE_LABEL)?;
            let heading = get_string(entry, VALUE_HEADING)?;

            let mut rule = Rule::new();
            if !label.is_empty() {
                rule.name = Some(label.clone());
            }
            if !label.is_empty() || !heading.is_empty() {
                rule.title = Some(label);
                rule.abstract_text = Some(heading);
            }

            if let Some(fields) = &fields {
                match &value {
                    Some(value) => rule.filter = value_filter(fields, delimiter, value),
                    None => rule.else_filter = true,
                }
            }
            if use_default_symbol && value.is_none() {
                rule.else_filter = true;
            }

            rule.set_scale_range(layer.min_scale, layer.max_scale);
            symbols.convert_symbols(
                diagnostics,
                &mut rule,
                layer.name,
                layer.transparency,
                entry.get(VALUE_SYMBOL),
            )?;
            fts.rules.push(rule);
        }

        if use_default_symbol && exists(renderer, DEFAULT_SYMBOL) {
            let mut rule = Rule::new();
            let default_label = get_string(renderer, DEFAULT_LABEL)?;
            if !default_label.is_empty() {
                rule.name = Some(default_label.clone());
                rule.title = Some(default_label);
            }
            rule.else_filter = true;
            rule.set_scale_range(layer.min_scale, layer.max_scale);
            symbols.convert_symbols(
                diagnostics,
                &mut rule,
                layer.name,
                layer.transparency,
                renderer.get(DEFAULT_SYMBOL),
            )?;
            fts.rules.push(rule);
        }

        let layer_name = if exists(renderer, LABEL) {
            get_string(renderer, LABEL)?
        } else {
            layer.name.to_string()
        };
        Ok(single_layer_sld(Some(layer_name), layer.name, fts))
    }
}
