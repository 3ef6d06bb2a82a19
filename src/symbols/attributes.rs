//! Defaulting JSON accessors and the colour/angle/opacity helpers shared by
//! every converter.
//!
//! Missing fields (or explicit `null`) read as the type's zero value. Present
//! fields of the wrong JSON type are a [`ConvertError`].

use serde_json::{Map, Value};

use super::error::{json_type_name, ConvertError};
use super::keys;
use crate::color::Colour;

/// A JSON object as produced by `serde_json`.
pub type JsonObject = Map<String, Value>;

/// Tolerance used when comparing angles against canonical directions.
pub const ANGLE_TOLERANCE: f64 = 0.001;

fn present<'v>(obj: &'v JsonObject, key: &str) -> Option<&'v Value> {
    obj.get(key).filter(|value| !value.is_null())
}

/// Report whether `key` is present (and not `null`).
pub fn exists(obj: &JsonObject, key: &str) -> bool {
    present(obj, key).is_some()
}

pub fn get_double(obj: &JsonObject, key: &str) -> Result<f64, ConvertError> {
    match present(obj, key) {
        None => Ok(0.0),
        Some(value) => value.as_f64().ok_or_else(|| ConvertError::unexpected(key, "number", value)),
    }
}

/// Read an integer field. Fractional numbers are truncated toward zero.
pub fn get_int(obj: &JsonObject, key: &str) -> Result<i64, ConvertError> {
    match present(obj, key) {
        None => Ok(0),
        Some(value) => value
            .as_i64()
            .or_else(|| value.as_f64().map(|v| v.trunc() as i64))
            .ok_or_else(|| ConvertError::unexpected(key, "integer", value)),
    }
}

pub fn get_string(obj: &JsonObject, key: &str) -> Result<String, ConvertError> {
    match present(obj, key) {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(value) => Err(ConvertError::unexpected(key, "string", value)),
    }
}

pub fn get_bool(obj: &JsonObject, key: &str) -> Result<bool, ConvertError> {
    match present(obj, key) {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(value) => Err(ConvertError::unexpected(key, "boolean", value)),
    }
}

/// Read a nested object; `None` when absent.
pub fn get_object<'v>(
    obj: &'v JsonObject,
    key: &str,
) -> Result<Option<&'v JsonObject>, ConvertError> {
    match present(obj, key) {
        None => Ok(None),
        Some(value) => expect_object(value, key).map(Some),
    }
}

/// Read a nested array; `None` when absent.
pub fn get_array<'v>(obj: &'v JsonObject, key: &str) -> Result<Option<&'v [Value]>, ConvertError> {
    match present(obj, key) {
        None => Ok(None),
        Some(value) => expect_array(value, key).map(Some),
    }
}

/// View a value as an object, failing with the name it was found under.
pub fn expect_object<'v>(value: &'v Value, key: &str) -> Result<&'v JsonObject, ConvertError> {
    value.as_object().ok_or_else(|| ConvertError::unexpected(key, "object", value))
}

pub fn expect_array<'v>(value: &'v Value, key: &str) -> Result<&'v [Value], ConvertError> {
    value.as_array().map(Vec::as_slice).ok_or_else(|| ConvertError::unexpected(key, "array", value))
}

/// Bring an angle into `[0, 360]`.
///
/// The upper bound is inclusive: a positive whole number of turns is
/// returned as `360.0`, while `0.0` and negative whole turns give `0.0`.
/// Non-finite angles become `0.0`.
///
/// ```
/// use esri2sld::symbols::attributes::normalise_angle;
///
/// assert_eq!(normalise_angle(370.0), 10.0);
/// assert_eq!(normalise_angle(-10.0), 350.0);
/// assert_eq!(normalise_angle(360.0), 360.0);
/// ```
pub fn normalise_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let value = angle.rem_euclid(360.0);
    if value == 0.0 {
        if angle > 0.0 {
            360.0
        } else {
            0.0
        }
    } else {
        value
    }
}

/// Convert an ESRI transparency percentage into an SLD opacity.
///
/// `0` means "no explicit opacity" (opaque by default).
pub fn get_transparency(transparency: i64) -> Option<f64> {
    if transparency == 0 {
        None
    } else {
        Some(1.0 - transparency as f64 / 100.0)
    }
}

/// Read an ESRI `{red, green, blue}` colour object.
///
/// An absent (or `null`) element means "no colour".
pub fn get_colour(element: Option<&Value>) -> Result<Option<Colour>, ConvertError> {
    let Some(value) = element.filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    let obj = expect_object(value, keys::COLOUR)?;
    Ok(Some(Colour::from_channels(
        get_int(obj, keys::RED)?,
        get_int(obj, keys::GREEN)?,
        get_int(obj, keys::BLUE)?,
    )))
}

/// Best-effort kind name of a symbol object, for diagnostics.
pub fn extract_name(value: &Value) -> String {
    match value {
        Value::Object(obj) => match obj.keys().next() {
            Some(key) => key.clone(),
            None => "<empty object>".to_string(),
        },
        other => format!("<{}>", json_type_name(other)),
    }
}

/// Whether two angles are equal within [`ANGLE_TOLERANCE`].
pub fn angle_matches(angle: f64, target: f64) -> bool {
    (angle - target).abs() <= ANGLE_TOLERANCE
}
