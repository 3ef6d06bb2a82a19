//! Colour values shared by the ESRI reader and the SLD writer
//!
//! SLD expresses colours as `#RRGGBB` literals. ESRI documents carry them as
//! `{red, green, blue}` objects; the conversion lives in
//! [`crate::symbols::attributes::get_colour`].
//!
//! Supported input formats for [`parse_hex_colour`]:
//! - `#RGB`, `#RRGGBB`

use std::fmt;
use std::str::FromStr;

use image::Rgba;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for colour parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty colour string")]
    Empty,
    /// Input string doesn't start with '#'
    #[error("colour must start with '#'")]
    MissingHash,
    /// Invalid length (must be 3 or 6 hex chars after #)
    #[error("invalid colour length {0}, expected 3 or 6")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
}

/// An opaque RGB colour literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    pub const BLACK: Colour = Colour { r: 0, g: 0, b: 0 };
    pub const GREY: Colour = Colour { r: 0x80, g: 0x80, b: 0x80 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a colour from ESRI channel values, clamping each to `0..=255`.
    pub fn from_channels(red: i64, green: i64, blue: i64) -> Self {
        let clamp = |v: i64| v.clamp(0, 255) as u8;
        Self { r: clamp(red), g: clamp(green), b: clamp(blue) }
    }

    /// Format as the `#RRGGBB` literal SLD expects.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn from_rgba(pixel: Rgba<u8>) -> Self {
        Self { r: pixel[0], g: pixel[1], b: pixel[2] }
    }

    /// Same colour with the given alpha channel.
    pub fn with_alpha(self, alpha: u8) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, alpha])
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Colour {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex_colour(s)
    }
}

impl Serialize for Colour {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Parse a hex colour string (`#RGB` or `#RRGGBB`).
///
/// # Examples
///
/// ```
/// use esri2sld::color::{parse_hex_colour, Colour};
///
/// assert_eq!(parse_hex_colour("#F00").unwrap(), Colour::new(255, 0, 0));
/// assert_eq!(parse_hex_colour("#00FF80").unwrap(), Colour::new(0, 255, 128));
/// ```
pub fn parse_hex_colour(s: &str) -> Result<Colour, ColorError> {
    if s.is_empty() {
        return Err(ColorError::Empty);
    }
    let Some(hex) = s.strip_prefix('#') else {
        return Err(ColorError::MissingHash);
    };

    let digits = hex.chars().map(parse_hex_digit).collect::<Result<Vec<u8>, _>>()?;

    match digits.as_slice() {
        // #RGB -> #RRGGBB (doubled digits)
        [r, g, b] => Ok(Colour::new(r * 17, g * 17, b * 17)),
        [r1, r2, g1, g2, b1, b2] => Ok(Colour::new(r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2)),
        _ => Err(ColorError::InvalidLength(digits.len())),
    }
}

/// Parse a single hex digit (0-9, A-F, a-f) to u8 (0-15)
fn parse_hex_digit(c: char) -> Result<u8, ColorError> {
    match c {
        '0'..='9' => Ok(c as u8 - b'0'),
        'a'..='f' => Ok(c as u8 - b'a' + 10),
        'A'..='F' => Ok(c as u8 - b'A' + 10),
        _ => Err(ColorError::InvalidHex(c)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_hex_is_uppercase_six_digits() {
        assert_eq!(Colour::new(255, 0, 0).to_hex(), "#FF0000");
        assert_eq!(Colour::new(1, 2, 3).to_hex(), "#010203");
    }

    #[test]
    fn test_from_channels_clamps() {
        assert_eq!(Colour::from_channels(300, -5, 128), Colour::new(255, 0, 128));
    }

    #[test]
    fn test_parse_short_and_long_hex() {
        assert_eq!(parse_hex_colour("#fff").unwrap(), Colour::new(255, 255, 255));
        assert_eq!(parse_hex_colour("#123456").unwrap(), Colour::new(0x12, 0x34, 0x56));
        assert_eq!("#abcdef".parse::<Colour>().unwrap(), Colour::new(0xAB, 0xCD, 0xEF));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_hex_colour(""), Err(ColorError::Empty));
        assert_eq!(parse_hex_colour("FF0000"), Err(ColorError::MissingHash));
        assert_eq!(parse_hex_colour("#FF00"), Err(ColorError::InvalidLength(4)));
        assert_eq!(parse_hex_colour("#GG0000"), Err(ColorError::InvalidHex('G')));
    }

    #[test]
    fn test_display_roundtrip() {
        let colour = Colour::new(10, 20, 30);
        assert_eq!(colour.to_string().parse::<Colour>().unwrap(), colour);
    }
}
