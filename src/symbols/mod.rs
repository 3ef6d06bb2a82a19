//! ESRI symbol to SLD conversion engine
//!
//! Each ESRI symbol kind has one converter. Converters are filed into a
//! [`SymbolRegistry`] by the roles they support (line, fill, marker, text) and
//! dispatched by which kind key is present on a symbol object:
//!
//! ```
//! use esri2sld::diagnostics::Diagnostics;
//! use esri2sld::sld::Rule;
//! use esri2sld::symbols::{ConvertOptions, SymbolRegistry};
//! use serde_json::json;
//!
//! let registry = SymbolRegistry::with_defaults(ConvertOptions::default());
//! let mut diagnostics = Diagnostics::new();
//! let mut rule = Rule::new();
//! let symbol = json!({"SimpleLineSymbol": {"width": 2, "style": 1}});
//!
//! registry.convert_symbols(&mut diagnostics, &mut rule, "roads", 0, Some(&symbol)).unwrap();
//! assert_eq!(rule.symbolizers.len(), 1);
//! assert!(diagnostics.is_empty());
//! ```

pub mod attributes;
mod error;
pub mod fill;
pub mod keys;
pub mod line;
pub mod marker;
pub mod picture;
mod registry;
pub mod text;
mod traits;

pub use error::ConvertError;
pub use registry::{ConvertOptions, Role, SymbolRegistry};
pub use traits::{FillProvider, LineProvider, MarkerProvider, SymbolConverter, TextProvider};
