//! esri2sld - Library for converting ESRI symbol definitions to OGC SLD
//!
//! This library provides functionality to:
//! - Translate ESRI symbol JSON (MXD/LYR exports) into SLD symbolizers
//! - Convert simple and unique-value renderers into SLD rules
//! - Write picture-fill images and serialise the result as SLD 1.0 XML

pub mod cli;
pub mod color;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod output;
pub mod registry;
pub mod renderer;
pub mod sld;
pub mod symbols;
