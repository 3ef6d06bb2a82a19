//! Kinds command implementation

use std::collections::BTreeMap;
use std::process::ExitCode;

use crate::registry::Registry;
use crate::renderer::RendererRegistry;
use crate::symbols::{Role, SymbolRegistry};

use super::{EXIT_ERROR, EXIT_SUCCESS};

/// Supported kind keys per role, plus the renderer keys.
fn supported_kinds(
    symbols: &SymbolRegistry,
    renderers: &RendererRegistry,
) -> BTreeMap<String, Vec<&'static str>> {
    let mut kinds: BTreeMap<String, Vec<&'static str>> =
        Role::ALL.iter().map(|role| (role.to_string(), symbols.kinds(*role))).collect();
    kinds.insert("renderer".to_string(), renderers.names().collect());
    kinds
}

/// Execute the kinds command
pub fn run_kinds(json: bool) -> ExitCode {
    let symbols = SymbolRegistry::global();
    let renderers = RendererRegistry::global();

    if json {
        return match serde_json::to_string_pretty(&supported_kinds(symbols, renderers)) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(EXIT_ERROR)
            }
        };
    }

    for role in Role::ALL {
        println!("{}:", role);
        for kind in symbols.kinds(role) {
            println!("  {}", kind);
        }
    }
    println!("renderer:");
    for name in renderers.names() {
        println!("  {}", name);
    }

    ExitCode::from(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_kinds() {
        let kinds = supported_kinds(SymbolRegistry::global(), RendererRegistry::global());
        assert_eq!(kinds["renderer"], vec!["SimpleRenderer", "UniqueValueRenderer"]);
        assert_eq!(kinds["text symbol"], vec!["TextSymbol"]);
        assert!(kinds["fill symbol"].contains(&"PictureFillSymbol"));
        assert!(kinds["symbol"].contains(&"TextSymbol"));
    }
}
