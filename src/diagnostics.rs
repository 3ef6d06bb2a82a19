//! Non-fatal conversion messages
//!
//! Conversion never stops for a symbol it cannot translate. Those cases are
//! recorded here instead and surfaced by the caller (the CLI prints them, and
//! treats them as errors in `--strict` mode).

use std::fmt;

use serde::Serialize;

/// Category of a conversion diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum DiagnosticKind {
    /// No registered converter matched the symbol's kind key
    UnsupportedSymbol,
    /// No registered text converter matched the symbol's kind key
    UnsupportedTextSymbol,
    /// More than one registered kind key was present on one symbol object
    AmbiguousSymbol,
    /// No registered renderer matched the layer's renderer key
    UnsupportedRenderer,
    /// A picture fill image could not be decoded, encoded or written
    PictureFill,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiagnosticKind::UnsupportedSymbol => "unsupported symbol",
            DiagnosticKind::UnsupportedTextSymbol => "unsupported text symbol",
            DiagnosticKind::AmbiguousSymbol => "ambiguous symbol",
            DiagnosticKind::UnsupportedRenderer => "unsupported renderer",
            DiagnosticKind::PictureFill => "picture fill",
        };
        f.write_str(label)
    }
}

/// A single diagnostic message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Ordered collection of diagnostics for one conversion.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and emit it as a `tracing` warning.
    pub fn report(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(kind = %kind, "{}", message);
        self.entries.push(Diagnostic { kind, message });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Number of diagnostics of one kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_keeps_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(DiagnosticKind::UnsupportedSymbol, "first");
        diagnostics.report(DiagnosticKind::PictureFill, "second");

        let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert_eq!(diagnostics.count(DiagnosticKind::PictureFill), 1);
    }

    #[test]
    fn test_display_includes_kind() {
        let diagnostic =
            Diagnostic { kind: DiagnosticKind::UnsupportedSymbol, message: "Foo".to_string() };
        assert_eq!(diagnostic.to_string(), "unsupported symbol: Foo");
    }
}
