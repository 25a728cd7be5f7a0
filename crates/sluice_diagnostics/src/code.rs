//! Diagnostic codes with category prefixes for structured identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a diagnostic code, determining its prefix letter.
///
/// Each category maps to a single-character prefix used in diagnostic code
/// display (e.g., `R201` for a routing diagnostic, `N101` for a net one).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Device graph diagnostics, prefixed with `G`.
    Graph,
    /// Netlist diagnostics, prefixed with `N`.
    Net,
    /// Routing-engine diagnostics, prefixed with `R`.
    Routing,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Graph => 'G',
            Category::Net => 'N',
            Category::Routing => 'R',
        }
    }
}

/// A structured diagnostic code combining a category prefix and a numeric identifier.
///
/// Displayed as the category prefix followed by a zero-padded 3-digit number,
/// e.g., `G001`, `N101`, `R201`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_prefixes() {
        assert_eq!(Category::Graph.prefix(), 'G');
        assert_eq!(Category::Net.prefix(), 'N');
        assert_eq!(Category::Routing.prefix(), 'R');
    }

    #[test]
    fn display_format() {
        let code = DiagnosticCode::new(Category::Routing, 201);
        assert_eq!(format!("{code}"), "R201");

        let code = DiagnosticCode::new(Category::Net, 3);
        assert_eq!(format!("{code}"), "N003");

        let code = DiagnosticCode::new(Category::Graph, 42);
        assert_eq!(format!("{code}"), "G042");
    }

    #[test]
    fn serde_roundtrip() {
        let code = DiagnosticCode::new(Category::Net, 101);
        let json = serde_json::to_string(&code).unwrap();
        let back: DiagnosticCode = serde_json::from_str(&json).unwrap();
        assert_eq!(code, back);
    }
}
