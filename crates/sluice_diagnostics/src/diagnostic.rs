//! Structured diagnostic messages with severity, codes, and net context.

use crate::code::DiagnosticCode;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// A structured diagnostic message.
///
/// Diagnostics are the mechanism for reporting conditions the router
/// tolerates: skipped nets, congestion summaries, non-convergence. Each
/// diagnostic carries a severity, a unique code, a message, and optionally
/// the canonical name of the net it concerns.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The unique code identifying the type of diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// The canonical name of the net this diagnostic concerns, if any.
    pub net: Option<String>,
}

impl Diagnostic {
    /// Creates a new error diagnostic with the given code and message.
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            net: None,
        }
    }

    /// Creates a new warning diagnostic with the given code and message.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            net: None,
        }
    }

    /// Creates a new note diagnostic with the given code and message.
    pub fn note(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Note,
            code,
            message: message.into(),
            net: None,
        }
    }

    /// Attaches the name of the net this diagnostic concerns.
    pub fn with_net(mut self, net: impl Into<String>) -> Self {
        self.net = Some(net.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;

    #[test]
    fn error_constructor() {
        let d = Diagnostic::error(DiagnosticCode::new(Category::Graph, 1), "bad template");
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.message, "bad template");
        assert!(d.net.is_none());
    }

    #[test]
    fn warning_with_net() {
        let d = Diagnostic::warning(DiagnosticCode::new(Category::Net, 101), "no driver")
            .with_net("clk_buf");
        assert_eq!(d.severity, Severity::Warning);
        assert_eq!(d.net.as_deref(), Some("clk_buf"));
    }

    #[test]
    fn note_constructor() {
        let d = Diagnostic::note(DiagnosticCode::new(Category::Routing, 10), "iteration 1");
        assert_eq!(d.severity, Severity::Note);
    }

    #[test]
    fn serde_roundtrip() {
        let d = Diagnostic::warning(DiagnosticCode::new(Category::Routing, 201), "overflow")
            .with_net("data_bus_3");
        let json = serde_json::to_string(&d).unwrap();
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back.severity, Severity::Warning);
        assert_eq!(back.net.as_deref(), Some("data_bus_3"));
        assert_eq!(back.message, "overflow");
    }
}
