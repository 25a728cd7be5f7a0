//! Per-run diagnostic accumulator.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use std::cell::{Cell, RefCell};

/// Collects the diagnostics of one routing run.
///
/// A run owns one sink and fills it from a single thread, so plain
/// `Cell`/`RefCell` interior mutability is all the sharing it needs; the one
/// cross-thread signal a run accepts (cancellation) travels through the
/// router's cancel token, not through diagnostics. Severity counts are kept
/// alongside the messages and always agree with them: draining the sink
/// resets the counts too.
pub struct DiagnosticSink {
    diagnostics: RefCell<Vec<Diagnostic>>,
    error_count: Cell<usize>,
    warning_count: Cell<usize>,
}

impl DiagnosticSink {
    /// Creates a new empty diagnostic sink.
    pub fn new() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
            error_count: Cell::new(0),
            warning_count: Cell::new(0),
        }
    }

    /// Records a diagnostic, counting it under its severity.
    pub fn emit(&self, diag: Diagnostic) {
        match diag.severity {
            Severity::Error => self.error_count.set(self.error_count.get() + 1),
            Severity::Warning => self.warning_count.set(self.warning_count.get() + 1),
            Severity::Note => {}
        }
        self.diagnostics.borrow_mut().push(diag);
    }

    /// Returns `true` if any error-severity diagnostics are held.
    pub fn has_errors(&self) -> bool {
        self.error_count.get() > 0
    }

    /// Returns the number of error-severity diagnostics held.
    pub fn error_count(&self) -> usize {
        self.error_count.get()
    }

    /// Returns the number of warning-severity diagnostics held.
    pub fn warning_count(&self) -> usize {
        self.warning_count.get()
    }

    /// Takes all accumulated diagnostics, leaving the sink empty with its
    /// severity counts back at zero.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        self.error_count.set(0);
        self.warning_count.set(0);
        self.diagnostics.take()
    }

    /// Returns the diagnostics that concern the named net, without draining.
    pub fn for_net(&self, net: &str) -> Vec<Diagnostic> {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.net.as_deref() == Some(net))
            .cloned()
            .collect()
    }

    /// Returns a snapshot of all accumulated diagnostics without draining.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}
