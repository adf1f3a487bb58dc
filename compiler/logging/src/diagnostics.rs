//! Structured diagnostics reported by a generation pass.
//!
//! A pass appends to one [`Diagnostics`] log. The log is returned to the host
//! with the pass result and is never shared between passes.

use std::fmt;

use serde::Serialize;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Progress and echoed tool output
    Info,
    /// Any failure in any stage
    Error,
}

impl Severity {
    /// Get the string representation of the severity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str()) }
}

/// Immutable description of a class of diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiagnosticDescriptor {
    /// Stable identifier shown in build output
    pub id: &'static str,
    /// Short human-readable title
    pub title: &'static str,
    /// Grouping category
    pub category: &'static str,
    /// Severity every diagnostic of this class carries
    pub severity: Severity,
}

/// Descriptor for progress messages and echoed generator output.
pub const INFORMATIONAL_DESCRIPTOR: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "SGINFO01",
    title: "Informational Message",
    category: "SourceGenerator",
    severity: Severity::Info,
};

/// Descriptor for every failure of a generation pass.
pub const ERROR_DESCRIPTOR: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "SGERRO01",
    title: "Source Generator Error",
    category: "SourceGenerator",
    severity: Severity::Error,
};

/// One reported event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Descriptor this diagnostic was created from
    pub descriptor: DiagnosticDescriptor,
    /// Message text
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic for `descriptor`.
    pub fn new(descriptor: DiagnosticDescriptor, message: impl Into<String>) -> Self {
        Self { descriptor, message: message.into() }
    }

    /// Severity inherited from the descriptor.
    pub fn severity(&self) -> Severity { self.descriptor.severity }

    /// Whether this is an error diagnostic.
    pub fn is_error(&self) -> bool { self.severity() == Severity::Error }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity(), self.descriptor.id, self.message)
    }
}

/// Append-only diagnostic log for one generation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty log.
    pub fn new() -> Self { Self::default() }

    /// Append an informational diagnostic.
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Diagnostic::new(INFORMATIONAL_DESCRIPTOR, message));
    }

    /// Append an error diagnostic.
    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Diagnostic::new(ERROR_DESCRIPTOR, message));
    }

    /// Append an already-built diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) { self.entries.push(diagnostic); }

    /// Iterate over diagnostics in the order they were reported.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> { self.entries.iter() }

    /// Number of diagnostics reported.
    pub fn len(&self) -> usize { self.entries.len() }

    /// Whether nothing has been reported.
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Number of error diagnostics reported.
    pub fn error_count(&self) -> usize { self.entries.iter().filter(|d| d.is_error()).count() }

    /// Whether any error diagnostic was reported.
    pub fn has_errors(&self) -> bool { self.entries.iter().any(Diagnostic::is_error) }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter { self.iter() }
}
