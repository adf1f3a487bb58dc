#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Logging and diagnostics for the generation pipeline.
//!
//! `trace` echoes progress to stderr. Diagnostics are the structured,
//! severity-tagged messages a generation pass hands back to its host.

pub mod diagnostics;

pub use diagnostics::{
    Diagnostic, DiagnosticDescriptor, Diagnostics, Severity, ERROR_DESCRIPTOR,
    INFORMATIONAL_DESCRIPTOR,
};

/// Prints a trace message to stderr with module prefix.
pub fn trace(module: &str, msg: &str) {
    eprintln!("[TRACE][{}] {}", module, msg);
}
