#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Core data model for the servergen generation pipeline.
//!
//! These types describe one generation pass: the resolved request, the engine
//! binary and who owns it, the captured result of running the engine, and the
//! source files harvested from its output directory.

/// Engine binary location and ownership.
///
/// Ownership decides whether a pass may delete the binary once it is done
/// with it. Caller-owned binaries are never touched.
pub mod engine;
/// Source files harvested from the generator output.
pub mod generated;
/// Captured result of one generator subprocess run.
pub mod outcome;
/// Resolved inputs of a single generation pass.
pub mod request;

pub use engine::{EngineBinary, Ownership};
pub use generated::{hint_name_for, GeneratedFile, GENERATED_SUFFIX};
pub use outcome::ProcessOutcome;
pub use request::GenerationRequest;
