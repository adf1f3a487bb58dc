// SPDX-License-Identifier: CC0-1.0

//! servergen umbrella crate.
//!
//! Re-exports the build-script entry point so a consumer only needs one
//! build dependency:
//!
//! ```no_run
//! // build.rs
//! fn main() -> std::io::Result<()> {
//!     servergen::run_build_script()?;
//!     Ok(())
//! }
//! ```
//!
//! Everything else lives in the workspace member crates under `compiler`,
//! `primitives` and `cli`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![doc(test(attr(warn(unused))))]

pub use pipeline::{run_build_script, GenerationPipeline, GenerationReport, GENERATED_SUBDIR};

/// Miscellaneous metadata about the servergen workspace.
pub mod servergen_meta {
    /// Version string for the umbrella crate, as reported by Cargo.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}
