//! Removal of per-pass temporary resources.
//!
//! The coordinator owns the output directory and the engine binary for the
//! length of a pass. [`CleanupCoordinator::finish`] removes them and reports
//! problems; if a pass unwinds instead, dropping the coordinator drops the
//! `TempDir` and `TempPath` it holds, which removes them as well.

use std::path::PathBuf;

use logging::Diagnostics;
use tempfile::TempDir;
use types::{EngineBinary, Ownership};

/// Tracks what a pass must remove when it ends
#[derive(Debug, Default)]
pub struct CleanupCoordinator {
    output: Option<TempDir>,
    engine: Option<EngineBinary>,
}

impl CleanupCoordinator {
    /// Create a coordinator that owns nothing yet.
    pub fn new() -> Self { Self::default() }

    /// Take ownership of the pass's output directory and return its path.
    pub fn track_output(&mut self, dir: TempDir) -> PathBuf {
        let path = dir.path().to_path_buf();
        self.output = Some(dir);
        path
    }

    /// Take ownership of the pass's engine binary.
    pub fn track_engine(&mut self, engine: EngineBinary) -> &EngineBinary {
        self.engine.insert(engine)
    }

    /// Engine currently tracked.
    pub fn engine(&self) -> Option<&EngineBinary> { self.engine.as_ref() }

    /// Remove the output directory and release the engine.
    ///
    /// A run-owned engine is deleted; a caller-owned one is only forgotten.
    /// Removal failures are reported as informational diagnostics so they do
    /// not add a second error to a failed pass.
    pub fn finish(mut self, diagnostics: &mut Diagnostics) {
        if let Some(dir) = self.output.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                diagnostics.info(format!(
                    "Failed to remove output directory {}: {}",
                    path.display(),
                    e
                ));
            }
        }

        if let Some(engine) = self.engine.take() {
            let path = engine.path().to_path_buf();
            let ownership = engine.ownership();
            if let Err(e) = engine.release() {
                debug_assert_eq!(ownership, Ownership::RunOwned);
                diagnostics.info(format!(
                    "Failed to remove temporary engine {}: {}",
                    path.display(),
                    e
                ));
            }
        }
    }
}
