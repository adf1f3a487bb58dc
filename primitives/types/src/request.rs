//! Resolved inputs of a single generation pass.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Absolute paths handed to the generator for one pass.
///
/// Built once by the pipeline after configuration resolution and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    config_path: PathBuf,
    spec_path: PathBuf,
    output_directory: PathBuf,
}

impl GenerationRequest {
    /// Create a new request from already-resolved absolute paths.
    pub fn new(config_path: PathBuf, spec_path: PathBuf, output_directory: PathBuf) -> Self {
        debug_assert!(config_path.is_absolute(), "config path must be absolute");
        debug_assert!(spec_path.is_absolute(), "spec path must be absolute");
        debug_assert!(output_directory.is_absolute(), "output directory must be absolute");
        Self { config_path, spec_path, output_directory }
    }

    /// Generator configuration file.
    pub fn config_path(&self) -> &Path { &self.config_path }

    /// API specification file.
    pub fn spec_path(&self) -> &Path { &self.spec_path }

    /// Directory the generator writes into. Owned by this pass.
    pub fn output_directory(&self) -> &Path { &self.output_directory }
}
