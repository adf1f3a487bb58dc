#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Generation pipeline that bridges a build host to the external
//! openapi-generator engine.
//!
//! One call to [`GenerationPipeline::run`] is one generation pass: resolve the
//! build properties, stage the engine, run it as a bounded subprocess, harvest
//! the sources it wrote, and clean up everything the pass created.
//!
//! ## Module Organization
//!
//! - `orchestration` - Pipeline entry point and the pass report
//! - `staging` - Engine binary staging (caller-supplied or extracted)
//! - `process_runner` - Bounded generator subprocess and outcome classification
//! - `harvest` - Collection of generated sources from the output directory
//! - `cleanup` - Removal of per-pass temporary resources
//! - `host` - Source/diagnostic sinks and the Cargo build-script host

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Convenient result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur during a generation pass.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required build property is missing or unusable.
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    /// The engine binary or the output directory could not be prepared.
    #[error("Failed to stage generator resources: {0}")]
    ResourceStaging(String),
    /// The generator process could not be started.
    #[error("Failed to start generator process `{program}`: {source}")]
    ProcessLaunch {
        /// Program that failed to start
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// Waiting on the generator process or reading its streams failed.
    #[error("Failed while waiting for generator process: {0}")]
    ProcessWait(#[source] std::io::Error),
    /// The generator process did not exit within the bound.
    #[error("Generator process did not exit within {timeout:?} and was terminated")]
    ProcessTimeout {
        /// Bound that elapsed
        timeout: Duration,
    },
    /// The generator wrote to its error stream.
    #[error("Generator reported errors:\n{0}")]
    GenerationTool(String),
    /// A generated file could not be read.
    #[error("Failed to read generated file {}: {source}", path.display())]
    Harvest {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The output directory could not be enumerated.
    #[error("Failed to enumerate generator output: {0}")]
    HarvestWalk(#[from] walkdir::Error),
    /// Two generated files map to the same compilation name.
    #[error(
        "Generated files {} and {} would both be added as {hint_name}",
        first.display(),
        second.display()
    )]
    DuplicateHintName {
        /// Colliding compilation name
        hint_name: String,
        /// File harvested first
        first: PathBuf,
        /// File harvested second
        second: PathBuf,
    },
}

impl PipelineError {
    /// Stage-level classification of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            PipelineError::Config(_) => FailureKind::ConfigResolution,
            PipelineError::ResourceStaging(_) => FailureKind::ResourceStaging,
            PipelineError::ProcessLaunch { .. } | PipelineError::ProcessWait(_) => {
                FailureKind::ProcessLaunch
            }
            PipelineError::ProcessTimeout { .. } => FailureKind::ProcessTimeout,
            PipelineError::GenerationTool(_) => FailureKind::GenerationTool,
            PipelineError::Harvest { .. }
            | PipelineError::HarvestWalk(_)
            | PipelineError::DuplicateHintName { .. } => FailureKind::Harvest,
        }
    }
}

/// Stage-level classification of a failed pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A required build property was missing
    ConfigResolution,
    /// Engine extraction or output directory creation failed
    ResourceStaging,
    /// The generator could not be started or waited on
    ProcessLaunch,
    /// The generator exceeded the wait bound
    ProcessTimeout,
    /// The generator wrote to its error stream
    GenerationTool,
    /// Generated output could not be collected
    Harvest,
}

/// Tagged failure of a generation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// Stage that failed
    pub kind: FailureKind,
    /// Full detail text
    pub message: String,
}

impl From<&PipelineError> for Failure {
    fn from(err: &PipelineError) -> Self { Failure { kind: err.kind(), message: err.to_string() } }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.message) }
}

// Module declarations
pub mod cleanup;
pub mod harvest;
pub mod host;
pub mod orchestration;
pub mod process_runner;
pub mod staging;

// Re-export public API
pub use cleanup::CleanupCoordinator;
pub use harvest::{OutputHarvester, DEFAULT_SOURCE_EXTENSION};
pub use host::{
    prepare_output_dir, run_build_script, run_build_script_with, CargoDiagnostics, DiagnosticSink,
    DirectorySink, SourceSink, TraceDiagnostics, GENERATED_SUBDIR,
};
pub use orchestration::{GenerationPipeline, GenerationReport};
pub use process_runner::{
    classify_outcome, generator_arguments, EngineLauncher, GeneratorInvoker, ProcessRunner,
    GENERATOR_TIMEOUT, TARGET_FRAMEWORK,
};
pub use staging::{EmbeddedPayload, ResourceStager, ENGINE_RESOURCE_NAME};
