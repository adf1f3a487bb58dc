#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! servergen Configuration
//!
//! This crate turns build properties into the resolved inputs of one
//! generation pass. It handles:
//! - Reading property values from the process environment, an in-memory map,
//!   or a TOML properties file
//! - Checking that the required properties are present
//! - Resolving relative configuration and specification paths against the
//!   project root

use std::path::PathBuf;

use thiserror::Error;

pub mod properties;
pub mod resolver;

pub use properties::{
    BuildProperties, EnvProperties, PropertiesFile, PropertyMap, ALL_KEYS, CARGO_MANIFEST_DIR_KEY,
    CONFIG_KEY, ENGINE_KEY, JAVA_KEY, PROJECT_DIR_KEY, SPEC_KEY,
};
pub use resolver::{ConfigResolver, ResolvedConfig};

/// Errors that can occur when loading properties or resolving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required build properties are absent or empty
    #[error("Failed to retrieve necessary paths: missing build properties {}", .0.join(", "))]
    MissingProperties(Vec<&'static str>),
    /// The working directory needed to absolutize a relative project root is unavailable
    #[error("Failed to determine current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    /// Failed to read the properties file from disk
    #[error("Failed to read properties file {path}: {source}")]
    FileRead {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// Failed to parse the TOML properties file
    #[error("Failed to parse properties file {path}: {source}")]
    Parse {
        /// File that could not be parsed
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },
}

/// Result alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
