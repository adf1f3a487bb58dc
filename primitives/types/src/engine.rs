//! Engine binary location and ownership.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::TempPath;

/// Who is responsible for the lifetime of an engine binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ownership {
    /// Supplied by the caller through a build property. Never deleted.
    CallerOwned,
    /// Extracted by this pass into a temporary file. Deleted when the pass ends.
    RunOwned,
}

impl Ownership {
    /// Get the string representation of the ownership class.
    pub fn as_str(&self) -> &'static str {
        match self {
            Ownership::CallerOwned => "caller-owned",
            Ownership::RunOwned => "run-owned",
        }
    }
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str()) }
}

/// A runnable copy of the generator engine.
///
/// The run-owned variant holds a [`TempPath`], so the file is removed when the
/// value is released or dropped. The caller-owned variant holds a plain path
/// and has no way to remove it.
#[derive(Debug)]
pub enum EngineBinary {
    /// Binary supplied by the caller
    CallerOwned(PathBuf),
    /// Binary extracted for this pass
    RunOwned(TempPath),
}

impl EngineBinary {
    /// Wrap a caller-supplied binary path.
    pub fn caller_owned(path: impl Into<PathBuf>) -> Self { EngineBinary::CallerOwned(path.into()) }

    /// Wrap a temporary file extracted for this pass.
    pub fn run_owned(path: TempPath) -> Self { EngineBinary::RunOwned(path) }

    /// Location of the binary on disk.
    pub fn path(&self) -> &Path {
        match self {
            EngineBinary::CallerOwned(path) => path,
            EngineBinary::RunOwned(path) => path,
        }
    }

    /// Ownership class of the binary.
    pub fn ownership(&self) -> Ownership {
        match self {
            EngineBinary::CallerOwned(_) => Ownership::CallerOwned,
            EngineBinary::RunOwned(_) => Ownership::RunOwned,
        }
    }

    /// Release the binary at the end of a pass.
    ///
    /// Run-owned files are deleted and any removal error is returned.
    /// Caller-owned paths are left exactly as they were.
    pub fn release(self) -> std::io::Result<()> {
        match self {
            EngineBinary::CallerOwned(_) => Ok(()),
            EngineBinary::RunOwned(path) => path.close(),
        }
    }
}
