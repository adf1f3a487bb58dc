// SPDX-License-Identifier: CC0-1.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Path utility functions for resolving build inputs.
//!
//! This module provides utilities for finding project roots and turning
//! relative build property values into absolute paths.

pub mod path_utils;

// Re-export for convenience
pub use path_utils::*;
