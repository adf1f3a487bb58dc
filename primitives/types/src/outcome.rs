//! Captured result of one generator subprocess run.

use serde::Serialize;

/// Streams captured from the generator and whether it finished within the bound.
///
/// `exited_in_time == false` is a failure on its own, whatever the streams hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessOutcome {
    /// Everything the generator wrote to standard output
    pub stdout: String,
    /// Everything the generator wrote to standard error
    pub stderr: String,
    /// Whether the process exited before the wait bound elapsed
    pub exited_in_time: bool,
}

impl ProcessOutcome {
    /// Outcome of a process that exited within the bound.
    pub fn completed(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self { stdout: stdout.into(), stderr: stderr.into(), exited_in_time: true }
    }

    /// Outcome of a process that was still running when the bound elapsed.
    pub fn timed_out() -> Self { Self { exited_in_time: false, ..Self::default() } }
}
