//! Console transport seam.
//!
//! The readiness monitor drives boot detection through this trait; the
//! transport itself (telnet/pty/socket plumbing) belongs to the VM-process
//! collaborator. The monitor owns its console exclusively for the duration
//! of boot and drops it exactly once, at the ready transition.

use crate::errors::AppliteResult;
use std::time::Duration;

/// Result of one bounded [`Console::expect`] call.
#[derive(Debug, Clone, Default)]
pub struct ExpectOutcome {
    /// Index of the first pattern that matched, if any.
    pub matched: Option<usize>,

    /// Raw bytes observed during the read, matched or not.
    pub output: Vec<u8>,
}

impl ExpectOutcome {
    /// A read that saw nothing at all.
    pub fn silence() -> Self {
        Self::default()
    }

    /// Whether any output was observed, regardless of matching.
    pub fn saw_output(&self) -> bool {
        !self.output.is_empty()
    }
}

/// Bounded read/write access to an instance's serial console.
pub trait Console {
    /// Read until one of `patterns` matches or `timeout` elapses.
    ///
    /// Must never block longer than `timeout`; returning with no match and
    /// no output is the normal silent-boot case, not an error.
    fn expect(&mut self, patterns: &[&[u8]], timeout: Duration) -> AppliteResult<ExpectOutcome>;

    /// Send a line of input to the console.
    fn write_line(&mut self, text: &str) -> AppliteResult<()>;
}
