/// Core types shared by the gradebox checks
use nix::sys::signal::Signal;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// How a child process ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// Process exited on its own with this status code
    Exited(i32),
    /// Process was terminated by this signal number
    Signaled(i32),
    /// Process outlived its time budget and was killed by the runner
    TimedOut,
}

impl Termination {
    /// True only for a clean `Exited(0)`
    pub fn success(&self) -> bool {
        matches!(self, Termination::Exited(0))
    }

    /// Terminating signal, when it maps onto a known one
    pub fn signal(&self) -> Option<Signal> {
        match self {
            Termination::Signaled(sig) => Signal::try_from(*sig).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Exited(code) => write!(f, "exit code {}", code),
            Termination::Signaled(sig) => match Signal::try_from(*sig) {
                Ok(signal) => write!(f, "signal {}", signal.as_str()),
                Err(_) => write!(f, "signal {}", sig),
            },
            Termination::TimedOut => write!(f, "timeout"),
        }
    }
}

/// Result of one external process invocation
#[derive(Clone, Debug)]
pub struct ProcessResult {
    /// How the process ended
    pub termination: Termination,
    /// Combined stdout/stderr, in the order the child wrote it
    pub output: Vec<u8>,
    /// Wall clock time between spawn and reap
    pub wall_time: Duration,
    /// Time budget the process ran under
    pub timeout: Duration,
}

impl ProcessResult {
    pub fn success(&self) -> bool {
        self.termination.success()
    }
}

/// Who gets blamed when a process misbehaves
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attribution {
    /// Student-authored program under test
    Student,
    /// Test harness infrastructure
    Harness,
}

impl fmt::Display for Attribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribution::Student => write!(f, "student"),
            Attribution::Harness => write!(f, "harness"),
        }
    }
}

/// Custom error types for gradebox
///
/// These are faults of the calling environment. Problems with the submission
/// itself are recorded on the test context instead.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Empty command provided")]
    EmptyCommand,

    #[error("Process output is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    #[error("Coverage report error: {0}")]
    CoverageReport(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for gradebox operations
pub type Result<T> = std::result::Result<T, HarnessError>;
