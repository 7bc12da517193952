/// Run verdict classification
///
/// Maps how a process ended onto either "hand the output back" or a failure
/// message, with the blame depending on who wrote the code that ran.
use crate::config::types::{Attribution, ProcessResult, Termination};
use nix::sys::signal::Signal;
use std::time::Duration;

pub const MSG_SEGFAULT: &str = "Program segfaulted";
pub const MSG_ABORTED: &str = "Program was aborted (assert failed or memory was corrupted)";
pub const MSG_HARNESS_SEGFAULT: &str = "Test harness segfaulted - check with teaching staff";
pub const MSG_HARNESS_FAILED: &str = "Test harness call failed - check with teaching staff";
pub const MSG_HARNESS_TIMEOUT: &str = "Test harness timed out - check with teaching staff";

/// Outcome of interpreting a finished process
#[derive(Clone, Debug, PartialEq)]
pub enum RunVerdict {
    /// The caller gets the captured output
    Output,
    /// The test fails with this message
    Failure(String),
}

impl RunVerdict {
    pub fn is_failure(&self) -> bool {
        matches!(self, RunVerdict::Failure(_))
    }
}

/// Verdict classifier - pure function over a process result
pub struct VerdictClassifier;

impl VerdictClassifier {
    pub fn classify(result: &ProcessResult, attribution: Attribution) -> RunVerdict {
        Self::classify_termination(result.termination, result.timeout, attribution)
    }

    pub fn classify_termination(
        termination: Termination,
        timeout: Duration,
        attribution: Attribution,
    ) -> RunVerdict {
        match attribution {
            Attribution::Student => Self::classify_student(termination, timeout),
            Attribution::Harness => Self::classify_harness(termination),
        }
    }

    /// Student code: only crashes and timeouts fail. Whatever `main` returns
    /// is treated as program behavior, not as an error.
    fn classify_student(termination: Termination, timeout: Duration) -> RunVerdict {
        match termination {
            Termination::Exited(_) => RunVerdict::Output,
            Termination::Signaled(_) => match termination.signal() {
                Some(Signal::SIGSEGV) => RunVerdict::Failure(MSG_SEGFAULT.to_string()),
                Some(Signal::SIGABRT) => RunVerdict::Failure(MSG_ABORTED.to_string()),
                _ => RunVerdict::Output,
            },
            Termination::TimedOut => RunVerdict::Failure(format!(
                "Program timed out after {} seconds",
                format_seconds(timeout)
            )),
        }
    }

    /// Harness code: anything but a clean exit is a bug for the staff
    fn classify_harness(termination: Termination) -> RunVerdict {
        match termination {
            Termination::Exited(0) => RunVerdict::Output,
            Termination::Signaled(_) if termination.signal() == Some(Signal::SIGSEGV) => {
                RunVerdict::Failure(MSG_HARNESS_SEGFAULT.to_string())
            }
            Termination::Exited(_) | Termination::Signaled(_) => {
                RunVerdict::Failure(MSG_HARNESS_FAILED.to_string())
            }
            Termination::TimedOut => RunVerdict::Failure(MSG_HARNESS_TIMEOUT.to_string()),
        }
    }
}

/// Render a budget the way people write it: `5`, `0.5`, `2.25`
pub fn format_seconds(duration: Duration) -> String {
    format!("{}", duration.as_secs_f64())
}
