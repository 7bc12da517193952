//! Process runners for student code and for harness code.
//!
//! Both spawn the command with its timeout, capture combined output and pass
//! the result through [`VerdictClassifier`]. They differ only in who gets
//! blamed when the process misbehaves.

use crate::config::types::{Attribution, Result};
use crate::exec::command::CommandSpec;
use crate::exec::runner;
use crate::judge::context::TestContext;
use crate::utils::output;
use crate::verdict::verdict::{RunVerdict, VerdictClassifier};

/// Run student-authored code.
///
/// Returns `Ok(Some(output))` unless the program segfaulted, aborted or timed
/// out, in which case the failure is recorded and `Ok(None)` comes back.
/// Non-zero exit codes are not failures.
pub fn safe_run<C: TestContext + ?Sized>(
    ctx: &mut C,
    command: impl Into<CommandSpec>,
) -> Result<Option<String>> {
    run_attributed(ctx, &command.into(), Attribution::Student)
}

/// Run harness-owned commands. Any non-zero exit, signal or timeout is
/// recorded as a staff-facing failure.
pub fn harness_run<C: TestContext + ?Sized>(
    ctx: &mut C,
    command: impl Into<CommandSpec>,
) -> Result<Option<String>> {
    run_attributed(ctx, &command.into(), Attribution::Harness)
}

pub fn run_attributed<C: TestContext + ?Sized>(
    ctx: &mut C,
    spec: &CommandSpec,
    attribution: Attribution,
) -> Result<Option<String>> {
    let result = runner::run(spec)?;

    match VerdictClassifier::classify(&result, attribution) {
        RunVerdict::Output => Ok(Some(output::decode(result.output)?)),
        RunVerdict::Failure(message) => {
            log::debug!(
                "{} command '{}' ended with {}",
                attribution,
                spec.display(),
                result.termination
            );
            ctx.fail(&message);
            Ok(None)
        }
    }
}
