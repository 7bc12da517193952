/// Memory-check runner: wrap a command in valgrind's memcheck
use crate::config::types::{Result, Termination};
use crate::exec::command::CommandSpec;
use crate::exec::runner;
use crate::judge::context::TestContext;
use crate::judge::toolchain::Toolchain;
use crate::utils::output;
use crate::verdict::verdict::format_seconds;

/// Run `command` under memcheck with leak checking.
///
/// A bare string is a one-element command. Any non-zero exit fails the
/// check: the reserved exit code gets the "errors detected" message, other
/// codes and signals report what valgrind itself did. The time budget is the
/// larger of the command's timeout and the configured memcheck timeout.
pub fn test_memcheck<C: TestContext + ?Sized>(
    ctx: &mut C,
    tools: &Toolchain,
    command: impl Into<CommandSpec>,
) -> Result<bool> {
    let command = command.into();
    let mut spec = tools.memcheck_command(&command);
    spec.timeout = command.timeout.max(tools.config().memcheck_timeout());

    log::info!("Memory-checking '{}'", command.display());
    let result = runner::run(&spec)?;
    let reserved = tools.config().memcheck_error_exitcode;

    match result.termination {
        Termination::Exited(0) => {
            ctx.info("Valgrind reported no memory errors");
            Ok(true)
        }
        Termination::TimedOut => {
            ctx.fail(&format!(
                "Memory check timed out after {} seconds",
                format_seconds(result.timeout)
            ));
            Ok(false)
        }
        Termination::Exited(code) if code == reserved => {
            let report = output::decode(result.output)?;
            ctx.fail(&format!(
                "Valgrind detected memory errors. Output is: {}",
                report
            ));
            Ok(false)
        }
        other => {
            let report = output::decode(result.output)?;
            ctx.fail(&format!(
                "Valgrind exited with {}. Output is: {}",
                other, report
            ));
            Ok(false)
        }
    }
}
