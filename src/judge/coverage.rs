/// Coverage runner: instrumented build, one run, gcov report, 100% or fail
use crate::config::types::{HarnessError, Result};
use crate::exec::command::CommandSpec;
use crate::judge::build::{absolute, build_artifact, BuildRequest};
use crate::judge::context::TestContext;
use crate::judge::run::harness_run;
use crate::judge::toolchain::Toolchain;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// The only percentage that passes
pub const FULL_COVERAGE: &str = "100.00%";

static PERCENTAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.?\d+%").expect("coverage percentage pattern"));

/// First percentage token in a gcov report, e.g. `87.50%`
pub fn parse_coverage_percentage(report: &str) -> Option<&str> {
    PERCENTAGE.find(report).map(|m| m.as_str())
}

/// Line-by-line annotation gcov leaves next to the source, if readable.
/// Absence is normal (e.g. gcov found no data) and never fails the check.
pub fn read_annotation(workdir: &Path, source: &str) -> std::result::Result<String, String> {
    let path = workdir.join(format!("{}.gcov", source));
    std::fs::read_to_string(&path).map_err(|e| {
        format!(
            "Couldn't open {} for line-by-line coverage: {}",
            path.display(),
            e
        )
    })
}

/// Require 100% line coverage of `source` from one run of `target`.
///
/// Returns `Ok(true)` on full coverage. Shortfalls and build or harness
/// failures are recorded on `ctx`. A gcov report without any percentage is
/// returned as `Err(HarnessError::CoverageReport)`.
pub fn test_coverage<C: TestContext + ?Sized>(
    ctx: &mut C,
    tools: &Toolchain,
    source: &str,
    target: &str,
    workdir: &Path,
) -> Result<bool> {
    let workdir = &absolute(workdir)?;
    let request = BuildRequest {
        variables: tools.coverage_variables(),
        ..Default::default()
    };
    if !build_artifact(ctx, tools, target, workdir, &request)? {
        return Ok(false);
    }

    // Running the instrumented binary writes the .gcda counters.
    let program = CommandSpec::new([workdir.join(target).to_string_lossy().to_string()])
        .workdir(workdir)
        .timeout(tools.config().run_timeout());
    if harness_run(ctx, program)?.is_none() {
        return Ok(false);
    }

    let report = match harness_run(ctx, tools.gcov_command(workdir, source, target))? {
        Some(report) => report,
        None => return Ok(false),
    };

    let percentage = parse_coverage_percentage(&report).ok_or_else(|| {
        HarnessError::CoverageReport(format!(
            "no percentage found in gcov output: {}",
            report.trim()
        ))
    })?;

    if percentage != FULL_COVERAGE {
        match read_annotation(workdir, source) {
            Ok(annotated) => ctx.info(&annotated),
            Err(note) => ctx.info(&note),
        }
        ctx.fail(&format!(
            "Test coverage was only {}, expected {}",
            percentage, FULL_COVERAGE
        ));
        return Ok(false);
    }

    ctx.info(
        "100% line coverage! Remember that full coverage does not mean your code is correct.",
    );
    Ok(true)
}
