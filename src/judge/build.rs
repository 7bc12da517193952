/// Build runner: rebuild an artifact with make and confirm it exists
use crate::config::types::{Result, Termination};
use crate::exec::runner;
use crate::judge::context::TestContext;
use crate::judge::toolchain::Toolchain;
use crate::utils::output;
use crate::verdict::verdict::format_seconds;
use std::fs;
use std::path::{Path, PathBuf};

/// What to build and how
#[derive(Debug, Clone, Default)]
pub struct BuildRequest {
    /// Build file name inside the working directory (config default when `None`)
    pub makefile: Option<String>,
    /// Make target when it differs from the artifact name (phony targets)
    pub target: Option<String>,
    /// Extra `NAME=value` arguments passed to make
    pub variables: Vec<String>,
}

impl BuildRequest {
    pub fn makefile(mut self, makefile: impl Into<String>) -> Self {
        self.makefile = Some(makefile.into());
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn variable(mut self, assignment: impl Into<String>) -> Self {
        self.variables.push(assignment.into());
        self
    }
}

/// Build `artifact` in `workdir` with the default build file and target.
pub fn test_build<C: TestContext + ?Sized>(
    ctx: &mut C,
    tools: &Toolchain,
    artifact: &str,
    workdir: &Path,
) -> Result<bool> {
    build_artifact(ctx, tools, artifact, workdir, &BuildRequest::default())
}

/// Remove any stale `workdir/artifact`, force a full rebuild, and check the
/// artifact appeared. Returns `Ok(true)` when the build passed; failures are
/// recorded on `ctx`.
pub fn build_artifact<C: TestContext + ?Sized>(
    ctx: &mut C,
    tools: &Toolchain,
    artifact: &str,
    workdir: &Path,
    request: &BuildRequest,
) -> Result<bool> {
    // make -C changes directory before reading -f, so the build file path
    // has to survive that.
    let workdir = absolute(workdir)?;
    let artifact_path = workdir.join(artifact);

    // Submissions sometimes include a prebuilt binary.
    if artifact_path.is_file() {
        fs::remove_file(&artifact_path)?;
        ctx.info("Removing submitted binary...");
    }

    let makefile = request
        .makefile
        .as_deref()
        .unwrap_or(&tools.config().default_makefile);
    let target = request.target.as_deref().unwrap_or(artifact);
    let spec = tools.make_command(&workdir, makefile, target, &request.variables);

    log::info!("Building '{}' in {}", target, workdir.display());
    let result = runner::run(&spec)?;

    match result.termination {
        Termination::Exited(0) => {}
        Termination::TimedOut => {
            ctx.fail(&format!(
                "Failed to compile. Build timed out after {} seconds",
                format_seconds(result.timeout)
            ));
            return Ok(false);
        }
        other => {
            log::debug!("make ended with {}", other);
            let build_log = output::decode(result.output)?;
            ctx.fail(&format!("Failed to compile. Output is: {}", build_log));
            return Ok(false);
        }
    }

    let build_log = output::decode(result.output)?;
    if output::has_content(&build_log) {
        ctx.info(&format!("g++ output:\n{}", build_log));
    }

    // Catches build files whose default target builds nothing.
    if !artifact_path.is_file() {
        ctx.fail("Make/gcc/g++ didn't produce a binary");
        return Ok(false);
    }

    ctx.info("Compiled successfully!");
    Ok(true)
}

pub(crate) fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
