use crate::config::config::HarnessConfig;
use crate::exec::command::CommandSpec;
use std::path::Path;

/// Command lines for the external build, coverage and memory-check tools
#[derive(Debug, Clone, Default)]
pub struct Toolchain {
    config: HarnessConfig,
}

impl Toolchain {
    pub fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// `make -f <workdir>/<makefile> --silent --always-make -C <workdir> [vars...] <target>`
    pub fn make_command(
        &self,
        workdir: &Path,
        makefile: &str,
        target: &str,
        variables: &[String],
    ) -> CommandSpec {
        let mut argv = vec![
            self.config.make_program.clone(),
            "-f".to_string(),
            workdir.join(makefile).to_string_lossy().to_string(),
            "--silent".to_string(),
            "--always-make".to_string(),
            "-C".to_string(),
            workdir.to_string_lossy().to_string(),
        ];
        argv.extend(variables.iter().cloned());
        argv.push(target.to_string());

        CommandSpec::new(argv).timeout(self.config.build_timeout())
    }

    /// Make variable assignment used for coverage builds
    pub fn coverage_variables(&self) -> Vec<String> {
        vec![self.config.coverage_flags.clone()]
    }

    /// `gcov <target>-<source>` run inside the working directory.
    /// Multi-file builds name their notes files after both target and source.
    pub fn gcov_command(&self, workdir: &Path, source: &str, target: &str) -> CommandSpec {
        CommandSpec::new([
            self.config.gcov_program.clone(),
            format!("{}-{}", target, source),
        ])
        .workdir(workdir)
        .timeout(self.config.run_timeout())
    }

    /// `valgrind --tool=memcheck --leak-check=yes --error-exitcode=N <command...>`
    pub fn memcheck_command(&self, command: &CommandSpec) -> CommandSpec {
        command.wrapped_by(vec![
            self.config.valgrind_program.clone(),
            "--tool=memcheck".to_string(),
            "--leak-check=yes".to_string(),
            format!("--error-exitcode={}", self.config.memcheck_error_exitcode),
        ])
    }
}
