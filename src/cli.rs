use crate::config::config::HarnessConfig;
use crate::exec::command::CommandSpec;
use crate::judge::{self, BuildRequest, TestContext, Toolchain};
use crate::utils::markers;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file (tool paths, default timeouts)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Force a rebuild of an artifact with make and check it was produced
    Build {
        /// Directory holding the submission and build file
        #[arg(long)]
        workdir: PathBuf,
        /// File the build must produce
        #[arg(long)]
        artifact: String,
        /// Build file name inside the working directory
        #[arg(long)]
        makefile: Option<String>,
        /// Make target, when it differs from the artifact (phony targets)
        #[arg(long)]
        target: Option<String>,
    },
    /// Build with coverage instrumentation, run once, and require 100% line coverage
    Coverage {
        #[arg(long)]
        workdir: PathBuf,
        /// Source file whose coverage is measured
        #[arg(long)]
        source: String,
        /// Binary to build and run
        #[arg(long)]
        target: String,
    },
    /// Run a command under valgrind memcheck
    Memcheck {
        #[arg(long)]
        workdir: Option<PathBuf>,
        /// Time limit in seconds
        #[arg(long)]
        timeout: Option<f64>,
        /// Command and arguments to check
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        command: Vec<String>,
    },
    /// Run a command and print its combined output
    Run {
        /// Blame the harness instead of the student for failures
        #[arg(long)]
        harness: bool,
        #[arg(long)]
        workdir: Option<PathBuf>,
        /// Time limit in seconds
        #[arg(long)]
        timeout: Option<f64>,
        /// Command and arguments to execute
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        command: Vec<String>,
    },
    /// Read text on stdin and print the single ###value### marker in it
    Extract {
        #[arg(value_enum)]
        kind: MarkerKind,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MarkerKind {
    String,
    Integer,
    Double,
}

/// Reports informational text on stdout and failures on stderr
#[derive(Default)]
struct ConsoleContext {
    failures: usize,
}

impl TestContext for ConsoleContext {
    fn fail(&mut self, message: &str) {
        self.failures += 1;
        eprintln!("FAIL: {}", message);
    }

    fn info(&mut self, message: &str) {
        println!("{}", message);
    }
}

impl ConsoleContext {
    fn exit_code(&self) -> i32 {
        if self.failures == 0 {
            0
        } else {
            1
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<HarnessConfig> {
    match path {
        Some(path) => HarnessConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(HarnessConfig::default()),
    }
}

fn parse_timeout(secs: Option<f64>, default: Duration) -> Result<Duration> {
    match secs {
        None => Ok(default),
        Some(secs) if secs > 0.0 => Duration::try_from_secs_f64(secs)
            .with_context(|| format!("--timeout {} is out of range", secs)),
        Some(secs) => bail!("--timeout must be a positive number of seconds, got {}", secs),
    }
}

fn command_spec(
    command: Vec<String>,
    workdir: Option<PathBuf>,
    timeout: Duration,
) -> CommandSpec {
    let mut spec = CommandSpec::new(command).timeout(timeout);
    if let Some(dir) = workdir {
        spec = spec.workdir(dir);
    }
    spec
}

/// Parse arguments, run one check, and return the process exit status
pub fn run() -> Result<i32> {
    env_logger::init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let tools = Toolchain::new(config);
    let mut ctx = ConsoleContext::default();

    match cli.command {
        Commands::Build {
            workdir,
            artifact,
            makefile,
            target,
        } => {
            let request = BuildRequest {
                makefile,
                target,
                variables: Vec::new(),
            };
            judge::build_artifact(&mut ctx, &tools, &artifact, &workdir, &request)?;
        }
        Commands::Coverage {
            workdir,
            source,
            target,
        } => {
            judge::test_coverage(&mut ctx, &tools, &source, &target, &workdir)?;
        }
        Commands::Memcheck {
            workdir,
            timeout,
            command,
        } => {
            let timeout = parse_timeout(timeout, tools.config().memcheck_timeout())?;
            judge::test_memcheck(&mut ctx, &tools, command_spec(command, workdir, timeout))?;
        }
        Commands::Run {
            harness,
            workdir,
            timeout,
            command,
        } => {
            let timeout = parse_timeout(timeout, tools.config().run_timeout())?;
            let spec = command_spec(command, workdir, timeout);
            let output = if harness {
                judge::harness_run(&mut ctx, spec)?
            } else {
                judge::safe_run(&mut ctx, spec)?
            };
            if let Some(output) = output {
                print!("{}", output);
            }
        }
        Commands::Extract { kind } => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading stdin")?;

            let value = match kind {
                MarkerKind::String => markers::find_string(&text),
                MarkerKind::Integer => markers::find_integer(&text).map(|v| v.to_string()),
                MarkerKind::Double => markers::find_double(&text).map(|v| v.to_string()),
            };

            return Ok(match value {
                Some(value) => {
                    println!("{}", value);
                    0
                }
                None => {
                    eprintln!("No unique ###{:?}### marker found", kind);
                    1
                }
            });
        }
    }

    Ok(ctx.exit_code())
}
