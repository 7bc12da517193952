/// Command description handed to the process runner
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default time budget for a single run
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Program name plus arguments, with the options needed to launch it
#[derive(Clone, Debug, PartialEq)]
pub struct CommandSpec {
    /// Program followed by its arguments
    pub argv: Vec<String>,
    /// Directory to run in (inherits the caller's when `None`)
    pub workdir: Option<PathBuf>,
    /// Wall clock budget before the child is killed
    pub timeout: Duration,
    /// Extra environment variables layered over the inherited environment
    pub environment: Vec<(String, String)>,
    /// Data written to the child's stdin (stdin is empty when `None`)
    pub stdin_data: Option<String>,
}

impl CommandSpec {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            workdir: None,
            timeout: DEFAULT_TIMEOUT,
            environment: Vec::new(),
            stdin_data: None,
        }
    }

    pub fn workdir(mut self, dir: impl AsRef<Path>) -> Self {
        self.workdir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.push((key.into(), value.into()));
        self
    }

    pub fn stdin(mut self, data: impl Into<String>) -> Self {
        self.stdin_data = Some(data.into());
        self
    }

    /// Program name, if any
    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    /// Wrap this command as the trailing arguments of another program.
    /// Working directory, timeout and environment carry over.
    pub fn wrapped_by(&self, prefix: Vec<String>) -> Self {
        let mut argv = prefix;
        argv.extend(self.argv.iter().cloned());
        Self {
            argv,
            workdir: self.workdir.clone(),
            timeout: self.timeout,
            environment: self.environment.clone(),
            stdin_data: self.stdin_data.clone(),
        }
    }

    /// Shell-like rendering for log lines
    pub fn display(&self) -> String {
        self.argv
            .iter()
            .map(|arg| {
                if arg.is_empty() || arg.contains(char::is_whitespace) {
                    format!("'{}'", arg)
                } else {
                    arg.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// A bare string is a one-element command, never split on whitespace.
impl From<&str> for CommandSpec {
    fn from(program: &str) -> Self {
        Self::new([program])
    }
}

impl From<String> for CommandSpec {
    fn from(program: String) -> Self {
        Self::new([program])
    }
}

impl From<Vec<String>> for CommandSpec {
    fn from(argv: Vec<String>) -> Self {
        Self::new(argv)
    }
}

impl From<&[&str]> for CommandSpec {
    fn from(argv: &[&str]) -> Self {
        Self::new(argv.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for CommandSpec {
    fn from(argv: [&str; N]) -> Self {
        Self::new(argv)
    }
}

impl From<&CommandSpec> for CommandSpec {
    fn from(spec: &CommandSpec) -> Self {
        spec.clone()
    }
}
