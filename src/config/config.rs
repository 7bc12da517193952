use crate::config::types::{HarnessError, Result};
/// Configuration loading from a JSON file
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tool locations and defaults shared by every check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HarnessConfig {
    /// Build tool executable
    pub make_program: String,
    /// Coverage report tool executable
    pub gcov_program: String,
    /// Memory checker executable
    pub valgrind_program: String,
    /// Build file used when the caller does not name one
    pub default_makefile: String,
    /// Extra make argument injected for coverage builds
    pub coverage_flags: String,
    /// Exit code valgrind reserves for "errors found"
    pub memcheck_error_exitcode: i32,
    /// Time budget for program runs (seconds)
    pub run_timeout_secs: f64,
    /// Time budget for builds (seconds)
    pub build_timeout_secs: f64,
    /// Time budget for memory-checked runs (seconds)
    pub memcheck_timeout_secs: f64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            make_program: "make".to_string(),
            gcov_program: "gcov".to_string(),
            valgrind_program: "valgrind".to_string(),
            default_makefile: "test_makefile".to_string(),
            coverage_flags: "CFLAGS=-O0 --coverage".to_string(),
            memcheck_error_exitcode: 4,
            run_timeout_secs: 5.0,
            build_timeout_secs: 120.0,
            memcheck_timeout_secs: 60.0,
        }
    }
}

impl HarnessConfig {
    /// Load configuration from a JSON file; absent fields keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_json(&text)?;
        log::debug!("Loaded harness configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| HarnessError::Config(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (name, secs) in [
            ("run_timeout_secs", self.run_timeout_secs),
            ("build_timeout_secs", self.build_timeout_secs),
            ("memcheck_timeout_secs", self.memcheck_timeout_secs),
        ] {
            if secs <= 0.0 || Duration::try_from_secs_f64(secs).is_err() {
                return Err(HarnessError::Config(format!(
                    "{} must be a positive number of seconds, got {}",
                    name, secs
                )));
            }
        }

        for (name, program) in [
            ("make_program", &self.make_program),
            ("gcov_program", &self.gcov_program),
            ("valgrind_program", &self.valgrind_program),
        ] {
            if program.trim().is_empty() {
                return Err(HarnessError::Config(format!("{} must not be empty", name)));
            }
        }

        Ok(())
    }

    pub fn run_timeout(&self) -> Duration {
        seconds(self.run_timeout_secs)
    }

    pub fn build_timeout(&self) -> Duration {
        seconds(self.build_timeout_secs)
    }

    pub fn memcheck_timeout(&self) -> Duration {
        seconds(self.memcheck_timeout_secs)
    }
}

/// Saturating conversion for fields changed after validation
fn seconds(secs: f64) -> Duration {
    match Duration::try_from_secs_f64(secs) {
        Ok(duration) => duration,
        Err(_) if secs > 0.0 => Duration::MAX,
        Err(_) => Duration::ZERO,
    }
}
