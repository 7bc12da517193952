//! gradebox: build, run and inspect student C/C++ submissions for an
//! automated grading harness
//!
//! # Architecture
//!
//! ## Grading Checks ([`judge`])
//! - [`judge::build`]: forced rebuild through make, artifact verification
//! - [`judge::coverage`]: instrumented build, gcov report, 100% line coverage
//! - [`judge::memcheck`]: valgrind memcheck around a command
//! - [`judge::run`]: student-code and harness-code process runners
//! - [`judge::context`]: the test context failures are reported to
//! - [`judge::toolchain`]: make/gcov/valgrind command lines
//!
//! ## Execution Control ([`exec`])
//! - [`exec::command`]: argv, working directory, timeout, environment
//! - [`exec::runner`]: spawn, combined output capture, timeout kill
//!
//! ## Verdict ([`verdict`])
//! - [`verdict::verdict`]: exit/signal/timeout to output-or-failure table
//!
//! ## Configuration ([`config`])
//! - [`config::config`]: JSON configuration with defaults
//! - [`config::types`]: shared types and the error enum
//!
//! ## Utilities ([`utils`])
//! - [`utils::markers`]: `###value###` extraction
//! - [`utils::output`]: strict UTF-8 decoding
//!
//! Checks never abort the grading run. Problems with the submission are
//! recorded on the test context and the check returns normally; only faults
//! of the calling environment come back as [`HarnessError`].

// Grading Checks
pub mod judge;

// Execution Control
pub mod exec;

// Verdict
pub mod verdict;

// Configuration
pub mod config;

// Utilities
pub mod utils;

// CLI entrypoint wiring for the gradebox binary.
pub mod cli;

// Re-export commonly used types for convenience
pub use config::config::HarnessConfig;
pub use config::types::*;
pub use exec::command::CommandSpec;
pub use judge::{RecordingContext, TestContext, Toolchain};
pub use utils::markers::{find_double, find_integer, find_string};
