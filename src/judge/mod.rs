//! Grading checks.
//!
//! Each check wraps one external tool invocation and reports through a
//! [`context::TestContext`]. The toolchain builds the tool command lines from
//! configuration.

pub mod build;
pub mod context;
pub mod coverage;
pub mod memcheck;
pub mod run;
pub mod toolchain;

pub use build::{build_artifact, test_build, BuildRequest};
pub use context::{RecordingContext, TestContext};
pub use coverage::test_coverage;
pub use memcheck::test_memcheck;
pub use run::{harness_run, safe_run};
pub use toolchain::Toolchain;
