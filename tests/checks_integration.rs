//! Integration tests for the grading checks
//!
//! These run the real external tools. Tests print a note and return early
//! when a tool they need is not installed.

use gradebox::judge::{
    build_artifact, harness_run, safe_run, test_build, test_coverage, test_memcheck,
    BuildRequest,
};
use gradebox::{find_integer, CommandSpec, HarnessError, RecordingContext, Toolchain};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

fn tool_available(tool: &str) -> bool {
    Command::new(tool)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

struct Scratch(PathBuf);

impl Scratch {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("gradebox-test-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        Scratch(dir)
    }

    fn path(&self) -> &Path {
        &self.0
    }

    fn write(&self, name: &str, contents: &str) {
        fs::write(self.0.join(name), contents).unwrap();
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn compile(dir: &Path, source: &str, output: &str) -> bool {
    Command::new("gcc")
        .args(["-O0", "-g", "-o", output, source])
        .current_dir(dir)
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[test]
fn test_build_success() {
    if !tool_available("make") {
        println!("make not installed; skipping");
        return;
    }
    let dir = Scratch::new();
    dir.write("test_makefile", "prog:\n\ttouch prog\n");

    let mut ctx = RecordingContext::new();
    let passed = test_build(&mut ctx, &Toolchain::default(), "prog", dir.path()).unwrap();

    assert!(passed);
    assert!(ctx.passed(), "unexpected failures: {:?}", ctx.failures);
    assert!(ctx.notes.iter().any(|n| n == "Compiled successfully!"));
}

#[test]
fn test_build_failure_reports_output() {
    if !tool_available("make") {
        println!("make not installed; skipping");
        return;
    }
    let dir = Scratch::new();
    dir.write(
        "test_makefile",
        "prog:\n\techo 'prog.c:3: error: expected semicolon'; exit 1\n",
    );

    let mut ctx = RecordingContext::new();
    let passed = test_build(&mut ctx, &Toolchain::default(), "prog", dir.path()).unwrap();

    assert!(!passed);
    assert_eq!(ctx.failures.len(), 1);
    assert!(ctx.failures[0].starts_with("Failed to compile. Output is: "));
    assert!(ctx.failures[0].contains("prog.c:3: error: expected semicolon"));
}

#[test]
fn test_build_without_artifact() {
    if !tool_available("make") {
        println!("make not installed; skipping");
        return;
    }
    let dir = Scratch::new();
    dir.write("test_makefile", "prog:\n\ttrue\n");

    let mut ctx = RecordingContext::new();
    let passed = test_build(&mut ctx, &Toolchain::default(), "prog", dir.path()).unwrap();

    assert!(!passed);
    assert_eq!(ctx.failures, vec!["Make/gcc/g++ didn't produce a binary"]);
}

#[test]
fn test_build_removes_submitted_binary() {
    if !tool_available("make") {
        println!("make not installed; skipping");
        return;
    }
    let dir = Scratch::new();
    dir.write("prog", "stale binary from the submission");
    dir.write("test_makefile", "all:\n\ttrue\n");

    let mut ctx = RecordingContext::new();
    let request = BuildRequest::default().target("all");
    let passed =
        build_artifact(&mut ctx, &Toolchain::default(), "prog", dir.path(), &request).unwrap();

    assert!(!passed);
    assert!(!dir.path().join("prog").exists());
    assert!(ctx.notes.iter().any(|n| n == "Removing submitted binary..."));
    assert_eq!(ctx.failures, vec!["Make/gcc/g++ didn't produce a binary"]);
}

#[test]
fn test_build_phony_target_and_custom_makefile() {
    if !tool_available("make") {
        println!("make not installed; skipping");
        return;
    }
    let dir = Scratch::new();
    dir.write("grading.mk", "all:\n\ttouch prog\n");

    let mut ctx = RecordingContext::new();
    let request = BuildRequest::default().makefile("grading.mk").target("all");
    let passed =
        build_artifact(&mut ctx, &Toolchain::default(), "prog", dir.path(), &request).unwrap();

    assert!(passed);
    assert!(ctx.passed());
}

#[test]
fn test_build_surfaces_warnings() {
    if !tool_available("make") {
        println!("make not installed; skipping");
        return;
    }
    let dir = Scratch::new();
    dir.write(
        "test_makefile",
        "prog:\n\techo 'warning: unused variable x'\n\ttouch prog\n",
    );

    let mut ctx = RecordingContext::new();
    assert!(test_build(&mut ctx, &Toolchain::default(), "prog", dir.path()).unwrap());
    assert!(ctx
        .notes
        .iter()
        .any(|n| n.starts_with("g++ output:\n") && n.contains("unused variable x")));
}

#[test]
fn test_build_always_rebuilds() {
    if !tool_available("make") {
        println!("make not installed; skipping");
        return;
    }
    let dir = Scratch::new();
    dir.write("test_makefile", "prog:\n\techo built >> build.log\n\ttouch prog\n");

    let tools = Toolchain::default();
    let mut first = RecordingContext::new();
    let mut second = RecordingContext::new();
    assert!(test_build(&mut first, &tools, "prog", dir.path()).unwrap());
    assert!(test_build(&mut second, &tools, "prog", dir.path()).unwrap());

    let log = fs::read_to_string(dir.path().join("build.log")).unwrap();
    assert_eq!(log, "built\nbuilt\n");
    assert_eq!(first.failures, second.failures);
}

#[test]
fn test_build_missing_make_is_an_error() {
    let config =
        gradebox::HarnessConfig::from_json(r#"{"make_program": "/nonexistent/gradebox-make"}"#)
            .unwrap();
    let dir = Scratch::new();
    let mut ctx = RecordingContext::new();
    let err = test_build(&mut ctx, &Toolchain::new(config), "prog", dir.path()).unwrap_err();
    assert!(matches!(err, HarnessError::Spawn { .. }));
}

#[test]
fn test_student_program_crashes() {
    if !tool_available("gcc") {
        println!("gcc not installed; skipping");
        return;
    }
    let dir = Scratch::new();
    dir.write(
        "segv.c",
        "int main(void) { volatile int *p = 0; *p = 1; return 0; }\n",
    );
    dir.write(
        "abrt.c",
        "#include <assert.h>\nint main(void) { assert(1 == 2); return 0; }\n",
    );
    assert!(compile(dir.path(), "segv.c", "segv"));
    assert!(compile(dir.path(), "abrt.c", "abrt"));

    let mut ctx = RecordingContext::new();
    let segv = dir.path().join("segv").to_string_lossy().to_string();
    assert!(safe_run(&mut ctx, segv.as_str()).unwrap().is_none());
    assert!(ctx.failures[0].contains("segfaulted"));

    let mut ctx = RecordingContext::new();
    assert!(harness_run(&mut ctx, segv.as_str()).unwrap().is_none());
    assert!(ctx.failures[0].contains("segfaulted"));
    assert!(ctx.failures[0].contains("teaching staff"));

    let mut ctx = RecordingContext::new();
    let abrt = dir.path().join("abrt").to_string_lossy().to_string();
    assert!(safe_run(&mut ctx, abrt.as_str()).unwrap().is_none());
    assert_eq!(
        ctx.failures,
        vec!["Program was aborted (assert failed or memory was corrupted)"]
    );
}

#[test]
fn test_student_output_with_marker() {
    let mut ctx = RecordingContext::new();
    let spec = CommandSpec::from(["sh", "-c", "echo 'sum: ###42###'; exit 3"]);
    let output = safe_run(&mut ctx, spec).unwrap().unwrap();
    assert_eq!(find_integer(&output), Some(42));
    assert!(ctx.passed());
}

#[test]
fn test_student_timeout_hides_output() {
    let mut ctx = RecordingContext::new();
    let spec = CommandSpec::from(["sh", "-c", "echo '###1###'; sleep 10"])
        .timeout(Duration::from_secs(1));
    assert!(safe_run(&mut ctx, spec).unwrap().is_none());
    assert_eq!(ctx.failures, vec!["Program timed out after 1 seconds"]);

    let mut ctx = RecordingContext::new();
    let spec = CommandSpec::from(["sleep", "10"]).timeout(Duration::from_millis(500));
    assert!(harness_run(&mut ctx, spec).unwrap().is_none());
    assert_eq!(
        ctx.failures,
        vec!["Test harness timed out - check with teaching staff"]
    );
}

// Two sources, so gcc names the notes files `cov-cov.gcno` and `cov-helper.gcno`.
const COVERAGE_MAKEFILE: &str = "cov: cov.c helper.c\n\t$(CC) $(CFLAGS) -o cov cov.c helper.c\n";
const HELPER_SOURCE: &str = "int helper(int x) {\n  return x + 1;\n}\n";

fn coverage_tools_ready() -> bool {
    if !(tool_available("make") && tool_available("gcc") && tool_available("gcov")) {
        println!("make/gcc/gcov not installed; skipping");
        return false;
    }
    true
}

#[test]
fn test_full_coverage_passes() {
    if !coverage_tools_ready() {
        return;
    }
    let dir = Scratch::new();
    dir.write("test_makefile", COVERAGE_MAKEFILE);
    dir.write("helper.c", HELPER_SOURCE);
    dir.write(
        "cov.c",
        "#include <stdio.h>\nint helper(int x);\nint main(void) {\n  printf(\"%d\\n\", helper(1));\n  return 0;\n}\n",
    );

    let mut ctx = RecordingContext::new();
    let passed = test_coverage(&mut ctx, &Toolchain::default(), "cov.c", "cov", dir.path())
        .unwrap();

    assert!(passed, "failures: {:?}", ctx.failures);
    assert!(ctx
        .notes
        .iter()
        .any(|n| n.contains("full coverage does not mean your code is correct")));
}

#[test]
fn test_partial_coverage_fails_with_percentage() {
    if !coverage_tools_ready() {
        return;
    }
    let dir = Scratch::new();
    dir.write("test_makefile", COVERAGE_MAKEFILE);
    dir.write("helper.c", HELPER_SOURCE);
    dir.write(
        "cov.c",
        "#include <stdio.h>\nint main(int argc, char **argv) {\n  if (argc > 5) {\n    printf(\"many\\n\");\n  }\n  return 0;\n}\n",
    );

    let mut ctx = RecordingContext::new();
    let passed = test_coverage(&mut ctx, &Toolchain::default(), "cov.c", "cov", dir.path())
        .unwrap();

    assert!(!passed);
    assert_eq!(ctx.failures.len(), 1);
    assert!(ctx.failures[0].starts_with("Test coverage was only "));
    assert!(!ctx.failures[0].contains("only 100.00%"));
    // The annotated source (or a note that it was missing) is shown first.
    assert!(!ctx.notes.is_empty());
}

#[test]
fn test_coverage_build_failure() {
    if !tool_available("make") {
        println!("make not installed; skipping");
        return;
    }
    let dir = Scratch::new();
    dir.write("test_makefile", "cov:\n\techo 'no compiler today'; exit 2\n");

    let mut ctx = RecordingContext::new();
    let passed = test_coverage(&mut ctx, &Toolchain::default(), "cov.c", "cov", dir.path())
        .unwrap();

    assert!(!passed);
    assert!(ctx.failures[0].starts_with("Failed to compile. Output is: "));
    assert!(ctx.failures[0].contains("no compiler today"));
}

#[test]
fn test_memcheck_clean_program() {
    if !tool_available("valgrind") {
        println!("valgrind not installed; skipping");
        return;
    }
    let mut ctx = RecordingContext::new();
    let passed = test_memcheck(&mut ctx, &Toolchain::default(), "true").unwrap();
    assert!(passed, "failures: {:?}", ctx.failures);
    assert!(ctx.notes.iter().any(|n| n.contains("no memory errors")));
}

#[test]
fn test_memcheck_invalid_read_is_reported() {
    if !(tool_available("valgrind") && tool_available("gcc")) {
        println!("valgrind/gcc not installed; skipping");
        return;
    }
    let dir = Scratch::new();
    dir.write(
        "overrun.c",
        "#include <stdlib.h>\nint main(void) {\n  int *a = malloc(4 * sizeof(int));\n  volatile int x = a[4];\n  (void)x;\n  free(a);\n  return 0;\n}\n",
    );
    assert!(compile(dir.path(), "overrun.c", "overrun"));

    let mut ctx = RecordingContext::new();
    let command = CommandSpec::from("./overrun").workdir(dir.path());
    let passed = test_memcheck(&mut ctx, &Toolchain::default(), command).unwrap();

    assert!(!passed);
    assert!(ctx.failures[0].starts_with("Valgrind detected memory errors. Output is: "));
    assert!(ctx.failures[0].contains("Invalid read"));
}

#[test]
fn test_memcheck_other_exit_code_still_fails() {
    if !tool_available("valgrind") {
        println!("valgrind not installed; skipping");
        return;
    }
    let mut ctx = RecordingContext::new();
    let passed = test_memcheck(&mut ctx, &Toolchain::default(), "false").unwrap();
    assert!(!passed);
    assert!(ctx.failures[0].starts_with("Valgrind exited with exit code 1"));
}
