/// Process execution with a wall clock budget and combined output capture
use crate::config::types::{HarnessError, ProcessResult, Result, Termination};
use crate::exec::command::CommandSpec;
use nix::fcntl::OFlag;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::{pipe2, Pid};
use std::fs::File;
use std::io::{Read, Write};
use std::os::unix::io::FromRawFd;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Run a command to completion or until its timeout elapses.
///
/// stdout and stderr share one pipe, so the captured text keeps the order the
/// child wrote it in. On timeout the child's process group is killed and the
/// partial output is discarded.
pub fn run(spec: &CommandSpec) -> Result<ProcessResult> {
    let program = spec.program().ok_or(HarnessError::EmptyCommand)?;
    log::debug!(
        "Running '{}' (timeout {:?}, workdir {:?})",
        spec.display(),
        spec.timeout,
        spec.workdir
    );

    let (reader, writer) = combined_pipe()?;
    let started = Instant::now();
    // A budget too large for the clock means no deadline at all.
    let deadline = started.checked_add(spec.timeout);

    let mut child = spawn(spec, writer).map_err(|source| HarnessError::Spawn {
        program: program.to_string(),
        source,
    })?;

    if let Some(stdin) = child.stdin.take() {
        let data = spec.stdin_data.clone().unwrap_or_default();
        thread::spawn(move || feed_stdin(stdin, data));
    }

    let output_rx = collect_output(reader);

    let termination = match wait_until(&mut child, deadline) {
        Ok(Some(status)) => termination_from(status),
        Ok(None) => {
            kill_process_group(&mut child);
            Termination::TimedOut
        }
        Err(e) => {
            kill_process_group(&mut child);
            return Err(HarnessError::Io(e));
        }
    };

    let (termination, output) = match termination {
        Termination::TimedOut => (Termination::TimedOut, Vec::new()),
        finished => {
            // A background descendant can keep the pipe open after the child
            // exits; the remaining budget bounds how long we wait for EOF.
            let received = match deadline {
                Some(deadline) => {
                    output_rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
                }
                None => output_rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok(output) => (finished, output),
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!(
                        "Output of '{}' still open after the process exited; treating as timeout",
                        spec.display()
                    );
                    kill_process_group(&mut child);
                    (Termination::TimedOut, Vec::new())
                }
                Err(RecvTimeoutError::Disconnected) => (finished, Vec::new()),
            }
        }
    };

    let wall_time = started.elapsed();
    log::debug!(
        "'{}' finished with {} after {:?} ({} bytes of output)",
        spec.display(),
        termination,
        wall_time,
        output.len()
    );

    Ok(ProcessResult {
        termination,
        output,
        wall_time,
        timeout: spec.timeout,
    })
}

/// Open a close-on-exec pipe; the write end becomes both stdout and stderr
fn combined_pipe() -> Result<(File, File)> {
    let (read_fd, write_fd) =
        pipe2(OFlag::O_CLOEXEC).map_err(|e| HarnessError::Io(std::io::Error::from(e)))?;

    // Both descriptors were just created by pipe2 and are owned by nobody else.
    let reader = unsafe { File::from_raw_fd(read_fd) };
    let writer = unsafe { File::from_raw_fd(write_fd) };
    Ok((reader, writer))
}

/// Spawn the child in its own process group. The `Command` (and with it the
/// parent's copies of the write end) is dropped before this returns, so the
/// reader sees EOF once the child side closes.
fn spawn(spec: &CommandSpec, writer: File) -> std::io::Result<Child> {
    let stderr = writer.try_clone()?;

    let mut cmd = Command::new(&spec.argv[0]);
    cmd.args(&spec.argv[1..])
        .stdout(Stdio::from(writer))
        .stderr(Stdio::from(stderr))
        .stdin(if spec.stdin_data.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .process_group(0);

    if let Some(dir) = &spec.workdir {
        cmd.current_dir(dir);
    }

    for (key, value) in &spec.environment {
        cmd.env(key, value);
    }

    cmd.spawn()
}

fn feed_stdin(mut stdin: std::process::ChildStdin, data: String) {
    // The child may exit without reading; a broken pipe here is expected.
    if let Err(e) = stdin.write_all(data.as_bytes()) {
        log::debug!("stdin write stopped early: {}", e);
    }
}

/// Drain the pipe on a background thread until every writer has closed it.
///
/// A descendant that leaves the process group (e.g. via `setsid`) survives the
/// group kill. If it keeps the pipe open, this thread stays blocked in
/// `read_to_end` until that process exits. `run` itself still returns at the
/// deadline.
fn collect_output(mut reader: File) -> Receiver<Vec<u8>> {
    let (tx, rx) = channel();
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Err(e) = reader.read_to_end(&mut buffer) {
            log::warn!("Output collection ended with error: {}", e);
        }
        let _ = tx.send(buffer);
    });
    rx
}

/// Poll the child until it exits (`Some`) or the deadline passes (`None`)
fn wait_until(
    child: &mut Child,
    deadline: Option<Instant>,
) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// SIGKILL the child's whole process group, then reap the child
fn kill_process_group(child: &mut Child) {
    let pgid = Pid::from_raw(child.id() as libc::pid_t);
    if let Err(errno) = killpg(pgid, Signal::SIGKILL) {
        log::debug!(
            "group SIGKILL for {} failed ({}); killing child directly",
            pgid,
            errno
        );
        let _ = child.kill();
    }
    let _ = child.wait();
}

fn termination_from(status: ExitStatus) -> Termination {
    match (status.code(), status.signal()) {
        (Some(code), _) => Termination::Exited(code),
        (None, Some(signal)) => Termination::Signaled(signal),
        (None, None) => {
            log::warn!("Unrecognized wait status {:?}; reporting as exit code -1", status);
            Termination::Exited(-1)
        }
    }
}
