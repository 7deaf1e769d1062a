//! Process fan-out backend
//!
//! Workers are independent OS processes. Each child is a re-execution of the
//! current binary with the hidden `--sieve-worker` flag: it runs exactly one
//! work unit in its own address space and exits, so a child can never fall
//! back into the parent's spawn loop. The parent keeps the `Child` handle in
//! its slot and later blocks on `wait()` for that child alone.
//!
//! No channel exists between parent and child beyond the exit status; a
//! nonzero status is recorded as an abnormal exit and the run continues.

use crate::harness::{FanoutHarness, HarnessKind, WorkerExit};
use crate::report::ReportLayout;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

/// Everything needed to launch one worker process.
#[derive(Debug, Clone)]
pub struct WorkerInvocation {
    binary: PathBuf,
    limit: usize,
    output: PathBuf,
    unique_files: bool,
}

impl WorkerInvocation {
    /// Invocation re-executing the currently running binary.
    pub fn current(limit: usize, layout: &ReportLayout) -> std::io::Result<Self> {
        let binary = std::env::current_exe()?;
        Ok(Self::with_binary(binary, limit, layout))
    }

    /// Invocation for a specific binary (for testing).
    pub fn with_binary(binary: PathBuf, limit: usize, layout: &ReportLayout) -> Self {
        Self {
            binary,
            limit,
            output: layout.directory().to_path_buf(),
            unique_files: layout.unique_worker_files(),
        }
    }

    fn command(&self, index: usize) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("--sieve-worker")
            .arg("--worker-index")
            .arg(index.to_string())
            .arg("--limit")
            .arg(self.limit.to_string())
            .arg("--output")
            .arg(&self.output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());
        if self.unique_files {
            command.arg("--unique-files");
        }
        command
    }
}

/// Fan-out harness spawning one OS process per worker.
pub struct ProcessHarness {
    invocation: WorkerInvocation,
}

impl ProcessHarness {
    /// Create a harness launching workers as described by `invocation`.
    pub fn new(invocation: WorkerInvocation) -> Self {
        Self { invocation }
    }
}

impl FanoutHarness for ProcessHarness {
    type Handle = Child;

    fn kind(&self) -> HarnessKind {
        HarnessKind::Process
    }

    fn spawn(&self, index: usize) -> std::io::Result<Self::Handle> {
        self.invocation.command(index).spawn()
    }

    fn join(&self, _index: usize, mut handle: Self::Handle) -> WorkerExit {
        match handle.wait() {
            Ok(status) if status.success() => WorkerExit::Clean,
            Ok(status) => WorkerExit::Abnormal {
                detail: format!("worker exited with {status}"),
            },
            Err(e) => WorkerExit::Abnormal {
                detail: format!("wait failed: {e}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::fan_out;
    use crate::harness::WorkerCount;

    #[test]
    fn invocation_builds_worker_command() {
        let layout = ReportLayout::new(PathBuf::from("/tmp/reports"), HarnessKind::Process, true);
        let invocation =
            WorkerInvocation::with_binary(PathBuf::from("/usr/bin/sievebench"), 500, &layout);
        let command = invocation.command(3);

        let args: Vec<&std::ffi::OsStr> = command.get_args().collect();
        assert_eq!(
            args,
            [
                "--sieve-worker",
                "--worker-index",
                "3",
                "--limit",
                "500",
                "--output",
                "/tmp/reports",
                "--unique-files",
            ]
            .map(std::ffi::OsStr::new)
        );
        assert_eq!(command.get_program(), "/usr/bin/sievebench");
    }

    #[test]
    fn invocation_omits_unique_flag_by_default() {
        let layout = ReportLayout::new(PathBuf::from("."), HarnessKind::Process, false);
        let invocation =
            WorkerInvocation::with_binary(PathBuf::from("sievebench"), 100, &layout);
        let command = invocation.command(0);
        let args: Vec<&std::ffi::OsStr> = command.get_args().collect();
        assert!(!args.contains(&std::ffi::OsStr::new("--unique-files")));
    }

    #[test]
    fn spawn_failure_is_fatal() {
        let layout = ReportLayout::new(PathBuf::from("."), HarnessKind::Process, false);
        let invocation = WorkerInvocation::with_binary(
            PathBuf::from("/nonexistent/sievebench-missing"),
            100,
            &layout,
        );
        let harness = ProcessHarness::new(invocation);

        let err = fan_out(&harness, WorkerCount::new(2).unwrap()).unwrap_err();
        assert!(matches!(
            err,
            crate::harness::HarnessError::SpawnFailed { index: 0, .. }
        ));
    }

    #[test]
    fn nonzero_exit_is_abnormal_but_joined() {
        // `false` terminates immediately with status 1 regardless of the
        // worker args it is handed. The harness must still join it and
        // keep going.
        let layout = ReportLayout::new(PathBuf::from("."), HarnessKind::Process, false);
        let invocation =
            WorkerInvocation::with_binary(PathBuf::from("/bin/false"), 100, &layout);
        let harness = ProcessHarness::new(invocation);
        let report = fan_out(&harness, WorkerCount::new(2).unwrap()).unwrap();

        assert_eq!(report.exits.len(), 2);
        assert_eq!(report.abnormal_exits(), 2);
    }
}
