//! Report file layout and the overall timing report
//!
//! File names and line formats are fixed: `OverallTimeProcesses.txt` holds
//! the one-line fan-out/fan-in timing, `TimeProcesses.txt` and
//! `SieveProcesses.txt` hold each worker's timing and trace (`Threads`
//! variants for the thread harness).
//!
//! By default every worker of a harness writes to the same two paths.
//! Concurrent workers therefore truncate and interleave each other's output
//! and the files end up with last-writer-wins content. That hazard is
//! inherited behavior, kept deliberately; `unique_worker_files` switches to
//! index-suffixed paths (`TimeProcesses.3.txt`) as the documented extension.

use crate::harness::{FanoutReport, HarnessKind};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Where one harness run places its report files.
#[derive(Debug, Clone)]
pub struct ReportLayout {
    directory: PathBuf,
    kind: HarnessKind,
    unique_worker_files: bool,
}

impl ReportLayout {
    /// Layout rooted at `directory` for the given harness kind.
    pub fn new(directory: PathBuf, kind: HarnessKind, unique_worker_files: bool) -> Self {
        Self {
            directory,
            kind,
            unique_worker_files,
        }
    }

    /// Report directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Harness kind this layout reports for.
    pub fn kind(&self) -> HarnessKind {
        self.kind
    }

    /// Whether per-worker files carry an index suffix.
    pub fn unique_worker_files(&self) -> bool {
        self.unique_worker_files
    }

    /// Create the report directory if it does not exist yet.
    pub fn ensure_directory(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.directory)
    }

    /// Path of the overall fan-out/fan-in timing report.
    pub fn overall_path(&self) -> PathBuf {
        self.directory
            .join(format!("OverallTime{}.txt", self.kind.file_suffix()))
    }

    /// Path of one worker's timing report.
    pub fn timing_path(&self, worker_index: usize) -> PathBuf {
        self.worker_path("Time", worker_index)
    }

    /// Path of one worker's sieve trace report.
    pub fn trace_path(&self, worker_index: usize) -> PathBuf {
        self.worker_path("Sieve", worker_index)
    }

    fn worker_path(&self, prefix: &str, worker_index: usize) -> PathBuf {
        let suffix = self.kind.file_suffix();
        let name = if self.unique_worker_files {
            format!("{prefix}{suffix}.{worker_index}.txt")
        } else {
            format!("{prefix}{suffix}.txt")
        };
        self.directory.join(name)
    }

    /// Open the overall report for writing. Done before the fan-out starts,
    /// so a top-level report failure aborts the run before any worker is
    /// spawned.
    pub fn create_overall(&self) -> io::Result<OverallReport> {
        let file = File::create(self.overall_path())?;
        Ok(OverallReport {
            writer: BufWriter::new(file),
        })
    }
}

/// Writer for the one-line overall timing report.
pub struct OverallReport {
    writer: BufWriter<File>,
}

impl OverallReport {
    /// Record the outcome of a completed fan-out/fan-in run.
    pub fn record(&mut self, report: &FanoutReport) -> io::Result<()> {
        writeln!(
            self.writer,
            "Time to run: {} {} of the Sieve in microseconds: {} microseconds",
            report.workers,
            report.kind.noun(),
            report.elapsed_micros()
        )?;
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::WorkerExit;
    use std::time::Duration;

    #[test]
    fn shared_paths_are_fixed_per_kind() {
        let layout = ReportLayout::new(PathBuf::from("out"), HarnessKind::Process, false);
        assert_eq!(
            layout.overall_path(),
            PathBuf::from("out/OverallTimeProcesses.txt")
        );
        assert_eq!(layout.timing_path(0), PathBuf::from("out/TimeProcesses.txt"));
        // Same path for every worker: the inherited last-writer-wins hazard.
        assert_eq!(layout.timing_path(7), layout.timing_path(0));
        assert_eq!(
            layout.trace_path(3),
            PathBuf::from("out/SieveProcesses.txt")
        );
    }

    #[test]
    fn unique_paths_carry_worker_index() {
        let layout = ReportLayout::new(PathBuf::from("out"), HarnessKind::Thread, true);
        assert_eq!(
            layout.timing_path(3),
            PathBuf::from("out/TimeThreads.3.txt")
        );
        assert_eq!(
            layout.trace_path(0),
            PathBuf::from("out/SieveThreads.0.txt")
        );
        // The overall report is written once by the harness, never suffixed.
        assert_eq!(
            layout.overall_path(),
            PathBuf::from("out/OverallTimeThreads.txt")
        );
    }

    #[test]
    fn overall_report_line_format() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ReportLayout::new(dir.path().to_path_buf(), HarnessKind::Process, false);

        let mut overall = layout.create_overall().unwrap();
        overall
            .record(&FanoutReport {
                kind: HarnessKind::Process,
                workers: 4,
                elapsed: Duration::from_micros(5321),
                exits: vec![WorkerExit::Clean; 4],
            })
            .unwrap();

        let contents = std::fs::read_to_string(layout.overall_path()).unwrap();
        assert_eq!(
            contents,
            "Time to run: 4 processes of the Sieve in microseconds: 5321 microseconds\n"
        );
    }

    #[test]
    fn create_overall_fails_for_missing_directory() {
        let layout = ReportLayout::new(
            PathBuf::from("/nonexistent/sievebench-reports"),
            HarnessKind::Thread,
            false,
        );
        assert!(layout.create_overall().is_err());
    }
}
