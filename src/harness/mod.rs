//! Fan-out/fan-in harness core
//!
//! The [`FanoutHarness`] trait is the polymorphic capability shared by the
//! process and thread backends: spawn one worker for a slot index, join one
//! worker handle. The generic [`fan_out`] driver owns the control flow that
//! is actually being benchmarked — record a start instant, spawn workers
//! 0..N in order, join them 0..N in order, record an end instant.
//!
//! Spawn failure is fatal to the run. A worker that terminates abnormally is
//! recorded and logged but never aborts its siblings; the only coordination
//! between workers is termination counting.

pub mod process;
pub mod thread;

use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors fatal to a harness run.
///
/// Failures local to one worker (report files, abnormal exit) are *not*
/// represented here — they stay inside [`WorkerExit`] by design.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The requested worker count was zero.
    #[error("worker count must be at least 1 (got {0})")]
    InvalidWorkerCount(u32),

    /// Creating a worker failed (resource exhaustion, missing binary).
    #[error("failed to spawn worker {index}: {source}")]
    SpawnFailed {
        /// Slot index of the worker that could not be created.
        index: usize,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
}

/// Validated worker count, guaranteed >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerCount(u32);

impl WorkerCount {
    /// Validate a raw count. Zero is rejected rather than propagated into a
    /// degenerate zero-length spawn loop.
    pub fn new(n: u32) -> Result<Self, HarnessError> {
        if n == 0 {
            Err(HarnessError::InvalidWorkerCount(n))
        } else {
            Ok(Self(n))
        }
    }

    /// The underlying count.
    pub fn get(self) -> u32 {
        self.0
    }
}

/// Which concurrency primitive a harness uses for its workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessKind {
    /// One OS process per worker.
    Process,
    /// One thread per worker, sharing the address space.
    Thread,
}

impl HarnessKind {
    /// Plural noun used in the overall report line ("processes"/"threads").
    pub fn noun(self) -> &'static str {
        match self {
            HarnessKind::Process => "processes",
            HarnessKind::Thread => "threads",
        }
    }

    /// Suffix used in report file names ("Processes"/"Threads").
    pub fn file_suffix(self) -> &'static str {
        match self {
            HarnessKind::Process => "Processes",
            HarnessKind::Thread => "Threads",
        }
    }
}

impl std::fmt::Display for HarnessKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HarnessKind::Process => write!(f, "process"),
            HarnessKind::Thread => write!(f, "thread"),
        }
    }
}

/// One-way termination marker for a joined worker. No result payload is ever
/// carried back from a worker; a crashed worker is recorded, not propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerExit {
    /// Worker terminated normally.
    Clean,
    /// Worker crashed, panicked, or exited with a nonzero status.
    Abnormal {
        /// Human-readable description of the abnormal termination.
        detail: String,
    },
}

impl WorkerExit {
    /// Whether the worker terminated normally.
    pub fn is_clean(&self) -> bool {
        matches!(self, WorkerExit::Clean)
    }
}

/// Outcome of one fan-out/fan-in run.
#[derive(Debug)]
pub struct FanoutReport {
    /// Backend that produced this report.
    pub kind: HarnessKind,
    /// Number of workers spawned and joined.
    pub workers: u32,
    /// Wall-clock time from just before the first spawn to just after the
    /// last join.
    pub elapsed: Duration,
    /// Termination markers in slot order, one per worker.
    pub exits: Vec<WorkerExit>,
}

impl FanoutReport {
    /// Elapsed time in microseconds, the resolution of the report files.
    pub fn elapsed_micros(&self) -> u128 {
        self.elapsed.as_micros()
    }

    /// Number of workers that did not terminate cleanly.
    pub fn abnormal_exits(&self) -> usize {
        self.exits.iter().filter(|e| !e.is_clean()).count()
    }
}

/// A backend capable of spawning and joining one kind of worker.
///
/// Implementations must guarantee that `join` blocks only on its own target:
/// joining handle `i` must not depend on the state of any other worker, so
/// the ascending-index join loop in [`fan_out`] tolerates arbitrary
/// completion order without deadlock.
pub trait FanoutHarness {
    /// Opaque handle for one spawned worker, owned by the harness.
    type Handle;

    /// The concurrency primitive this backend uses.
    fn kind(&self) -> HarnessKind;

    /// Spawn the worker for slot `index`. An `Err` here is fatal to the run.
    fn spawn(&self, index: usize) -> std::io::Result<Self::Handle>;

    /// Block until the worker behind `handle` has terminated.
    fn join(&self, index: usize, handle: Self::Handle) -> WorkerExit;
}

/// Run one fan-out/fan-in cycle: spawn `workers` workers, join them all,
/// report elapsed wall-clock time.
///
/// The timing window spans the full critical path from first spawn to last
/// join, not per-worker time. Spawn failure aborts the run immediately;
/// workers already spawned at that point are left to finish on their own.
pub fn fan_out<H: FanoutHarness>(
    harness: &H,
    workers: WorkerCount,
) -> Result<FanoutReport, HarnessError> {
    let n = workers.get() as usize;
    let mut handles = Vec::with_capacity(n);

    let start = Instant::now();

    for index in 0..n {
        match harness.spawn(index) {
            Ok(handle) => handles.push(handle),
            Err(source) => return Err(HarnessError::SpawnFailed { index, source }),
        }
    }

    let mut exits = Vec::with_capacity(n);
    for (index, handle) in handles.into_iter().enumerate() {
        let exit = harness.join(index, handle);
        if let WorkerExit::Abnormal { detail } = &exit {
            tracing::warn!(index, %detail, "worker terminated abnormally");
        }
        exits.push(exit);
    }

    let elapsed = start.elapsed();

    Ok(FanoutReport {
        kind: harness.kind(),
        workers: workers.get(),
        elapsed,
        exits,
    })
}

/// Extract a readable message from a thread panic payload.
pub(crate) fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
