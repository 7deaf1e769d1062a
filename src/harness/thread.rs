//! Thread fan-out backend
//!
//! Workers are OS threads in the current process. The work unit keeps every
//! piece of mutable state (the composite-flag array, timing, file handles)
//! thread-local, so no locks or atomics appear anywhere in this backend.
//!
//! Thread creation goes through `std::thread::Builder` so that a spawn
//! failure surfaces as an `io::Error` (fatal to the run) instead of a panic.
//! A worker that panics internally still terminates, so the join loop never
//! hangs; the panic is recorded as an abnormal exit and nothing more.

use crate::harness::{panic_message, FanoutHarness, HarnessKind, WorkerExit};
use crate::work::WorkUnit;
use std::sync::Arc;
use std::thread::JoinHandle;

/// Fan-out harness spawning one thread per worker.
///
/// Generic over the work unit so the harness contract can be exercised with
/// synthetic work in tests; production code uses [`crate::SieveWorkUnit`].
pub struct ThreadHarness<W> {
    work: Arc<W>,
}

impl<W> ThreadHarness<W> {
    /// Create a harness whose workers all run `work` exactly once.
    pub fn new(work: W) -> Self {
        Self {
            work: Arc::new(work),
        }
    }
}

impl<W: WorkUnit + Send + Sync + 'static> FanoutHarness for ThreadHarness<W> {
    type Handle = JoinHandle<()>;

    fn kind(&self) -> HarnessKind {
        HarnessKind::Thread
    }

    fn spawn(&self, index: usize) -> std::io::Result<Self::Handle> {
        let work = Arc::clone(&self.work);
        std::thread::Builder::new()
            .name(format!("sieve-worker-{index}"))
            .spawn(move || work.execute(index))
    }

    fn join(&self, _index: usize, handle: Self::Handle) -> WorkerExit {
        match handle.join() {
            Ok(()) => WorkerExit::Clean,
            Err(panic) => WorkerExit::Abnormal {
                detail: panic_message(panic),
            },
        }
    }
}
