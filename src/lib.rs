#![warn(missing_docs)]
//! Sievebench - process vs thread fan-out benchmark
//!
//! Measures the wall-clock overhead of two concurrency primitives by
//! spawning N workers of a chosen kind, each running one fixed CPU-bound
//! work unit (a prime sieve), and waiting for all of them to finish:
//!
//! - [`ProcessHarness`] runs each worker in its own OS process.
//! - [`ThreadHarness`] runs each worker as a thread in the current process.
//!
//! Both implement the [`FanoutHarness`] capability and are driven by the
//! shared [`fan_out`] loop, so the same timing and join semantics apply to
//! either backend. Workers are fire-and-forget: the harness collects only a
//! termination marker per worker, never a result payload.

pub mod cli;
pub mod config;
pub mod harness;
pub mod report;
pub mod sieve;
pub mod work;

pub use harness::process::{ProcessHarness, WorkerInvocation};
pub use harness::thread::ThreadHarness;
pub use harness::{
    fan_out, FanoutHarness, FanoutReport, HarnessError, HarnessKind, WorkerCount, WorkerExit,
};
pub use report::{OverallReport, ReportLayout};
pub use sieve::{primes_up_to, run_traced, DEFAULT_SIEVE_LIMIT};
pub use work::{SieveWorkUnit, WorkUnit};
