//! Command-line interface
//!
//! The launch contract is a single positional worker count; everything else
//! is an optional flag. The same binary doubles as the worker process: the
//! process harness re-executes it with the hidden `--sieve-worker` flag, and
//! worker mode is dispatched before any other initialization.

use crate::config::{Mode, SievebenchConfig};
use crate::harness::process::{ProcessHarness, WorkerInvocation};
use crate::harness::thread::ThreadHarness;
use crate::harness::{fan_out, FanoutReport, HarnessKind, WorkerCount};
use crate::report::ReportLayout;
use crate::sieve::DEFAULT_SIEVE_LIMIT;
use crate::work::{SieveWorkUnit, WorkUnit};
use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Sievebench CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "sievebench")]
#[command(version, about = "Process vs thread fan-out benchmark over a fixed prime sieve")]
pub struct Cli {
    /// Number of concurrent workers to spawn
    #[arg(required_unless_present = "sieve_worker")]
    pub workers: Option<u32>,

    /// Concurrency backend to benchmark
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Sieve upper bound for every worker
    #[arg(long)]
    pub limit: Option<usize>,

    /// Directory receiving the report files
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Give each worker its own report files instead of the shared paths
    #[arg(long)]
    pub unique_files: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Internal: run as a single sieve worker (used by the process harness)
    #[arg(long, hide = true)]
    pub sieve_worker: bool,

    /// Internal: worker slot index assigned by the harness
    #[arg(long, hide = true, default_value_t = 0)]
    pub worker_index: usize,
}

/// Parse arguments and run. This is the entry point for the binary.
pub fn run() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // The launch contract predates clap: wrong arguments exit 1, not
            // clap's usual 2. Help and version still exit 0.
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };
    run_with_cli(cli)
}

/// Run with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Worker mode first, before logging or config discovery.
    if cli.sieve_worker {
        return run_worker_mode(&cli);
    }

    init_logging(cli.verbose);

    let config = SievebenchConfig::discover().unwrap_or_default();

    let Some(raw_workers) = cli.workers else {
        anyhow::bail!("worker count is required");
    };
    let workers = WorkerCount::new(raw_workers)?;
    let mode = cli.mode.or(config.runner.mode).unwrap_or_default();
    let limit = cli.limit.unwrap_or(config.runner.limit);
    let directory = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.directory));
    let unique_files = cli.unique_files || config.output.unique_worker_files;

    tracing::info!(workers = workers.get(), ?mode, limit, "starting benchmark");

    let mut reports = Vec::new();
    for kind in mode.kinds() {
        let report = run_harness(kind, workers, limit, &directory, unique_files)?;
        println!(
            "{} fan-out: {} workers in {} microseconds",
            kind,
            report.workers,
            report.elapsed_micros()
        );
        if report.abnormal_exits() > 0 {
            println!(
                "  ({} of {} workers terminated abnormally)",
                report.abnormal_exits(),
                report.workers
            );
        }
        reports.push(report);
    }

    if let [process, thread] = &reports[..] {
        print_comparison(process, thread);
    }

    Ok(())
}

/// Run one harness end to end: open the overall report, fan out, record.
fn run_harness(
    kind: HarnessKind,
    workers: WorkerCount,
    limit: usize,
    directory: &Path,
    unique_files: bool,
) -> anyhow::Result<FanoutReport> {
    let layout = ReportLayout::new(directory.to_path_buf(), kind, unique_files);
    layout.ensure_directory().with_context(|| {
        format!("cannot create report directory {}", directory.display())
    })?;

    // Opened before the fan-out so a top-level report failure aborts the run
    // before any worker exists.
    let mut overall = layout.create_overall().with_context(|| {
        format!(
            "cannot open overall report {}",
            layout.overall_path().display()
        )
    })?;

    let report = match kind {
        HarnessKind::Process => {
            let invocation = WorkerInvocation::current(limit, &layout)?;
            fan_out(&ProcessHarness::new(invocation), workers)?
        }
        HarnessKind::Thread => {
            let unit = SieveWorkUnit::new(limit, layout.clone());
            fan_out(&ThreadHarness::new(unit), workers)?
        }
    };

    overall.record(&report).with_context(|| {
        format!(
            "cannot write overall report {}",
            layout.overall_path().display()
        )
    })?;

    tracing::debug!(
        kind = %report.kind,
        elapsed_us = report.elapsed_micros() as u64,
        abnormal = report.abnormal_exits(),
        "harness run complete"
    );

    Ok(report)
}

fn print_comparison(process: &FanoutReport, thread: &FanoutReport) {
    let process_us = process.elapsed_micros() as f64;
    let thread_us = thread.elapsed_micros() as f64;
    if process_us <= 0.0 || thread_us <= 0.0 {
        return;
    }
    if thread_us <= process_us {
        println!(
            "thread fan-out was {:.2}x faster than process fan-out",
            process_us / thread_us
        );
    } else {
        println!(
            "process fan-out was {:.2}x faster than thread fan-out",
            thread_us / process_us
        );
    }
}

/// Run as a single worker process: execute one work unit, then exit.
fn run_worker_mode(cli: &Cli) -> anyhow::Result<()> {
    // stdout is nulled by the parent; anything worth saying goes to stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter("sievebench=warn")
        .with_writer(std::io::stderr)
        .try_init();

    let directory = cli.output.clone().unwrap_or_else(|| PathBuf::from("."));
    let layout = ReportLayout::new(directory, HarnessKind::Process, cli.unique_files);
    let unit = SieveWorkUnit::new(cli.limit.unwrap_or(DEFAULT_SIEVE_LIMIT), layout);
    unit.execute(cli.worker_index);
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "sievebench=debug"
    } else {
        "sievebench=info"
    };
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
