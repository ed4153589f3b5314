//! Wall-clock benchmark harness.
//!
//! Wraps repeated [`PreaccSimulator::run`] invocations: a number of
//! discarded warmup runs followed by measured runs whose wall-clock times
//! are aggregated into mean/min/max. Checksums of all runs (warmups
//! included) are accumulated so the compiler cannot elide any work and so
//! strategies can be cross-checked from the output.

use std::fmt;
use std::time::Instant;

use anyhow::Context;
use tracing::info;

use adjoint_core::Strategy;
use adjoint_kernel::PreaccSimulator;

use crate::memory;

/// Aggregated measurements of one benchmarked strategy.
#[derive(Clone, Copy, Debug)]
pub struct PerformanceData {
    /// Number of worker threads used.
    pub n_threads: usize,
    /// Number of discarded warmup runs.
    pub n_warmups: usize,
    /// Number of measured runs.
    pub n_runs: usize,
    /// Mean wall-clock time per run, seconds.
    pub runtime_avg: f64,
    /// Fastest run, seconds.
    pub runtime_min: f64,
    /// Slowest run, seconds.
    pub runtime_max: f64,
    /// Process memory high-water mark after the runs, MB.
    pub memory_hwm_mb: f64,
    /// Sum of all runs' checksums (warmups included).
    pub checksum: f64,
}

impl fmt::Display for PerformanceData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>5}{:>5}{:>5}{:>16.6e}{:>16.6e}{:>16.6e}{:>16.3}{:>16.6e}",
            self.n_threads,
            self.n_warmups,
            self.n_runs,
            self.runtime_avg,
            self.runtime_min,
            self.runtime_max,
            self.memory_hwm_mb,
            self.checksum
        )
    }
}

/// Benchmark of simultaneous preaccumulations.
#[derive(Clone, Copy, Debug)]
pub struct Benchmark {
    n_warmups: usize,
    n_runs: usize,
}

impl Benchmark {
    /// Creates a benchmark with the given warmup and measured run counts.
    pub fn new(n_warmups: usize, n_runs: usize) -> Self {
        Self { n_warmups, n_runs }
    }

    /// Benchmarks the simulator under one strategy.
    pub fn run(
        &self,
        simulator: &PreaccSimulator,
        strategy: Strategy,
    ) -> anyhow::Result<PerformanceData> {
        let mut checksum = 0.0;

        for warmup in 0..self.n_warmups {
            checksum += simulator.run(strategy, 1.0);
            info!(strategy = %strategy, warmup, "warmup run complete");
        }

        let mut runtime_avg = 0.0;
        let mut runtime_min = f64::MAX;
        let mut runtime_max = 0.0f64;

        for run in 0..self.n_runs {
            let start = Instant::now();
            checksum += simulator.run(strategy, 1.0);
            let elapsed = start.elapsed().as_secs_f64();

            runtime_avg = (runtime_avg * run as f64 + elapsed) / (run + 1) as f64;
            runtime_min = runtime_min.min(elapsed);
            runtime_max = runtime_max.max(elapsed);
            info!(strategy = %strategy, run, elapsed, "measured run complete");
        }

        let memory_hwm_mb =
            memory::high_water_mark_mb().context("reading process memory high-water mark")?;

        Ok(PerformanceData {
            n_threads: rayon::current_num_threads(),
            n_warmups: self.n_warmups,
            n_runs: self.n_runs,
            runtime_avg,
            runtime_min,
            runtime_max,
            memory_hwm_mb,
            checksum,
        })
    }
}
