//! Benchmark CLI for adjoint storage strategies.
//!
//! Runs simultaneous preaccumulations under one of the seven adjoint
//! storage strategies and prints a single measurement row:
//!
//! ```text
//! [strategy] [threads] [warmups] [runs] [avg time] [min time] [max time] [memory hwm] [checksum]
//! ```
//!
//! Set the worker count via `RAYON_NUM_THREADS`; it defaults to the number
//! of logical CPUs.

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use adjoint_core::Strategy;
use adjoint_kernel::{PreaccConfig, PreaccSimulator, SeedPolicy};

mod bench;
mod memory;

use bench::Benchmark;

/// Benchmark simultaneous preaccumulations over adjoint storage strategies.
#[derive(Parser)]
#[command(name = "adjoint-bench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Evaluation strategy: numeric tag 0-6 or name
    /// (temporary-vector, persistent-vector, persistent-vector-offset,
    /// temporary-map-ordered, temporary-map-unordered,
    /// temporary-vector-ordered-remap, temporary-vector-unordered-remap)
    #[arg(short, long)]
    strategy: Strategy,

    /// Number of preaccumulations
    #[arg(long, default_value_t = 10_000)]
    n_preaccs: usize,

    /// Minimum size of preaccumulations
    #[arg(long, default_value_t = 80)]
    preacc_size_min: usize,

    /// Maximum size of preaccumulations
    #[arg(long, default_value_t = 120)]
    preacc_size_max: usize,

    /// Minimum number of evaluations per preaccumulation
    #[arg(long, default_value_t = 1)]
    n_eval_min: usize,

    /// Maximum number of evaluations per preaccumulation
    #[arg(long, default_value_t = 10)]
    n_eval_max: usize,

    /// Minimum identifier
    #[arg(long, default_value_t = 1)]
    i_min: u32,

    /// Maximum identifier
    #[arg(long, default_value_t = 1000)]
    i_max: u32,

    /// Number of discarded warmup runs
    #[arg(long, default_value_t = 1)]
    n_warmups: usize,

    /// Number of measured benchmark runs
    #[arg(long, default_value_t = 10)]
    n_runs: usize,

    /// Random seed; the generated workload is deterministic w.r.t. this seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Derive per-tape seeds ad hoc from seed + index instead of
    /// precomputing them (the precomputed default is worker-count
    /// independent)
    #[arg(long)]
    ad_hoc_seeds: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let seed_policy = if cli.ad_hoc_seeds {
        SeedPolicy::AdHoc
    } else {
        SeedPolicy::Precomputed
    };

    let config = PreaccConfig::builder()
        .n_preaccs(cli.n_preaccs)
        .preacc_size_range(cli.preacc_size_min, cli.preacc_size_max)
        .n_eval_range(cli.n_eval_min, cli.n_eval_max)
        .identifier_range(cli.i_min, cli.i_max)
        .seed(cli.seed)
        .seed_policy(seed_policy)
        .build()?;

    let simulator = PreaccSimulator::new(config)?;

    info!(
        strategy = %cli.strategy,
        threads = rayon::current_num_threads(),
        cpus = num_cpus::get(),
        "benchmarking simultaneous preaccumulations"
    );

    let data = Benchmark::new(cli.n_warmups, cli.n_runs).run(&simulator, cli.strategy)?;
    println!("{:>5}{}", cli.strategy.tag(), data);

    Ok(())
}
