//! Simultaneous preaccumulation simulator.
//!
//! Emulates many independent local preaccumulations running in parallel
//! workers, the way they would inside a reverse-mode AD engine evaluating
//! a large computation. Each tape index owns a deterministic seed from
//! which its tape size, contents, and evaluation count are drawn, so the
//! workload is identical regardless of how the indices are distributed
//! over workers.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use adjoint_core::{Evaluator, Strategy, Tape};

use crate::config::PreaccConfig;
use crate::error::ConfigError;
use crate::seeds::SeedPlan;

/// The per-tape random draws, in stream order.
///
/// `size` is drawn before `n_eval` from one continuing stream seeded with
/// `tape_seed`; the tape itself is generated from `tape_seed` on a stream
/// of its own. Changing this order changes the workload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreaccDraw {
    /// Seed owned by this tape index.
    pub tape_seed: u64,
    /// Number of recorded tape steps.
    pub size: usize,
    /// Number of evaluations of this tape.
    pub n_eval: usize,
}

/// Simulator for simultaneous preaccumulations.
///
/// # Examples
///
/// ```rust
/// use adjoint_core::Strategy;
/// use adjoint_kernel::{PreaccConfig, PreaccSimulator};
///
/// let config = PreaccConfig::builder()
///     .n_preaccs(100)
///     .preacc_size_range(8, 12)
///     .n_eval_range(1, 4)
///     .identifier_range(1, 100)
///     .seed(42)
///     .build()
///     .unwrap();
///
/// let simulator = PreaccSimulator::new(config).unwrap();
/// let checksum = simulator.run(Strategy::PersistentVector, 1.0);
/// assert!(checksum.is_finite());
/// ```
#[derive(Clone, Debug)]
pub struct PreaccSimulator {
    config: PreaccConfig,
    seeds: SeedPlan,
}

impl PreaccSimulator {
    /// Creates a simulator, validating the configuration and building the
    /// per-tape seed plan.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn new(config: PreaccConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seeds = SeedPlan::build(config.seed_policy(), config.seed(), config.n_preaccs());
        Ok(Self { config, seeds })
    }

    /// The simulator configuration.
    #[inline]
    pub fn config(&self) -> &PreaccConfig {
        &self.config
    }

    /// The random draws owned by tape `index`.
    ///
    /// Pure with respect to the simulator: repeated calls from any thread
    /// return the same draws. This is the anchor of the thread-count
    /// independence property.
    pub fn draw(&self, index: usize) -> PreaccDraw {
        let tape_seed = self.seeds.seed_for(index);
        let mut stream = StdRng::seed_from_u64(tape_seed);
        let size = stream.gen_range(self.config.preacc_size_min()..=self.config.preacc_size_max());
        let n_eval = stream.gen_range(self.config.n_eval_min()..=self.config.n_eval_max());
        PreaccDraw {
            tape_seed,
            size,
            n_eval,
        }
    }

    /// Generates the tape owned by `index`, mimicking the recording phase
    /// of a preaccumulation.
    pub fn generate_tape(&self, index: usize) -> Tape {
        let draw = self.draw(index);
        // The configured ranges were validated at construction.
        Tape::generate(
            draw.size,
            self.config.i_min(),
            self.config.i_max(),
            draw.tape_seed,
        )
        .expect("configuration validated at construction")
    }

    /// Runs all preaccumulations under the given strategy and reduces
    /// every evaluation's scalar result into a single checksum.
    ///
    /// Tape indices are partitioned dynamically over the current rayon
    /// pool via a shared work counter. Each worker owns one
    /// [`Evaluator`] for its entire lifetime (the persistent-vector
    /// buffer is never shared between workers) and invokes
    /// [`Evaluator::teardown`] exactly once after its share of the loop
    /// drains. The reduction is a commutative sum of per-worker partials;
    /// its floating-point rounding may differ across worker counts.
    pub fn run(&self, strategy: Strategy, seed: f64) -> f64 {
        debug!(
            strategy = %strategy,
            n_preaccs = self.config.n_preaccs(),
            "running simultaneous preaccumulations"
        );

        let next_index = AtomicUsize::new(0);
        let n_preaccs = self.config.n_preaccs();

        let partials = rayon::broadcast(|context| {
            let mut evaluator = Evaluator::new(strategy);
            let mut partial = 0.0;
            let mut processed = 0usize;

            loop {
                let index = next_index.fetch_add(1, Ordering::Relaxed);
                if index >= n_preaccs {
                    break;
                }
                partial += self.preaccumulate(index, &mut evaluator, seed);
                processed += 1;
            }

            evaluator.teardown();
            trace!(worker = context.index(), processed, "worker drained");
            partial
        });

        partials.into_iter().sum()
    }

    /// Generates and repeatedly evaluates the tape owned by `index`,
    /// returning the sum of its evaluation results.
    ///
    /// The per-repetition seed is perturbed by `0.1 * sin(eval_index)` so
    /// repeated evaluations of one tape do not degenerate into identical
    /// arithmetic while staying deterministic.
    fn preaccumulate(&self, index: usize, evaluator: &mut Evaluator, seed: f64) -> f64 {
        let draw = self.draw(index);
        let mut tape = self.generate_tape(index);

        let mut sum = 0.0;
        for eval_index in 0..draw.n_eval {
            let perturbed = seed + 0.1 * (eval_index as f64).sin();
            sum += evaluator.evaluate(&mut tape, perturbed);
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeedPolicy;
    use approx::assert_relative_eq;

    fn small_config() -> PreaccConfig {
        PreaccConfig::builder()
            .n_preaccs(200)
            .preacc_size_range(8, 16)
            .n_eval_range(1, 5)
            .identifier_range(1, 200)
            .seed(42)
            .build()
            .unwrap()
    }

    /// The checksum every strategy must reproduce, computed sequentially
    /// from first principles.
    fn expected_checksum(simulator: &PreaccSimulator, seed: f64) -> f64 {
        let mut sum = 0.0;
        for index in 0..simulator.config().n_preaccs() {
            let draw = simulator.draw(index);
            let tape = simulator.generate_tape(index);
            let product = tape.jacobian_product();
            for eval_index in 0..draw.n_eval {
                sum += (seed + 0.1 * (eval_index as f64).sin()) * product;
            }
        }
        sum
    }

    #[test]
    fn test_draw_deterministic() {
        let simulator = PreaccSimulator::new(small_config()).unwrap();
        for index in [0, 7, 199] {
            assert_eq!(simulator.draw(index), simulator.draw(index));
        }
    }

    #[test]
    fn test_draw_ranges_respected() {
        let simulator = PreaccSimulator::new(small_config()).unwrap();
        for index in 0..200 {
            let draw = simulator.draw(index);
            assert!((8..=16).contains(&draw.size));
            assert!((1..=5).contains(&draw.n_eval));
        }
    }

    #[test]
    fn test_generate_tape_deterministic() {
        let simulator = PreaccSimulator::new(small_config()).unwrap();
        let a = simulator.generate_tape(13);
        let b = simulator.generate_tape(13);
        assert_eq!(a.identifiers(), b.identifiers());
        assert_eq!(a.jacobians(), b.jacobians());
    }

    #[test]
    fn test_run_matches_first_principles_for_all_strategies() {
        let simulator = PreaccSimulator::new(small_config()).unwrap();
        let expected = expected_checksum(&simulator, 1.0);

        for strategy in Strategy::ALL {
            let checksum = simulator.run(strategy, 1.0);
            assert_relative_eq!(checksum, expected, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_run_repeatable() {
        let simulator = PreaccSimulator::new(small_config()).unwrap();
        let a = simulator.run(Strategy::PersistentVector, 1.0);
        let b = simulator.run(Strategy::PersistentVector, 1.0);
        assert_relative_eq!(a, b, max_relative = 1e-9);
    }

    #[test]
    fn test_ad_hoc_policy_runs() {
        let config = PreaccConfig::builder()
            .n_preaccs(50)
            .preacc_size_range(4, 8)
            .n_eval_range(1, 3)
            .identifier_range(1, 64)
            .seed(42)
            .seed_policy(SeedPolicy::AdHoc)
            .build()
            .unwrap();
        let simulator = PreaccSimulator::new(config).unwrap();
        let expected = expected_checksum(&simulator, 1.0);
        let checksum = simulator.run(Strategy::TemporaryMapUnordered, 1.0);
        assert_relative_eq!(checksum, expected, max_relative = 1e-9);
    }

    #[test]
    fn test_policies_generate_different_workloads() {
        let precomputed = PreaccSimulator::new(small_config()).unwrap();
        let ad_hoc = PreaccSimulator::new(
            PreaccConfig::builder()
                .n_preaccs(200)
                .preacc_size_range(8, 16)
                .n_eval_range(1, 5)
                .identifier_range(1, 200)
                .seed(42)
                .seed_policy(SeedPolicy::AdHoc)
                .build()
                .unwrap(),
        )
        .unwrap();

        let differs = (0..200).any(|i| precomputed.draw(i) != ad_hoc.draw(i));
        assert!(differs);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PreaccConfig::builder().identifier_range(9, 3).build();
        assert!(config.is_err());
    }
}
