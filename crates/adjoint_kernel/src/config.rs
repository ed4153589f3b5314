//! Simulator configuration.
//!
//! Provides [`PreaccConfig`] for describing a simultaneous-preaccumulation
//! workload and [`SeedPolicy`] for selecting how per-tape seeds are
//! derived. Use the builder via [`PreaccConfig::builder()`].

use adjoint_core::Identifier;

use crate::error::ConfigError;

/// Per-tape seed derivation policy.
///
/// Both policies are deterministic with respect to the base seed, but they
/// use different derivation formulas and therefore produce different
/// workloads for the same base seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SeedPolicy {
    /// Derive all per-tape seeds once at construction from a single
    /// sequential seeded stream.
    ///
    /// This decouples the random stream from worker count and scheduling
    /// order: the multiset of generated tapes is identical for any number
    /// of workers. Default.
    #[default]
    Precomputed,

    /// Reseed from `base_seed + tape_index` inside the parallel region.
    ///
    /// Simpler and still reproducible, but a different derivation from
    /// `Precomputed`: the two policies produce different workloads for
    /// the same base seed.
    AdHoc,
}

/// Configuration of a simultaneous-preaccumulation workload.
///
/// Immutable after construction. All ranges are inclusive.
///
/// # Examples
///
/// ```rust
/// use adjoint_kernel::PreaccConfig;
///
/// let config = PreaccConfig::builder()
///     .n_preaccs(10_000)
///     .preacc_size_range(80, 120)
///     .n_eval_range(1, 10)
///     .identifier_range(1, 1000)
///     .seed(42)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.n_preaccs(), 10_000);
/// ```
#[derive(Clone, Debug)]
pub struct PreaccConfig {
    n_preaccs: usize,
    preacc_size_min: usize,
    preacc_size_max: usize,
    n_eval_min: usize,
    n_eval_max: usize,
    i_min: Identifier,
    i_max: Identifier,
    seed: u64,
    seed_policy: SeedPolicy,
}

impl PreaccConfig {
    /// Creates a new builder with the default workload (10 000 tapes of
    /// 80..=120 steps, 1..=10 evaluations each, identifiers in 1..=1000,
    /// seed 42).
    pub fn builder() -> PreaccConfigBuilder {
        PreaccConfigBuilder::default()
    }

    /// Validates the configuration ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_preaccs == 0 {
            return Err(ConfigError::NoPreaccumulations);
        }
        if self.preacc_size_min == 0 {
            return Err(ConfigError::ZeroPreaccSize);
        }
        if self.preacc_size_min > self.preacc_size_max {
            return Err(ConfigError::EmptySizeRange {
                min: self.preacc_size_min,
                max: self.preacc_size_max,
            });
        }
        if self.n_eval_min > self.n_eval_max {
            return Err(ConfigError::EmptyEvalRange {
                min: self.n_eval_min,
                max: self.n_eval_max,
            });
        }
        if self.i_min > self.i_max {
            return Err(ConfigError::EmptyIdentifierRange {
                i_min: self.i_min,
                i_max: self.i_max,
            });
        }
        Ok(())
    }

    /// Number of independent preaccumulations (tapes).
    #[inline]
    pub fn n_preaccs(&self) -> usize {
        self.n_preaccs
    }

    /// Inclusive lower bound of the tape size range.
    #[inline]
    pub fn preacc_size_min(&self) -> usize {
        self.preacc_size_min
    }

    /// Inclusive upper bound of the tape size range.
    #[inline]
    pub fn preacc_size_max(&self) -> usize {
        self.preacc_size_max
    }

    /// Inclusive lower bound of the per-tape evaluation count range.
    #[inline]
    pub fn n_eval_min(&self) -> usize {
        self.n_eval_min
    }

    /// Inclusive upper bound of the per-tape evaluation count range.
    #[inline]
    pub fn n_eval_max(&self) -> usize {
        self.n_eval_max
    }

    /// Inclusive lower bound of the identifier range.
    #[inline]
    pub fn i_min(&self) -> Identifier {
        self.i_min
    }

    /// Inclusive upper bound of the identifier range.
    #[inline]
    pub fn i_max(&self) -> Identifier {
        self.i_max
    }

    /// Base seed the whole workload derives from.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Per-tape seed derivation policy.
    #[inline]
    pub fn seed_policy(&self) -> SeedPolicy {
        self.seed_policy
    }
}

/// Builder for [`PreaccConfig`].
#[derive(Clone, Debug)]
pub struct PreaccConfigBuilder {
    n_preaccs: usize,
    preacc_size_min: usize,
    preacc_size_max: usize,
    n_eval_min: usize,
    n_eval_max: usize,
    i_min: Identifier,
    i_max: Identifier,
    seed: u64,
    seed_policy: SeedPolicy,
}

impl Default for PreaccConfigBuilder {
    fn default() -> Self {
        Self {
            n_preaccs: 10_000,
            preacc_size_min: 80,
            preacc_size_max: 120,
            n_eval_min: 1,
            n_eval_max: 10,
            i_min: 1,
            i_max: 1000,
            seed: 42,
            seed_policy: SeedPolicy::default(),
        }
    }
}

impl PreaccConfigBuilder {
    /// Sets the number of preaccumulations.
    pub fn n_preaccs(mut self, n: usize) -> Self {
        self.n_preaccs = n;
        self
    }

    /// Sets the inclusive tape size range.
    pub fn preacc_size_range(mut self, min: usize, max: usize) -> Self {
        self.preacc_size_min = min;
        self.preacc_size_max = max;
        self
    }

    /// Sets the inclusive per-tape evaluation count range.
    pub fn n_eval_range(mut self, min: usize, max: usize) -> Self {
        self.n_eval_min = min;
        self.n_eval_max = max;
        self
    }

    /// Sets the inclusive identifier range.
    pub fn identifier_range(mut self, i_min: Identifier, i_max: Identifier) -> Self {
        self.i_min = i_min;
        self.i_max = i_max;
        self
    }

    /// Sets the base seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the per-tape seed derivation policy.
    pub fn seed_policy(mut self, policy: SeedPolicy) -> Self {
        self.seed_policy = policy;
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any range is empty or a size is zero.
    pub fn build(self) -> Result<PreaccConfig, ConfigError> {
        let config = PreaccConfig {
            n_preaccs: self.n_preaccs,
            preacc_size_min: self.preacc_size_min,
            preacc_size_max: self.preacc_size_max,
            n_eval_min: self.n_eval_min,
            n_eval_max: self.n_eval_max,
            i_min: self.i_min,
            i_max: self.i_max,
            seed: self.seed,
            seed_policy: self.seed_policy,
        };
        config.validate()?;
        Ok(config)
    }
}
