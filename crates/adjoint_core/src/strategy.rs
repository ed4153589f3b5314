//! Evaluation strategy dispatch.
//!
//! A [`Strategy`] names one of seven fixed combinations of storage backing
//! structure and remap policy. An [`Evaluator`] is the per-worker dispatch
//! context: it selects and sizes the storage for each evaluation, performs
//! the remap-on-first-use step for the remap strategies, and owns the
//! persistent buffer the persistent-vector strategies reuse across
//! evaluations and tapes.

use std::fmt;
use std::str::FromStr;

use crate::error::StrategyError;
use crate::storage::{
    AdjointStore, PersistentVector, PersistentVectorOffset, TemporaryMapOrdered,
    TemporaryMapUnordered, TemporaryVector,
};
use crate::tape::{RemapKind, Tape};

/// Tape evaluation strategies for preaccumulation.
///
/// Numeric tags follow the benchmark convention (0..=6).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Fresh vector per evaluation, direct indexing.
    TemporaryVector,
    /// Worker-persistent vector, direct indexing.
    PersistentVector,
    /// Worker-persistent vector, offset indexing.
    PersistentVectorOffset,
    /// Fresh key-ordered map per evaluation.
    TemporaryMapOrdered,
    /// Fresh hash map per evaluation.
    TemporaryMapUnordered,
    /// Identifier remap via ordered map cache, then fresh vector.
    TemporaryVectorOrderedRemap,
    /// Identifier remap via hash map cache, then fresh vector.
    TemporaryVectorUnorderedRemap,
}

impl Strategy {
    /// All seven strategies in tag order.
    pub const ALL: [Strategy; 7] = [
        Strategy::TemporaryVector,
        Strategy::PersistentVector,
        Strategy::PersistentVectorOffset,
        Strategy::TemporaryMapOrdered,
        Strategy::TemporaryMapUnordered,
        Strategy::TemporaryVectorOrderedRemap,
        Strategy::TemporaryVectorUnorderedRemap,
    ];

    /// Numeric tag of this strategy.
    pub fn tag(self) -> u8 {
        match self {
            Strategy::TemporaryVector => 0,
            Strategy::PersistentVector => 1,
            Strategy::PersistentVectorOffset => 2,
            Strategy::TemporaryMapOrdered => 3,
            Strategy::TemporaryMapUnordered => 4,
            Strategy::TemporaryVectorOrderedRemap => 5,
            Strategy::TemporaryVectorUnorderedRemap => 6,
        }
    }

    /// Stable kebab-case name, accepted by [`FromStr`] and the CLI.
    pub fn name(self) -> &'static str {
        match self {
            Strategy::TemporaryVector => "temporary-vector",
            Strategy::PersistentVector => "persistent-vector",
            Strategy::PersistentVectorOffset => "persistent-vector-offset",
            Strategy::TemporaryMapOrdered => "temporary-map-ordered",
            Strategy::TemporaryMapUnordered => "temporary-map-unordered",
            Strategy::TemporaryVectorOrderedRemap => "temporary-vector-ordered-remap",
            Strategy::TemporaryVectorUnorderedRemap => "temporary-vector-unordered-remap",
        }
    }
}

impl TryFrom<u8> for Strategy {
    type Error = StrategyError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.tag() == tag)
            .ok_or_else(|| StrategyError::UnknownStrategy {
                tag: tag.to_string(),
            })
    }
}

impl FromStr for Strategy {
    type Err = StrategyError;

    /// Parses either a numeric tag (`"1"`) or a name (`"persistent-vector"`).
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if let Ok(tag) = input.parse::<u8>() {
            return Strategy::try_from(tag);
        }
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == input)
            .ok_or_else(|| StrategyError::UnknownStrategy {
                tag: input.to_string(),
            })
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-worker evaluation context.
///
/// One `Evaluator` belongs to exactly one worker for the duration of a run.
/// It owns the persistent buffer as explicit worker-scoped state instead of
/// a hidden thread-local singleton, which keeps the "reused across
/// evaluations, never shared between workers" contract visible in the type
/// system: the evaluator is not `Sync` over its buffer borrows.
///
/// # Examples
///
/// ```rust
/// use adjoint_core::{Evaluator, Strategy, Tape};
///
/// let mut tape = Tape::generate(10, 20, 80, 42).unwrap();
/// let mut evaluator = Evaluator::new(Strategy::PersistentVector);
///
/// let result = evaluator.evaluate(&mut tape, 1.0);
/// assert!((result - tape.jacobian_product()).abs() < 1e-12);
///
/// evaluator.teardown();
/// ```
#[derive(Debug)]
pub struct Evaluator {
    strategy: Strategy,
    persistent: Vec<f64>,
}

impl Evaluator {
    /// Creates an evaluation context for the given strategy.
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            persistent: Vec::new(),
        }
    }

    /// The strategy this context dispatches to.
    #[inline]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Current length of the persistent buffer (zero for temporary
    /// strategies and after [`Evaluator::teardown`]).
    #[inline]
    pub fn persistent_len(&self) -> usize {
        self.persistent.len()
    }

    /// Evaluates `tape` under this context's strategy.
    ///
    /// Selects the storage variant, applies the strategy's sizing rule
    /// (`max + 1` for direct vectors, `max - min + 1` for the offset
    /// vector, none for maps), and for the remap strategies compresses
    /// the tape's identifiers on first use only: the tape's remap flag is
    /// the at-most-once cache, so repeated evaluations of the same tape
    /// skip the rewrite while a fresh tape always remaps.
    pub fn evaluate(&mut self, tape: &mut Tape, seed: f64) -> f64 {
        match self.strategy {
            Strategy::TemporaryVector => {
                let mut adjoints = TemporaryVector::new();
                adjoints.resize(tape.max_identifier() as usize + 1);
                tape.evaluate(&mut adjoints, seed)
            }
            Strategy::PersistentVector => {
                let mut adjoints = PersistentVector::new(&mut self.persistent);
                adjoints.resize(tape.max_identifier() as usize + 1);
                tape.evaluate(&mut adjoints, seed)
            }
            Strategy::PersistentVectorOffset => {
                let offset = tape.min_identifier();
                let mut adjoints = PersistentVectorOffset::new(&mut self.persistent, offset);
                adjoints.resize((tape.max_identifier() - offset) as usize + 1);
                tape.evaluate(&mut adjoints, seed)
            }
            Strategy::TemporaryMapOrdered => {
                let mut adjoints = TemporaryMapOrdered::new();
                tape.evaluate(&mut adjoints, seed)
            }
            Strategy::TemporaryMapUnordered => {
                let mut adjoints = TemporaryMapUnordered::new();
                tape.evaluate(&mut adjoints, seed)
            }
            Strategy::TemporaryVectorOrderedRemap => {
                self.evaluate_remapped(tape, seed, RemapKind::Ordered)
            }
            Strategy::TemporaryVectorUnorderedRemap => {
                self.evaluate_remapped(tape, seed, RemapKind::Unordered)
            }
        }
    }

    fn evaluate_remapped(&mut self, tape: &mut Tape, seed: f64, kind: RemapKind) -> f64 {
        if !tape.is_remapped() {
            tape.remap_identifiers(kind);
        }
        let mut adjoints = TemporaryVector::new();
        adjoints.resize(tape.max_identifier() as usize + 1);
        tape.evaluate(&mut adjoints, seed)
    }

    /// Releases the persistent buffer.
    ///
    /// Invoked exactly once per worker after all of the worker's
    /// evaluations finish; a no-op for the temporary strategies. The
    /// evaluator stays usable afterwards, the buffer simply regrows on
    /// demand.
    pub fn teardown(&mut self) {
        self.persistent = Vec::new();
    }
}
