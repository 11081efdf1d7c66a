//! Connectivity strategies.
//!
//! - [`random`]: every ordered pair of distinct neurons is connected with a fixed probability
//! - [`small_world`]: ring lattice with additive random shortcuts (Watts-Strogatz)
//! - [`scale_free`]: bidirectional preferential attachment (Barabasi-Albert)
//!
//! Every strategy owns a [`ChaCha8Rng`](rand_chacha::ChaCha8Rng) seeded at construction, so that
//! the generated graph only depends on the seed and the number of neurons.
pub mod random;
pub mod scale_free;
pub mod small_world;

/// Weight of the synapses created by the small-world and scale-free strategies.
pub const DEFAULT_TOPOLOGY_WEIGHT: f64 = 1.0;
/// Delay of the synapses created by all strategies, unless configured otherwise.
pub const DEFAULT_TOPOLOGY_DELAY: f64 = 1.0;
