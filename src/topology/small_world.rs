//! Small-world (Watts-Strogatz) connectivity.
//!
//! Neurons are placed on a ring and every neuron is connected in both directions to its `k / 2`
//! successors. Then, for every local edge, a random shortcut is added with the rewiring
//! probability. Shortcuts come on top of the lattice: no lattice edge is ever removed.
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Uniform};

use crate::core::neuron::NeuronId;
use crate::core::topology::{Connector, Topology};
use crate::error::SNNError;
use crate::topology::{DEFAULT_TOPOLOGY_DELAY, DEFAULT_TOPOLOGY_WEIGHT};

#[derive(Debug, Clone)]
pub struct SmallWorldTopology {
    rewiring_probability: f64,
    /// Number of ring neighbors per neuron, half on each side.
    k: usize,
    weight: f64,
    delay: f64,
    rng: ChaCha8Rng,
}

impl SmallWorldTopology {
    /// Create a new strategy with `connections_per_neuron` ring neighbors.
    /// Returns an error if the rewiring probability is not in [0, 1] or the number of neighbors is odd.
    pub fn new(
        rewiring_probability: f64,
        connections_per_neuron: usize,
        seed: u64,
    ) -> Result<Self, SNNError> {
        if !(0.0..=1.0).contains(&rewiring_probability) {
            return Err(SNNError::InvalidParameter(
                "The rewiring probability must be in [0, 1]".to_string(),
            ));
        }
        if connections_per_neuron % 2 != 0 {
            return Err(SNNError::InvalidParameter(
                "The number of connections per neuron must be even".to_string(),
            ));
        }

        Ok(SmallWorldTopology {
            rewiring_probability,
            k: connections_per_neuron,
            weight: DEFAULT_TOPOLOGY_WEIGHT,
            delay: DEFAULT_TOPOLOGY_DELAY,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Set the weight and delay of the created synapses.
    pub fn with_synapses(mut self, weight: f64, delay: f64) -> Self {
        self.weight = weight;
        self.delay = delay;
        self
    }
}

impl Topology for SmallWorldTopology {
    fn name(&self) -> &str {
        "SmallWorld"
    }

    fn connect(
        &mut self,
        neurons: &[NeuronId],
        connector: &mut dyn Connector,
    ) -> Result<(), SNNError> {
        let n = neurons.len();
        if n == 0 {
            return Ok(());
        }

        for i in 0..n {
            for j in 1..=self.k / 2 {
                let target = (i + j) % n;
                if target == i {
                    continue;
                }
                connector.connect_excitatory(neurons[i], neurons[target], self.weight, self.delay)?;
                connector.connect_excitatory(neurons[target], neurons[i], self.weight, self.delay)?;
            }
        }

        let unif = Uniform::new(0.0, 1.0);
        for i in 0..n {
            for _ in 1..=self.k / 2 {
                if unif.sample(&mut self.rng) < self.rewiring_probability {
                    let target = self.rng.gen_range(0..n);
                    if target != i {
                        connector.connect_excitatory(
                            neurons[i],
                            neurons[target],
                            self.weight,
                            self.delay,
                        )?;
                    }
                }
            }
        }

        Ok(())
    }
}
