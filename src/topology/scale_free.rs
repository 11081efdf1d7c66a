//! Scale-free (Barabasi-Albert) connectivity.
//!
//! The first `initial_nodes` neurons form a fully connected core. Every later neuron then attaches
//! to earlier neurons, each target being drawn with a probability proportional to its degree.
//! All edges are bidirectional.
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::neuron::NeuronId;
use crate::core::topology::{Connector, Topology};
use crate::error::SNNError;
use crate::topology::{DEFAULT_TOPOLOGY_DELAY, DEFAULT_TOPOLOGY_WEIGHT};

#[derive(Debug, Clone)]
pub struct ScaleFreeTopology {
    initial_nodes: usize,
    connections_per_new_node: usize,
    weight: f64,
    delay: f64,
    rng: ChaCha8Rng,
}

impl ScaleFreeTopology {
    pub fn new(initial_nodes: usize, connections_per_new_node: usize, seed: u64) -> Self {
        ScaleFreeTopology {
            initial_nodes,
            connections_per_new_node,
            weight: DEFAULT_TOPOLOGY_WEIGHT,
            delay: DEFAULT_TOPOLOGY_DELAY,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Set the weight and delay of the created synapses.
    pub fn with_synapses(mut self, weight: f64, delay: f64) -> Self {
        self.weight = weight;
        self.delay = delay;
        self
    }

    /// Draw a position in `eligible` with probability proportional to the degree of the node.
    /// `total_degree` must be the (positive) sum of the degrees of the eligible nodes.
    fn select_preferentially(
        &mut self,
        eligible: &[usize],
        degrees: &[usize],
        total_degree: usize,
    ) -> usize {
        let draw = self.rng.gen::<f64>() * total_degree as f64;
        let mut cumulative = 0.0;
        for (position, &node) in eligible.iter().enumerate() {
            cumulative += degrees[node] as f64;
            if degrees[node] > 0 && cumulative >= draw {
                return position;
            }
        }
        // Rounding: fall back on the last node with a positive degree.
        eligible
            .iter()
            .rposition(|&node| degrees[node] > 0)
            .unwrap_or(eligible.len() - 1)
    }
}

impl Topology for ScaleFreeTopology {
    fn name(&self) -> &str {
        "ScaleFree"
    }

    fn connect(
        &mut self,
        neurons: &[NeuronId],
        connector: &mut dyn Connector,
    ) -> Result<(), SNNError> {
        let n = neurons.len();
        let m = self.initial_nodes;
        if m >= n {
            return Err(SNNError::IncompatibleTopology(format!(
                "the initial core ({} neurons) must be smaller than the network ({} neurons)",
                m, n
            )));
        }

        for i in 0..m {
            for j in i + 1..m {
                connector.connect_excitatory(neurons[i], neurons[j], self.weight, self.delay)?;
                connector.connect_excitatory(neurons[j], neurons[i], self.weight, self.delay)?;
            }
        }

        let mut degrees = vec![0_usize; n];
        degrees[..m].fill(m.saturating_sub(1));

        for i in m..n {
            let mut eligible: Vec<usize> = (0..i).collect();
            let mut num_connections = 0;

            while num_connections < self.connections_per_new_node && !eligible.is_empty() {
                let total_degree: usize = eligible.iter().map(|&node| degrees[node]).sum();
                if total_degree == 0 {
                    debug!(
                        "No eligible neuron with a positive degree left for neuron {}",
                        neurons[i]
                    );
                    break;
                }

                let position = self.select_preferentially(&eligible, &degrees, total_degree);
                let target = eligible.remove(position);

                connector.connect_excitatory(neurons[i], neurons[target], self.weight, self.delay)?;
                connector.connect_excitatory(neurons[target], neurons[i], self.weight, self.delay)?;
                degrees[i] += 1;
                degrees[target] += 1;
                num_connections += 1;
            }
        }

        Ok(())
    }
}
