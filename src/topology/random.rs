//! Uniform-random (Erdos-Renyi) connectivity.
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Uniform};

use crate::core::neuron::NeuronId;
use crate::core::synapse::Polarity;
use crate::core::topology::{Connector, Topology};
use crate::error::SNNError;
use crate::topology::DEFAULT_TOPOLOGY_DELAY;

/// Connects every ordered pair of distinct neurons independently with a fixed probability.
#[derive(Debug, Clone)]
pub struct RandomTopology {
    probability: f64,
    weight: f64,
    delay: f64,
    polarity: Polarity,
    rng: ChaCha8Rng,
}

impl RandomTopology {
    /// Create a new strategy.
    /// Returns an error if the connection probability is not in [0, 1].
    pub fn new(
        probability: f64,
        weight: f64,
        polarity: Polarity,
        seed: u64,
    ) -> Result<Self, SNNError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(SNNError::InvalidParameter(
                "The connection probability must be in [0, 1]".to_string(),
            ));
        }

        Ok(RandomTopology {
            probability,
            weight,
            delay: DEFAULT_TOPOLOGY_DELAY,
            polarity,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Set the delay of the created synapses.
    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl Topology for RandomTopology {
    fn name(&self) -> &str {
        "Random"
    }

    fn connect(
        &mut self,
        neurons: &[NeuronId],
        connector: &mut dyn Connector,
    ) -> Result<(), SNNError> {
        let unif = Uniform::new(0.0, 1.0);
        for (i, &pre_id) in neurons.iter().enumerate() {
            for (j, &post_id) in neurons.iter().enumerate() {
                if i == j {
                    continue;
                }
                if unif.sample(&mut self.rng) < self.probability {
                    connector.connect_with_polarity(
                        pre_id,
                        post_id,
                        self.polarity,
                        self.weight,
                        self.delay,
                    )?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::topology::testing::EdgeList;

    fn neuron_ids(n: usize) -> Vec<NeuronId> {
        (100..100 + n).collect()
    }

    #[test]
    fn test_invalid_probability() {
        assert!(RandomTopology::new(1.5, 1.0, Polarity::Excitatory, 0).is_err());
        assert!(RandomTopology::new(-0.1, 1.0, Polarity::Excitatory, 0).is_err());
        assert!(RandomTopology::new(f64::NAN, 1.0, Polarity::Excitatory, 0).is_err());
    }

    #[test]
    fn test_sparse_connectivity() {
        let neurons = neuron_ids(20);
        for seed in 0..10 {
            let mut topology = RandomTopology::new(0.1, 0.5, Polarity::Excitatory, seed).unwrap();
            let mut edges = EdgeList::default();
            topology.connect(&neurons, &mut edges).unwrap();

            assert!(!edges.edges.is_empty());
            assert!(edges.edges.len() < 20 * 19);
            assert!(edges.edges.iter().all(|edge| edge.0 != edge.1));
            assert!(edges
                .edges
                .iter()
                .all(|edge| edge.2 == Polarity::Excitatory && edge.3 == 0.5 && edge.4 == 1.0));
        }
    }

    #[test]
    fn test_extreme_probabilities() {
        let neurons = neuron_ids(20);

        let mut edges = EdgeList::default();
        RandomTopology::new(0.0, 1.0, Polarity::Excitatory, 7)
            .unwrap()
            .connect(&neurons, &mut edges)
            .unwrap();
        assert!(edges.edges.is_empty());

        let mut edges = EdgeList::default();
        RandomTopology::new(1.0, 1.0, Polarity::Inhibitory, 7)
            .unwrap()
            .connect(&neurons, &mut edges)
            .unwrap();
        assert_eq!(edges.edges.len(), 20 * 19);
        assert!(edges.edges.iter().all(|edge| edge.2 == Polarity::Inhibitory));
        for &id in neurons.iter() {
            assert_eq!(edges.out_degree(id), 19);
            assert_eq!(edges.in_degree(id), 19);
        }
    }

    #[test]
    fn test_reproducible_with_seed() {
        let neurons = neuron_ids(30);
        let sample = |seed: u64| {
            let mut edges = EdgeList::default();
            RandomTopology::new(0.2, 1.0, Polarity::Excitatory, seed)
                .unwrap()
                .with_delay(2.5)
                .connect(&neurons, &mut edges)
                .unwrap();
            edges.edges
        };
        assert_eq!(sample(42), sample(42));
        assert_ne!(sample(42), sample(43));
        assert!(sample(42).iter().all(|edge| edge.4 == 2.5));
    }

    #[test]
    fn test_single_neuron() {
        let mut edges = EdgeList::default();
        RandomTopology::new(1.0, 1.0, Polarity::Excitatory, 0)
            .unwrap()
            .connect(&neuron_ids(1), &mut edges)
            .unwrap();
        assert!(edges.edges.is_empty());
    }
}
