//! Construction of networks from a [`NetworkConfig`].
//!
//! The network gets `floor(total_neurons * excitatory_ratio)` regular spiking Izhikevich neurons
//! followed by `floor(total_neurons * inhibitory_ratio)` fast spiking ones. The selected strategy is
//! then applied twice over all neurons: an excitatory pass and an inhibitory pass, each with its
//! own seed derived from the configuration seed.
use log::{debug, info};

use crate::config::{ConnectivityParams, NetworkConfig};
use crate::core::network::Network;
use crate::core::neuron::NeuronParams;
use crate::core::synapse::Polarity;
use crate::core::topology::{Topology, TopologyKind};
use crate::error::SNNError;
use crate::models::izhikevich::IzhikevichParams;
use crate::recorder::Recorder;
use crate::topology::random::RandomTopology;
use crate::topology::scale_free::ScaleFreeTopology;
use crate::topology::small_world::SmallWorldTopology;

impl<R: Recorder> Network<R> {
    /// Build a network from a configuration.
    /// Returns an error if the strategy is unknown or incompatible with the number of neurons.
    ///
    /// # Examples
    ///
    /// ```
    /// use plastic_snn::config::NetworkConfig;
    /// use plastic_snn::core::network::Network;
    /// use plastic_snn::recorder::MemoryRecorder;
    ///
    /// let config = NetworkConfig {
    ///     total_neurons: 20,
    ///     ..NetworkConfig::default()
    /// };
    /// let network = Network::from_config(&config, MemoryRecorder::new()).unwrap();
    /// assert_eq!(network.num_neurons(), 20);
    /// ```
    pub fn from_config(config: &NetworkConfig, recorder: R) -> Result<Self, SNNError> {
        let kind = config.topology_kind()?;
        let passes = connectivity_passes(config, kind)?;

        let num_excitatory = (config.total_neurons as f64 * config.excitatory_ratio) as usize;
        let num_inhibitory = (config.total_neurons as f64 * config.inhibitory_ratio) as usize;

        let mut network = Network::new(recorder);
        network.create_neurons(
            num_excitatory,
            &NeuronParams::Izhikevich(IzhikevichParams::regular_spiking()),
        );
        network.create_neurons(
            num_inhibitory,
            &NeuronParams::Izhikevich(IzhikevichParams::fast_spiking()),
        );
        debug!(
            "Created {} excitatory and {} inhibitory neurons",
            num_excitatory,
            num_inhibitory
        );

        for topology in passes {
            network.set_topology(topology);
            network.apply_topology()?;
        }

        info!(
            "Built a {} network with {} neurons and {} synapses",
            kind,
            network.num_neurons(),
            network.num_synapses()
        );
        Ok(network)
    }
}

/// The excitatory and inhibitory passes of the selected strategy.
fn connectivity_passes(
    config: &NetworkConfig,
    kind: TopologyKind,
) -> Result<Vec<Box<dyn Topology>>, SNNError> {
    let seeds = [config.seed, config.seed.wrapping_add(1)];

    let passes: Vec<Box<dyn Topology>> = match kind {
        TopologyKind::Random => {
            let connectivity = [
                &config.excitatory_connectivity,
                &config.inhibitory_connectivity,
            ];
            connectivity
                .into_iter()
                .zip(seeds)
                .map(|(params, seed)| random_pass(params, seed))
                .collect::<Result<_, _>>()?
        }
        TopologyKind::SmallWorld => seeds
            .into_iter()
            .map(|seed| {
                SmallWorldTopology::new(
                    config.small_world.rewiring_probability,
                    config.small_world.connections_per_neuron,
                    seed,
                )
                .map(|topology| Box::new(topology) as Box<dyn Topology>)
            })
            .collect::<Result<_, _>>()?,
        TopologyKind::ScaleFree => seeds
            .into_iter()
            .map(|seed| {
                Box::new(ScaleFreeTopology::new(
                    config.scale_free.initial_nodes,
                    config.scale_free.connections_per_new_node,
                    seed,
                )) as Box<dyn Topology>
            })
            .collect(),
    };

    Ok(passes)
}

fn random_pass(params: &ConnectivityParams, seed: u64) -> Result<Box<dyn Topology>, SNNError> {
    let topology = RandomTopology::new(
        params.connection_probability,
        params.default_weight,
        Polarity::from(params.excitatory),
        seed,
    )?;
    Ok(Box::new(topology))
}
