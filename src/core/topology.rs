//! Interfaces of connectivity strategies.
//!
//! A [`Topology`] decides which pairs of neurons get connected, and a [`Connector`] (typically
//! the network) creates the corresponding synapses. Strategies only see neuron IDs, in creation
//! order, so they are independent of the neuron models and of the simulation.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::neuron::NeuronId;
use crate::core::synapse::{Polarity, SynapseId};
use crate::error::SNNError;

/// Something able to create synapses between neurons.
pub trait Connector {
    /// Create an excitatory synapse from `pre_id` to `post_id`.
    fn connect_excitatory(
        &mut self,
        pre_id: NeuronId,
        post_id: NeuronId,
        weight: f64,
        delay: f64,
    ) -> Result<SynapseId, SNNError>;

    /// Create an inhibitory synapse from `pre_id` to `post_id`.
    fn connect_inhibitory(
        &mut self,
        pre_id: NeuronId,
        post_id: NeuronId,
        weight: f64,
        delay: f64,
    ) -> Result<SynapseId, SNNError>;

    fn connect_with_polarity(
        &mut self,
        pre_id: NeuronId,
        post_id: NeuronId,
        polarity: Polarity,
        weight: f64,
        delay: f64,
    ) -> Result<SynapseId, SNNError> {
        match polarity {
            Polarity::Excitatory => self.connect_excitatory(pre_id, post_id, weight, delay),
            Polarity::Inhibitory => self.connect_inhibitory(pre_id, post_id, weight, delay),
        }
    }
}

/// A connectivity strategy.
pub trait Topology {
    /// A short name used in logs.
    fn name(&self) -> &str;

    /// Create synapses among `neurons` through the connector.
    /// Positions in the slice play the role of node indices; applying a strategy only adds
    /// synapses, it never removes any.
    fn connect(
        &mut self,
        neurons: &[NeuronId],
        connector: &mut dyn Connector,
    ) -> Result<(), SNNError>;
}

/// Selector of a connectivity strategy.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum TopologyKind {
    /// Independent directed edges with a fixed probability.
    Random,
    /// Ring lattice with random shortcuts (Watts-Strogatz).
    SmallWorld,
    /// Preferential attachment (Barabasi-Albert).
    ScaleFree,
}

impl FromStr for TopologyKind {
    type Err = SNNError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Random" => Ok(TopologyKind::Random),
            "SmallWorld" => Ok(TopologyKind::SmallWorld),
            "ScaleFree" => Ok(TopologyKind::ScaleFree),
            _ => Err(SNNError::UnknownTopology(s.to_string())),
        }
    }
}

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TopologyKind::Random => write!(f, "Random"),
            TopologyKind::SmallWorld => write!(f, "SmallWorld"),
            TopologyKind::ScaleFree => write!(f, "ScaleFree"),
        }
    }
}
