//! Core module defining the main components of the plastic SNN library.
//!
//! This module provides the fundamental building blocks for creating and simulating
//! spiking neural networks. It consists of the following components:
//!
//! - [`event`]: Time-ordered queue of delayed spike deliveries
//! - [`neuron`]: Shared neuron interface and the closed set of neuron models
//! - [`synapse`]: Plastic synapses with spike-timing-dependent plasticity
//! - [`topology`]: Interfaces for connectivity strategies
//! - [`network`]: Owns neurons and synapses and drives the simulation
//!
//! # Examples
//!
//! ```
//! use plastic_snn::core::network::Network;
//! use plastic_snn::core::neuron::{Neuron, NeuronType};
//!
//! let mut network = Network::default();
//! let pre = network.create_neuron(NeuronType::Lif.default_params());
//! let post = network.create_neuron(NeuronType::Izhikevich.default_params());
//!
//! network.connect_excitatory(pre, post, 1.0, 1.0).unwrap();
//! network.connect_inhibitory(post, pre, 0.5, 2.0).unwrap();
//!
//! assert_eq!(network.num_neurons(), 2);
//! assert_eq!(network.num_synapses(), 2);
//! assert_eq!(network.neuron(pre).unwrap().outgoing().len(), 1);
//! assert_eq!(network.neuron(pre).unwrap().incoming().len(), 1);
//! ```
pub mod event;
pub mod network;
pub mod neuron;
pub mod synapse;
pub mod topology;

/// Last spike time of a neuron that has never fired.
pub const NEVER_FIRED: f64 = -1.0;
/// Smallest weight change reported to the recorder.
pub const WEIGHT_CHANGE_TOLERANCE: f64 = 1e-6;
/// Current injected into every neuron at each simulation step, unless configured otherwise.
pub const DEFAULT_BACKGROUND_CURRENT: f64 = 10.0;
