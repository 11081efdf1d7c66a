//! This crate provides tools for simulating plastic spiking neural networks (SNNs) in Rust.
//!
//! Neurons (leaky integrate-and-fire or Izhikevich) are integrated on a fixed time step, spikes
//! travel along synapses with a transmission delay, and synaptic weights adapt with
//! spike-timing-dependent plasticity (STDP).
//!
//! # Creating Networks
//!
//! ## From Scratch
//!
//! ```rust
//! use plastic_snn::core::network::Network;
//! use plastic_snn::core::neuron::NeuronType;
//!
//! // Init an empty network
//! let mut network = Network::default();
//!
//! // Add neurons and synapses to the network
//! let ids = network.create_neurons(3, &NeuronType::Izhikevich.default_params());
//! network.connect_excitatory(ids[0], ids[1], 1.0, 1.0).unwrap();
//! network.connect_excitatory(ids[1], ids[2], 2.0, 0.5).unwrap();
//! network.connect_inhibitory(ids[2], ids[0], 0.5, 2.0).unwrap();
//!
//! // Check the number of neurons and synapses
//! assert_eq!(network.num_neurons(), 3);
//! assert_eq!(network.num_synapses(), 3);
//! ```
//!
//! ## With a Connectivity Strategy
//!
//! ```rust
//! use plastic_snn::core::network::Network;
//! use plastic_snn::core::neuron::NeuronType;
//! use plastic_snn::topology::small_world::SmallWorldTopology;
//!
//! let mut network = Network::default();
//! network.create_neurons(20, &NeuronType::Lif.default_params());
//!
//! // A ring lattice with 4 neighbors per neuron, without shortcuts
//! network.set_topology(Box::new(SmallWorldTopology::new(0.0, 4, 42).unwrap()));
//! network.apply_topology().unwrap();
//!
//! assert_eq!(network.num_synapses(), 80);
//! ```
//!
//! ## From a Configuration
//!
//! ```rust
//! use plastic_snn::config::NetworkConfig;
//! use plastic_snn::core::network::Network;
//! use plastic_snn::recorder::MemoryRecorder;
//!
//! let config = NetworkConfig {
//!     total_neurons: 50,
//!     connectivity_strategy: "ScaleFree".to_string(),
//!     ..NetworkConfig::default()
//! };
//! let network = Network::from_config(&config, MemoryRecorder::new()).unwrap();
//! assert_eq!(network.num_neurons(), 50);
//! ```
//!
//! # Simulating Networks
//!
//! ```rust
//! use plastic_snn::core::network::Network;
//! use plastic_snn::core::neuron::NeuronType;
//!
//! let mut network = Network::default();
//! let ids = network.create_neurons(2, &NeuronType::Lif.default_params());
//! network.connect_excitatory(ids[0], ids[1], 1.0, 1.0).unwrap();
//!
//! // Kick the first neuron and simulate 10 ms with a step of 1 ms
//! network.inject_current(ids[0], 2000.0).unwrap();
//! network.run(10.0, 1.0).unwrap();
//!
//! let spikes = network.recorder().spikes();
//! assert_eq!(spikes[0].neuron_id, ids[0]);
//! assert_eq!(spikes[0].time, 0.0);
//! println!("{}", network.recorder().spikes_csv().unwrap());
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod recorder;
pub mod topology;
