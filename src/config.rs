//! JSON configuration of networks and simulations.
//!
//! Every field has a default, so that partial configuration files are accepted:
//!
//! ```
//! use plastic_snn::config::NetworkConfig;
//!
//! let config: NetworkConfig =
//!     serde_json::from_str(r#"{"total_neurons": 50, "connectivity_strategy": "SmallWorld"}"#).unwrap();
//! assert_eq!(config.total_neurons, 50);
//! assert_eq!(config.excitatory_ratio, 0.8);
//! assert_eq!(config.small_world.connections_per_neuron, 10);
//! ```
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::core::topology::TopologyKind;
use crate::core::DEFAULT_BACKGROUND_CURRENT;
use crate::error::SNNError;

/// Connectivity of one population in the uniform-random strategy.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ConnectivityParams {
    pub connection_probability: f64,
    pub default_weight: f64,
    /// Whether the created synapses are excitatory.
    pub excitatory: bool,
}

impl ConnectivityParams {
    pub fn excitatory() -> Self {
        ConnectivityParams {
            connection_probability: 0.1,
            default_weight: 0.5,
            excitatory: true,
        }
    }

    pub fn inhibitory() -> Self {
        ConnectivityParams {
            excitatory: false,
            ..Self::excitatory()
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmallWorldParams {
    pub rewiring_probability: f64,
    /// Number of ring neighbors per neuron; must be even.
    pub connections_per_neuron: usize,
}

impl Default for SmallWorldParams {
    fn default() -> Self {
        SmallWorldParams {
            rewiring_probability: 0.1,
            connections_per_neuron: 10,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleFreeParams {
    /// Size of the fully connected core.
    pub initial_nodes: usize,
    pub connections_per_new_node: usize,
}

impl Default for ScaleFreeParams {
    fn default() -> Self {
        ScaleFreeParams {
            initial_nodes: 5,
            connections_per_new_node: 3,
        }
    }
}

/// Configuration of a network, see [`Network::from_config`](crate::core::network::Network::from_config).
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub total_neurons: usize,
    /// Fraction of regular spiking (excitatory) neurons.
    pub excitatory_ratio: f64,
    /// Fraction of fast spiking (inhibitory) neurons.
    pub inhibitory_ratio: f64,
    pub excitatory_connectivity: ConnectivityParams,
    pub inhibitory_connectivity: ConnectivityParams,
    /// One of `"Random"`, `"SmallWorld"` or `"ScaleFree"`.
    pub connectivity_strategy: String,
    pub small_world: SmallWorldParams,
    pub scale_free: ScaleFreeParams,
    /// Seed of the connectivity strategies.
    pub seed: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            total_neurons: 100,
            excitatory_ratio: 0.8,
            inhibitory_ratio: 0.2,
            excitatory_connectivity: ConnectivityParams::excitatory(),
            inhibitory_connectivity: ConnectivityParams::inhibitory(),
            connectivity_strategy: TopologyKind::Random.to_string(),
            small_world: SmallWorldParams::default(),
            scale_free: ScaleFreeParams::default(),
            seed: 0,
        }
    }
}

impl NetworkConfig {
    /// The selected connectivity strategy.
    pub fn topology_kind(&self) -> Result<TopologyKind, SNNError> {
        self.connectivity_strategy.parse()
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), SNNError> {
        save_json(self, path)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SNNError> {
        load_json(path)
    }
}

/// Configuration of a simulation run.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Duration of the simulation (ms).
    pub t_max: f64,
    /// Time step (ms).
    pub dt: f64,
    /// Current injected into every neuron at each step.
    pub background_current: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            t_max: 1000.0,
            dt: 1.0,
            background_current: DEFAULT_BACKGROUND_CURRENT,
        }
    }
}

impl SimulationConfig {
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), SNNError> {
        save_json(self, path)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SNNError> {
        load_json(path)
    }
}

fn save_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<(), SNNError> {
    let file = File::create(path).map_err(|e| SNNError::IOError(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| SNNError::IOError(e.to_string()))?;
    writer.flush().map_err(|e| SNNError::IOError(e.to_string()))
}

fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, SNNError> {
    let file = File::open(path).map_err(|e| SNNError::IOError(e.to_string()))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|e| SNNError::IOError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = NetworkConfig::default();
        assert_eq!(config.total_neurons, 100);
        assert_eq!(config.topology_kind(), Ok(TopologyKind::Random));
        assert!(config.excitatory_connectivity.excitatory);
        assert!(!config.inhibitory_connectivity.excitatory);
        assert_eq!(config.scale_free.initial_nodes, 5);

        let simulation = SimulationConfig::default();
        assert_eq!(simulation.t_max, 1000.0);
        assert_eq!(simulation.dt, 1.0);
        assert_eq!(simulation.background_current, 10.0);
    }

    #[test]
    fn test_load_without_supplemental_sections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("network.json");
        fs::write(
            &path,
            r#"{
                "total_neurons": 200,
                "excitatory_ratio": 0.75,
                "inhibitory_ratio": 0.25,
                "connectivity_strategy": "ScaleFree",
                "excitatory_connectivity": {
                    "connection_probability": 0.2,
                    "default_weight": 1.5,
                    "excitatory": true
                },
                "inhibitory_connectivity": {
                    "connection_probability": 0.3,
                    "default_weight": 2.0,
                    "excitatory": false
                }
            }"#,
        )
        .unwrap();

        let config = NetworkConfig::load_from(&path).unwrap();
        assert_eq!(config.total_neurons, 200);
        assert_eq!(config.topology_kind(), Ok(TopologyKind::ScaleFree));
        assert_eq!(config.inhibitory_connectivity.default_weight, 2.0);
        assert_eq!(config.small_world, SmallWorldParams::default());
        assert_eq!(config.seed, 0);
    }

    #[test]
    fn test_unknown_strategy() {
        let config = NetworkConfig {
            connectivity_strategy: "Lattice".to_string(),
            ..NetworkConfig::default()
        };
        assert_eq!(
            config.topology_kind(),
            Err(SNNError::UnknownTopology("Lattice".to_string()))
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let network_path = dir.path().join("network.json");
        let simulation_path = dir.path().join("simulation.json");

        let config = NetworkConfig {
            seed: 42,
            ..NetworkConfig::default()
        };
        config.save_to(&network_path).unwrap();
        assert_eq!(NetworkConfig::load_from(&network_path).unwrap(), config);

        let simulation = SimulationConfig {
            t_max: 50.0,
            ..SimulationConfig::default()
        };
        simulation.save_to(&simulation_path).unwrap();
        assert_eq!(SimulationConfig::load_from(&simulation_path).unwrap(), simulation);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            NetworkConfig::load_from(dir.path().join("missing.json")),
            Err(SNNError::IOError(_))
        ));

        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            SimulationConfig::load_from(&path),
            Err(SNNError::IOError(_))
        ));
    }
}
