//! Module implementing the shared interface of spiking neurons.
//!
//! Every neuron model keeps a [`SpikingState`] (identity, firing flag, injected current,
//! refractory bookkeeping and synapse lists) next to its own membrane variables.
//! The [`Neuron`] trait exposes the state uniformly, so that the network only has to
//! call [`Neuron::step`] and react to the fired flag.
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use crate::core::synapse::SynapseId;
use crate::core::NEVER_FIRED;
use crate::error::SNNError;
use crate::models::izhikevich::{IzhikevichNeuron, IzhikevichParams};
use crate::models::lif::{LifNeuron, LifParams};

/// Identifier of a neuron, unique within the process.
pub type NeuronId = usize;

static NEXT_NEURON_ID: AtomicUsize = AtomicUsize::new(1);

/// Returns a fresh neuron ID. IDs start at 1 and are never reused within the process.
pub fn next_neuron_id() -> NeuronId {
    NEXT_NEURON_ID.fetch_add(1, Ordering::Relaxed)
}

/// State shared by all neuron models.
#[derive(Debug, Clone, PartialEq)]
pub struct SpikingState {
    pub(crate) id: NeuronId,
    pub(crate) fired: bool,
    pub(crate) input_current: f64,
    pub(crate) time_since_spike: f64,
    pub(crate) last_spike_time: f64,
    pub(crate) incoming: Vec<SynapseId>,
    pub(crate) outgoing: Vec<SynapseId>,
}

impl SpikingState {
    /// A fresh state with a new ID. The neuron starts out of its refractory period.
    pub fn new(refractory_period: f64) -> Self {
        SpikingState {
            id: next_neuron_id(),
            fired: false,
            input_current: 0.0,
            time_since_spike: refractory_period,
            last_spike_time: NEVER_FIRED,
            incoming: vec![],
            outgoing: vec![],
        }
    }

    /// Bookkeeping after a threshold crossing at the given time.
    pub(crate) fn spike(&mut self, time: f64) {
        self.fired = true;
        self.time_since_spike = 0.0;
        self.last_spike_time = time;
    }
}

pub trait Neuron {
    /// A reference to the shared spiking state.
    fn state(&self) -> &SpikingState;

    /// A mutable reference to the shared spiking state.
    fn state_mut(&mut self) -> &mut SpikingState;

    /// Advance the neuron dynamics by `dt`, starting at `time`.
    /// Returns true if the neuron fired during the step.
    /// The accumulated input current is always cleared at the end of the call.
    fn step(&mut self, dt: f64, time: f64) -> bool;

    /// The membrane potential.
    fn potential(&self) -> f64;

    /// The recovery variable. Models without one report zero.
    fn recovery(&self) -> f64 {
        0.0
    }

    /// The firing threshold.
    fn threshold(&self) -> f64;

    /// The potential the membrane is reset to after a spike.
    fn reset_potential(&self) -> f64;

    /// The duration after a spike during which the dynamics are frozen.
    fn refractory_period(&self) -> f64;

    fn id(&self) -> NeuronId {
        self.state().id
    }

    /// Whether the neuron fired during its last step.
    fn has_fired(&self) -> bool {
        self.state().fired
    }

    /// The time of the last spike, or [`NEVER_FIRED`] if the neuron never fired.
    fn last_spike_time(&self) -> f64 {
        self.state().last_spike_time
    }

    /// Overwrite the last spike time. The network uses it to align spikes on the step clock.
    fn set_last_spike_time(&mut self, time: f64) {
        self.state_mut().last_spike_time = time;
    }

    fn time_since_spike(&self) -> f64 {
        self.state().time_since_spike
    }

    /// The current accumulated since the last step.
    fn input_current(&self) -> f64 {
        self.state().input_current
    }

    /// Add current to be integrated during the next step.
    fn inject_current(&mut self, current: f64) {
        self.state_mut().input_current += current;
    }

    fn reset_input_current(&mut self) {
        self.state_mut().input_current = 0.0;
    }

    /// IDs of the synapses for which the neuron is postsynaptic.
    fn incoming(&self) -> &[SynapseId] {
        &self.state().incoming
    }

    /// IDs of the synapses for which the neuron is presynaptic.
    fn outgoing(&self) -> &[SynapseId] {
        &self.state().outgoing
    }

    fn add_incoming(&mut self, synapse_id: SynapseId) {
        self.state_mut().incoming.push(synapse_id);
    }

    fn add_outgoing(&mut self, synapse_id: SynapseId) {
        self.state_mut().outgoing.push(synapse_id);
    }
}

/// Selector of a neuron model.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum NeuronType {
    Lif,
    Izhikevich,
}

impl NeuronType {
    /// The default parameters of the model.
    pub fn default_params(&self) -> NeuronParams {
        match self {
            NeuronType::Lif => NeuronParams::Lif(LifParams::default()),
            NeuronType::Izhikevich => NeuronParams::Izhikevich(IzhikevichParams::default()),
        }
    }
}

impl FromStr for NeuronType {
    type Err = SNNError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lif" => Ok(NeuronType::Lif),
            "izhikevich" => Ok(NeuronType::Izhikevich),
            _ => Err(SNNError::UnknownNeuronType(s.to_string())),
        }
    }
}

impl fmt::Display for NeuronType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NeuronType::Lif => write!(f, "LIF"),
            NeuronType::Izhikevich => write!(f, "Izhikevich"),
        }
    }
}

/// Parameters of a neuron, tagged by model.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(tag = "model")]
pub enum NeuronParams {
    Lif(LifParams),
    Izhikevich(IzhikevichParams),
}

impl NeuronParams {
    pub fn neuron_type(&self) -> NeuronType {
        match self {
            NeuronParams::Lif(_) => NeuronType::Lif,
            NeuronParams::Izhikevich(_) => NeuronType::Izhikevich,
        }
    }

    /// Instantiate a neuron with a fresh ID.
    pub fn build(self) -> NeuronModel {
        match self {
            NeuronParams::Lif(params) => NeuronModel::Lif(LifNeuron::new(params)),
            NeuronParams::Izhikevich(params) => {
                NeuronModel::Izhikevich(IzhikevichNeuron::new(params))
            }
        }
    }
}

/// The closed set of neuron models handled by the network.
#[derive(Debug, Clone)]
pub enum NeuronModel {
    Lif(LifNeuron),
    Izhikevich(IzhikevichNeuron),
}

impl NeuronModel {
    pub fn neuron_type(&self) -> NeuronType {
        match self {
            NeuronModel::Lif(_) => NeuronType::Lif,
            NeuronModel::Izhikevich(_) => NeuronType::Izhikevich,
        }
    }
}

impl From<LifNeuron> for NeuronModel {
    fn from(neuron: LifNeuron) -> Self {
        NeuronModel::Lif(neuron)
    }
}

impl From<IzhikevichNeuron> for NeuronModel {
    fn from(neuron: IzhikevichNeuron) -> Self {
        NeuronModel::Izhikevich(neuron)
    }
}

impl Neuron for NeuronModel {
    fn state(&self) -> &SpikingState {
        match self {
            NeuronModel::Lif(neuron) => neuron.state(),
            NeuronModel::Izhikevich(neuron) => neuron.state(),
        }
    }

    fn state_mut(&mut self) -> &mut SpikingState {
        match self {
            NeuronModel::Lif(neuron) => neuron.state_mut(),
            NeuronModel::Izhikevich(neuron) => neuron.state_mut(),
        }
    }

    fn step(&mut self, dt: f64, time: f64) -> bool {
        match self {
            NeuronModel::Lif(neuron) => neuron.step(dt, time),
            NeuronModel::Izhikevich(neuron) => neuron.step(dt, time),
        }
    }

    fn potential(&self) -> f64 {
        match self {
            NeuronModel::Lif(neuron) => neuron.potential(),
            NeuronModel::Izhikevich(neuron) => neuron.potential(),
        }
    }

    fn recovery(&self) -> f64 {
        match self {
            NeuronModel::Lif(neuron) => neuron.recovery(),
            NeuronModel::Izhikevich(neuron) => neuron.recovery(),
        }
    }

    fn threshold(&self) -> f64 {
        match self {
            NeuronModel::Lif(neuron) => neuron.threshold(),
            NeuronModel::Izhikevich(neuron) => neuron.threshold(),
        }
    }

    fn reset_potential(&self) -> f64 {
        match self {
            NeuronModel::Lif(neuron) => neuron.reset_potential(),
            NeuronModel::Izhikevich(neuron) => neuron.reset_potential(),
        }
    }

    fn refractory_period(&self) -> f64 {
        match self {
            NeuronModel::Lif(neuron) => neuron.refractory_period(),
            NeuronModel::Izhikevich(neuron) => neuron.refractory_period(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_increasing() {
        let first = NeuronType::Lif.default_params().build();
        let second = NeuronType::Izhikevich.default_params().build();
        assert!(first.id() >= 1);
        assert!(second.id() > first.id());
    }

    #[test]
    fn test_neuron_type_from_str() {
        assert_eq!("LIF".parse::<NeuronType>(), Ok(NeuronType::Lif));
        assert_eq!("izhikevich".parse::<NeuronType>(), Ok(NeuronType::Izhikevich));
        assert_eq!(
            "HodgkinHuxley".parse::<NeuronType>(),
            Err(SNNError::UnknownNeuronType("HodgkinHuxley".to_string()))
        );
    }

    #[test]
    fn test_fresh_state() {
        let neuron = NeuronType::Lif.default_params().build();
        assert_eq!(neuron.neuron_type(), NeuronType::Lif);
        assert!(!neuron.has_fired());
        assert_eq!(neuron.last_spike_time(), NEVER_FIRED);
        assert_eq!(neuron.time_since_spike(), neuron.refractory_period());
        assert_eq!(neuron.input_current(), 0.0);
        assert!(neuron.incoming().is_empty());
        assert!(neuron.outgoing().is_empty());
    }

    #[test]
    fn test_inject_and_reset_current() {
        let mut neuron = NeuronType::Izhikevich.default_params().build();
        neuron.inject_current(2.5);
        neuron.inject_current(-1.0);
        assert_eq!(neuron.input_current(), 1.5);
        neuron.reset_input_current();
        assert_eq!(neuron.input_current(), 0.0);
    }

    #[test]
    fn test_synapse_lists_are_ordered() {
        let mut neuron = NeuronType::Lif.default_params().build();
        neuron.add_outgoing(3);
        neuron.add_outgoing(1);
        neuron.add_incoming(7);
        assert_eq!(neuron.outgoing(), [3, 1]);
        assert_eq!(neuron.incoming(), [7]);
    }

    #[test]
    fn test_params_round_trip_through_json() {
        let params = NeuronType::Izhikevich.default_params();
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"model\":\"Izhikevich\""));
        let parsed: NeuronParams = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, params);
    }
}
