//! Leaky integrate-and-fire neuron.
use serde::{Deserialize, Serialize};

use crate::core::neuron::{Neuron, SpikingState};

/// Parameters of a leaky integrate-and-fire neuron.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LifParams {
    /// Resting potential (mV).
    pub v_rest: f64,
    /// Potential after a spike (mV).
    pub v_reset: f64,
    /// Firing threshold (mV).
    pub v_threshold: f64,
    /// Membrane resistance.
    pub resistance: f64,
    /// Membrane capacitance.
    pub capacitance: f64,
    /// Refractory period (ms).
    pub refractory_period: f64,
}

impl Default for LifParams {
    fn default() -> Self {
        LifParams {
            v_rest: -65.0,
            v_reset: -65.0,
            v_threshold: -50.0,
            resistance: 10.0,
            capacitance: 100.0,
            refractory_period: 2.0,
        }
    }
}

/// A leaky integrate-and-fire neuron with a single state variable, the membrane potential.
#[derive(Debug, Clone)]
pub struct LifNeuron {
    params: LifParams,
    v: f64,
    state: SpikingState,
}

impl LifNeuron {
    /// Create a neuron at rest with a fresh ID.
    pub fn new(params: LifParams) -> Self {
        LifNeuron {
            v: params.v_rest,
            state: SpikingState::new(params.refractory_period),
            params,
        }
    }

    pub fn params(&self) -> &LifParams {
        &self.params
    }
}

impl Default for LifNeuron {
    fn default() -> Self {
        LifNeuron::new(LifParams::default())
    }
}

impl Neuron for LifNeuron {
    fn state(&self) -> &SpikingState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SpikingState {
        &mut self.state
    }

    fn step(&mut self, dt: f64, time: f64) -> bool {
        self.state.fired = false;
        self.state.time_since_spike += dt;

        if self.state.time_since_spike >= self.params.refractory_period {
            let LifParams {
                v_rest,
                v_reset,
                v_threshold,
                resistance,
                capacitance,
                ..
            } = self.params;
            let drive = -(self.v - v_rest) + resistance * self.state.input_current;
            self.v += dt * drive / (resistance * capacitance);

            if self.v >= v_threshold {
                self.v = v_reset;
                self.state.spike(time);
            }
        }

        self.reset_input_current();
        self.state.fired
    }

    fn potential(&self) -> f64 {
        self.v
    }

    fn threshold(&self) -> f64 {
        self.params.v_threshold
    }

    fn reset_potential(&self) -> f64 {
        self.params.v_reset
    }

    fn refractory_period(&self) -> f64 {
        self.params.refractory_period
    }
}
