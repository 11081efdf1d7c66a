//! Izhikevich neuron.
//!
//! The model couples the membrane potential `v` with a recovery variable `u`:
//!
//! ```text
//! dv/dt = 0.04 v^2 + 5 v + 140 - u + R I
//! du/dt = a (b v - u)
//! ```
//!
//! When `v` reaches the threshold, `v` is reset to `v_reset` and `u` is incremented by `d`.
//! The quadratic term makes plain Euler unstable at 1 ms, so every simulation step is split into
//! sub-steps of at most [`INTEGRATION_STEP`].
use serde::{Deserialize, Serialize};

use crate::core::neuron::{Neuron, SpikingState};

/// Largest internal integration increment (ms).
pub const INTEGRATION_STEP: f64 = 0.1;

/// Parameters of an Izhikevich neuron.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IzhikevichParams {
    /// Time scale of the recovery variable.
    pub a: f64,
    /// Sensitivity of the recovery variable to the potential.
    pub b: f64,
    /// Initial potential (mV).
    pub c: f64,
    /// Recovery increment after a spike.
    pub d: f64,
    /// Peak potential at which a spike is emitted (mV).
    pub v_threshold: f64,
    /// Potential after a spike (mV).
    pub v_reset: f64,
    /// Input resistance.
    pub resistance: f64,
    /// Refractory period (ms).
    pub refractory_period: f64,
}

impl IzhikevichParams {
    /// Regular spiking cortical neuron (the default).
    pub fn regular_spiking() -> Self {
        IzhikevichParams {
            a: 0.02,
            b: 0.2,
            c: -65.0,
            d: 8.0,
            v_threshold: 30.0,
            v_reset: -65.0,
            resistance: 1.0,
            refractory_period: 2.0,
        }
    }

    /// Fast spiking interneuron.
    pub fn fast_spiking() -> Self {
        IzhikevichParams {
            a: 0.1,
            d: 2.0,
            ..Self::regular_spiking()
        }
    }

    /// Chattering neuron, firing in bursts.
    pub fn chattering() -> Self {
        IzhikevichParams {
            c: -50.0,
            d: 2.0,
            v_reset: -50.0,
            ..Self::regular_spiking()
        }
    }
}

impl Default for IzhikevichParams {
    fn default() -> Self {
        Self::regular_spiking()
    }
}

#[derive(Debug, Clone)]
pub struct IzhikevichNeuron {
    params: IzhikevichParams,
    v: f64,
    u: f64,
    state: SpikingState,
}

impl IzhikevichNeuron {
    /// Create a neuron with `v = c` and `u = b * c` and a fresh ID.
    pub fn new(params: IzhikevichParams) -> Self {
        IzhikevichNeuron {
            v: params.c,
            u: params.b * params.c,
            state: SpikingState::new(params.refractory_period),
            params,
        }
    }

    pub fn params(&self) -> &IzhikevichParams {
        &self.params
    }
}

impl Default for IzhikevichNeuron {
    fn default() -> Self {
        IzhikevichNeuron::new(IzhikevichParams::default())
    }
}

impl Neuron for IzhikevichNeuron {
    fn state(&self) -> &SpikingState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SpikingState {
        &mut self.state
    }

    /// Integrate over `ceil(dt / INTEGRATION_STEP)` equal sub-steps covering exactly `dt`.
    /// The spike time is the end of the sub-step during which the threshold is crossed,
    /// and the remaining sub-steps are skipped, so at most one spike is emitted per call.
    fn step(&mut self, dt: f64, time: f64) -> bool {
        self.state.fired = false;

        let num_substeps = (dt / INTEGRATION_STEP).ceil().max(1.0) as usize;
        let h = dt / num_substeps as f64;
        let IzhikevichParams {
            a,
            b,
            d,
            v_threshold,
            v_reset,
            resistance,
            refractory_period,
            ..
        } = self.params;
        let drive = resistance * self.state.input_current;

        for i in 0..num_substeps {
            self.state.time_since_spike += h;
            if self.state.time_since_spike < refractory_period {
                continue;
            }

            self.v += h * (0.04 * self.v * self.v + 5.0 * self.v + 140.0 - self.u + drive);
            self.u += h * a * (b * self.v - self.u);

            if self.v >= v_threshold {
                self.v = v_reset;
                self.u += d;
                self.state.spike(time + (i + 1) as f64 * h);
                break;
            }
        }

        self.reset_input_current();
        self.state.fired
    }

    fn potential(&self) -> f64 {
        self.v
    }

    fn recovery(&self) -> f64 {
        self.u
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
