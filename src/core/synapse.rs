//! Module implementing plastic synapses.
//!
//! A synapse transmits the spikes of its presynaptic neuron to its postsynaptic neuron and
//! adapts its weight with spike-timing-dependent plasticity (STDP). With
//! `delta_t = t_post - t_pre` the last spike times of both endpoints:
//!
//! - `delta_t > 0` (causal): `w += a_plus * exp(-delta_t / tau_plus)`
//! - `delta_t < 0` (anti-causal): `w += a_minus * exp(delta_t / tau_minus)`
//! - otherwise, or if one endpoint never fired, the weight is left untouched.
//!
//! The weight is then clamped to `[min_weight, max_weight]`.
use serde::{Deserialize, Serialize};

use crate::core::neuron::{Neuron, NeuronId};
use crate::core::{NEVER_FIRED, WEIGHT_CHANGE_TOLERANCE};
use crate::error::SNNError;
use crate::recorder::Recorder;

/// Index of a synapse in the network.
pub type SynapseId = usize;

/// Sign of the current a synapse injects into its postsynaptic neuron.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Polarity {
    Excitatory,
    Inhibitory,
}

impl Polarity {
    pub fn sign(&self) -> f64 {
        match self {
            Polarity::Excitatory => 1.0,
            Polarity::Inhibitory => -1.0,
        }
    }
}

impl From<bool> for Polarity {
    /// `true` for excitatory, `false` for inhibitory.
    fn from(excitatory: bool) -> Self {
        if excitatory {
            Polarity::Excitatory
        } else {
            Polarity::Inhibitory
        }
    }
}

/// Shape and bounds of the STDP rule.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StdpParams {
    /// Potentiation amplitude (non-negative).
    pub a_plus: f64,
    /// Depression amplitude (non-positive).
    pub a_minus: f64,
    /// Potentiation time constant (ms).
    pub tau_plus: f64,
    /// Depression time constant (ms).
    pub tau_minus: f64,
    pub min_weight: f64,
    pub max_weight: f64,
}

impl Default for StdpParams {
    fn default() -> Self {
        StdpParams {
            a_plus: 0.1,
            a_minus: -0.12,
            tau_plus: 20.0,
            tau_minus: 20.0,
            min_weight: 0.0,
            max_weight: 10.0,
        }
    }
}

impl StdpParams {
    /// Returns an error if the parameters do not describe a valid STDP rule.
    pub fn validate(&self) -> Result<(), SNNError> {
        if self.a_plus < 0.0 || self.a_minus > 0.0 {
            return Err(SNNError::InvalidParameter(
                "STDP amplitudes must satisfy a_plus >= 0 and a_minus <= 0".to_string(),
            ));
        }
        if !(self.tau_plus > 0.0 && self.tau_minus > 0.0) {
            return Err(SNNError::InvalidParameter(
                "STDP time constants must be positive".to_string(),
            ));
        }
        if !(self.min_weight <= self.max_weight) {
            return Err(SNNError::InvalidParameter(
                "The minimum weight must be less than the maximum weight".to_string(),
            ));
        }
        Ok(())
    }

    /// The weight increment for a given spike time difference `t_post - t_pre`.
    pub fn weight_change(&self, delta_t: f64) -> f64 {
        if delta_t > 0.0 {
            self.a_plus * (-delta_t / self.tau_plus).exp()
        } else if delta_t < 0.0 {
            self.a_minus * (delta_t / self.tau_minus).exp()
        } else {
            0.0
        }
    }
}

/// Time difference `t_post - t_pre` between the last spikes of both endpoints.
/// Undefined if one of them never fired.
pub fn spike_time_difference(pre_last_spike: f64, post_last_spike: f64) -> Option<f64> {
    if pre_last_spike <= NEVER_FIRED || post_last_spike <= NEVER_FIRED {
        return None;
    }
    let delta_t = post_last_spike - pre_last_spike;
    (!delta_t.is_nan()).then_some(delta_t)
}

/// A plastic synapse between two neurons.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Synapse {
    pre_id: NeuronId,
    post_id: NeuronId,
    polarity: Polarity,
    /// Weight magnitude; the polarity gives the sign of the injected current.
    weight: f64,
    /// Transmission delay (non-negative).
    delay: f64,
    stdp: StdpParams,
}

impl Synapse {
    /// Create a new synapse with the specified parameters.
    /// The initial weight is clamped to the STDP bounds.
    /// Returns an error if the delay is negative or the STDP parameters are invalid.
    pub fn build(
        pre_id: NeuronId,
        post_id: NeuronId,
        polarity: Polarity,
        weight: f64,
        delay: f64,
        stdp: StdpParams,
    ) -> Result<Self, SNNError> {
        if !(delay >= 0.0 && delay.is_finite()) {
            return Err(SNNError::InvalidParameter(
                "Synapse delay must be non-negative and finite".to_string(),
            ));
        }
        if !weight.is_finite() {
            return Err(SNNError::InvalidParameter(
                "Synapse weight must be finite".to_string(),
            ));
        }
        stdp.validate()?;

        Ok(Synapse {
            pre_id,
            post_id,
            polarity,
            weight: weight.clamp(stdp.min_weight, stdp.max_weight),
            delay,
            stdp,
        })
    }

    /// An excitatory synapse with the default STDP rule.
    pub fn excitatory(
        pre_id: NeuronId,
        post_id: NeuronId,
        weight: f64,
        delay: f64,
    ) -> Result<Self, SNNError> {
        Synapse::build(pre_id, post_id, Polarity::Excitatory, weight, delay, StdpParams::default())
    }

    /// An inhibitory synapse with the default STDP rule.
    pub fn inhibitory(
        pre_id: NeuronId,
        post_id: NeuronId,
        weight: f64,
        delay: f64,
    ) -> Result<Self, SNNError> {
        Synapse::build(pre_id, post_id, Polarity::Inhibitory, weight, delay, StdpParams::default())
    }

    /// Returns the ID of the presynaptic neuron.
    pub fn pre_id(&self) -> NeuronId {
        self.pre_id
    }

    /// Returns the ID of the postsynaptic neuron.
    pub fn post_id(&self) -> NeuronId {
        self.post_id
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn delay(&self) -> f64 {
        self.delay
    }

    pub fn stdp(&self) -> &StdpParams {
        &self.stdp
    }

    /// The label identifying the synapse in the records, `preId_postId`.
    pub fn label(&self) -> String {
        format!("{}_{}", self.pre_id, self.post_id)
    }

    /// Deliver a presynaptic spike arriving at `event_time`.
    ///
    /// Returns the signed current to inject into `post`, or `None` if `pre` and `post` are not
    /// the endpoints of the synapse. The weight is adapted after the current is computed.
    pub fn deliver_spike_from_pre<N, R>(
        &mut self,
        pre: &N,
        post: &N,
        event_time: f64,
        recorder: &mut R,
    ) -> Option<f64>
    where
        N: Neuron + ?Sized,
        R: Recorder + ?Sized,
    {
        if pre.id() != self.pre_id || post.id() != self.post_id {
            return None;
        }
        let current = self.polarity.sign() * self.weight;
        let delta_t = spike_time_difference(pre.last_spike_time(), post.last_spike_time());
        self.adjust_weight(delta_t, event_time, recorder);
        Some(current)
    }

    /// Notify the synapse of a postsynaptic spike at `event_time`.
    /// Only the weight is adapted; nothing is transmitted.
    pub fn deliver_spike_from_post<N, R>(
        &mut self,
        pre: &N,
        post: &N,
        event_time: f64,
        recorder: &mut R,
    ) where
        N: Neuron + ?Sized,
        R: Recorder + ?Sized,
    {
        if pre.id() != self.pre_id || post.id() != self.post_id {
            return;
        }
        let delta_t = spike_time_difference(pre.last_spike_time(), post.last_spike_time());
        self.adjust_weight(delta_t, event_time, recorder);
    }

    fn adjust_weight<R: Recorder + ?Sized>(
        &mut self,
        delta_t: Option<f64>,
        event_time: f64,
        recorder: &mut R,
    ) {
        let Some(delta_t) = delta_t else {
            return;
        };

        let old_weight = self.weight;
        self.weight = (self.weight + self.stdp.weight_change(delta_t))
            .clamp(self.stdp.min_weight, self.stdp.max_weight);

        if (self.weight - old_weight).abs() > WEIGHT_CHANGE_TOLERANCE {
            recorder.record_weight_change(&self.label(), event_time, old_weight, self.weight);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lif::LifNeuron;
    use crate::recorder::MemoryRecorder;
    use approx::assert_relative_eq;

    fn fire(neuron: &mut LifNeuron, time: f64) {
        neuron.inject_current(2000.0);
        assert!(neuron.step(1.0, time));
    }

    #[test]
    fn test_build_invalid() {
        assert_eq!(
            Synapse::excitatory(1, 2, 1.0, -1.0),
            Err(SNNError::InvalidParameter(
                "Synapse delay must be non-negative and finite".to_string()
            ))
        );
        let stdp = StdpParams {
            min_weight: 2.0,
            max_weight: 1.0,
            ..StdpParams::default()
        };
        assert_eq!(
            Synapse::build(1, 2, Polarity::Excitatory, 1.0, 1.0, stdp),
            Err(SNNError::InvalidParameter(
                "The minimum weight must be less than the maximum weight".to_string()
            ))
        );
        let stdp = StdpParams {
            a_minus: 0.12,
            ..StdpParams::default()
        };
        assert!(Synapse::build(1, 2, Polarity::Excitatory, 1.0, 1.0, stdp).is_err());
    }

    #[test]
    fn test_initial_weight_is_clamped() {
        assert_eq!(Synapse::excitatory(1, 2, 42.0, 1.0).unwrap().weight(), 10.0);
        assert_eq!(Synapse::inhibitory(1, 2, -1.0, 1.0).unwrap().weight(), 0.0);
    }

    #[test]
    fn test_label() {
        assert_eq!(Synapse::excitatory(12, 7, 1.0, 1.0).unwrap().label(), "12_7");
    }

    #[test]
    fn test_spike_time_difference() {
        assert_eq!(spike_time_difference(10.0, 15.0), Some(5.0));
        assert_eq!(spike_time_difference(10.0, 5.0), Some(-5.0));
        assert_eq!(spike_time_difference(NEVER_FIRED, 5.0), None);
        assert_eq!(spike_time_difference(10.0, NEVER_FIRED), None);
        assert_eq!(spike_time_difference(f64::NAN, 5.0), None);
    }

    #[test]
    fn test_current_sign() {
        let pre = LifNeuron::default();
        let post = LifNeuron::default();
        let mut recorder = MemoryRecorder::new();

        let mut excitatory = Synapse::excitatory(pre.id(), post.id(), 1.5, 1.0).unwrap();
        let mut inhibitory = Synapse::inhibitory(pre.id(), post.id(), 1.5, 1.0).unwrap();
        assert_eq!(
            excitatory.deliver_spike_from_pre(&pre, &post, 1.0, &mut recorder),
            Some(1.5)
        );
        assert_eq!(
            inhibitory.deliver_spike_from_pre(&pre, &post, 1.0, &mut recorder),
            Some(-1.5)
        );
        // Neither endpoint fired, so no plasticity.
        assert_eq!(recorder.num_weight_changes(), 0);
    }

    #[test]
    fn test_foreign_neurons_are_ignored() {
        let pre = LifNeuron::default();
        let post = LifNeuron::default();
        let other = LifNeuron::default();
        let mut recorder = MemoryRecorder::new();
        let mut synapse = Synapse::excitatory(pre.id(), post.id(), 1.0, 1.0).unwrap();

        assert_eq!(
            synapse.deliver_spike_from_pre(&other, &post, 1.0, &mut recorder),
            None
        );
        assert_eq!(
            synapse.deliver_spike_from_pre(&post, &pre, 1.0, &mut recorder),
            None
        );
        synapse.deliver_spike_from_post(&pre, &other, 1.0, &mut recorder);
        assert_eq!(synapse.weight(), 1.0);
    }

    #[test]
    fn test_long_term_potentiation() {
        let mut pre = LifNeuron::default();
        let mut post = LifNeuron::default();
        let mut recorder = MemoryRecorder::new();
        let mut synapse = Synapse::excitatory(pre.id(), post.id(), 1.0, 1.0).unwrap();

        fire(&mut pre, 10.0);
        synapse.deliver_spike_from_pre(&pre, &post, 11.0, &mut recorder);
        assert_eq!(synapse.weight(), 1.0);

        fire(&mut post, 15.0);
        synapse.deliver_spike_from_post(&pre, &post, 15.0, &mut recorder);
        assert!(synapse.weight() > 1.0);
        assert_relative_eq!(synapse.weight(), 1.0 + 0.1 * (-0.25_f64).exp(), epsilon = 1e-12);

        assert_eq!(recorder.num_weight_changes(), 1);
        let change = &recorder.weight_changes()[0];
        assert_eq!(change.synapse_id, synapse.label());
        assert_eq!(change.time, 15.0);
        assert_eq!(change.old_weight, 1.0);
        assert_eq!(change.new_weight, synapse.weight());
    }

    #[test]
    fn test_long_term_depression() {
        let mut pre = LifNeuron::default();
        let mut post = LifNeuron::default();
        let mut recorder = MemoryRecorder::new();
        let mut synapse = Synapse::excitatory(pre.id(), post.id(), 1.0, 1.0).unwrap();

        fire(&mut post, 5.0);
        synapse.deliver_spike_from_post(&pre, &post, 5.0, &mut recorder);
        assert_eq!(synapse.weight(), 1.0);

        fire(&mut pre, 10.0);
        synapse.deliver_spike_from_pre(&pre, &post, 11.0, &mut recorder);
        assert!(synapse.weight() < 1.0);
        assert_relative_eq!(synapse.weight(), 1.0 - 0.12 * (-0.25_f64).exp(), epsilon = 1e-12);
        assert_eq!(recorder.weight_changes()[0].time, 11.0);
    }

    #[test]
    fn test_simultaneous_spikes() {
        let mut pre = LifNeuron::default();
        let mut post = LifNeuron::default();
        let mut recorder = MemoryRecorder::new();
        let mut synapse = Synapse::excitatory(pre.id(), post.id(), 1.0, 1.0).unwrap();

        pre.set_last_spike_time(4.0);
        post.set_last_spike_time(4.0);
        synapse.deliver_spike_from_post(&pre, &post, 4.0, &mut recorder);
        assert_eq!(synapse.weight(), 1.0);
        assert_eq!(recorder.num_weight_changes(), 0);
    }

    #[test]
    fn test_weight_stays_bounded() {
        let mut pre = LifNeuron::default();
        let mut post = LifNeuron::default();
        let mut recorder = MemoryRecorder::new();
        let mut synapse = Synapse::excitatory(pre.id(), post.id(), 1.0, 1.0).unwrap();

        pre.set_last_spike_time(10.0);
        post.set_last_spike_time(11.0);
        for i in 0..500 {
            synapse.deliver_spike_from_post(&pre, &post, 11.0 + i as f64, &mut recorder);
            assert!(synapse.weight() <= synapse.stdp().max_weight);
        }
        assert_eq!(synapse.weight(), synapse.stdp().max_weight);

        // Saturated potentiation is not reported.
        let num_changes = recorder.num_weight_changes();
        synapse.deliver_spike_from_post(&pre, &post, 600.0, &mut recorder);
        assert_eq!(recorder.num_weight_changes(), num_changes);

        post.set_last_spike_time(9.0);
        for i in 0..500 {
            synapse.deliver_spike_from_pre(&pre, &post, 700.0 + i as f64, &mut recorder);
            assert!(synapse.weight() >= synapse.stdp().min_weight);
        }
        assert_eq!(synapse.weight(), synapse.stdp().min_weight);
    }

    #[test]
    fn test_weight_change_shape() {
        let stdp = StdpParams::default();
        assert_eq!(stdp.weight_change(0.0), 0.0);
        assert!(stdp.weight_change(1.0) > stdp.weight_change(10.0));
        assert!(stdp.weight_change(-1.0) < stdp.weight_change(-10.0));
        assert_relative_eq!(stdp.weight_change(20.0), 0.1 / std::f64::consts::E, epsilon = 1e-12);
    }
}
