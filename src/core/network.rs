//! Network of spiking neurons connected by plastic synapses.
//!
//! The network owns its neurons, its synapses, the queue of pending spike deliveries, an optional
//! connectivity strategy and the recorder. Neurons are stored in creation order and looked up by
//! ID; synapses are stored in creation order and identified by their position.
//!
//! Each simulation step at time `t`:
//! 1. every neuron receives the background current;
//! 2. every neuron is integrated over `dt`, in creation order;
//! 3. for every neuron which fired, its spike is recorded at the time the neuron reports (the
//!    threshold crossing, within `(t, t + dt]` for sub-stepped models), its last spike time is
//!    aligned on `t`, one delivery per outgoing synapse is scheduled at `t + delay`, and its
//!    incoming synapses are notified;
//! 4. all deliveries due at or before `t` are handed to their synapses, and the resulting currents
//!    are injected into the postsynaptic neurons (to be integrated at the next step).
use derivative::Derivative;
use log::{debug, info, trace};
use std::collections::HashMap;

use crate::core::event::{EventQueue, SpikeEvent};
use crate::core::neuron::{Neuron, NeuronId, NeuronModel, NeuronParams};
use crate::core::synapse::{Polarity, StdpParams, Synapse, SynapseId};
use crate::core::topology::{Connector, Topology};
use crate::core::{DEFAULT_BACKGROUND_CURRENT, NEVER_FIRED};
use crate::error::SNNError;
use crate::recorder::{MemoryRecorder, Recorder};

#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct Network<R: Recorder = MemoryRecorder> {
    neurons: Vec<NeuronModel>,
    /// Position of every neuron in `neurons`.
    #[derivative(Debug = "ignore")]
    positions: HashMap<NeuronId, usize>,
    synapses: Vec<Synapse>,
    #[derivative(Debug = "ignore")]
    topology: Option<Box<dyn Topology>>,
    events: EventQueue,
    #[derivative(Debug = "ignore")]
    recorder: R,
    background_current: f64,
}

impl Default for Network<MemoryRecorder> {
    fn default() -> Self {
        Network::new(MemoryRecorder::new())
    }
}

impl<R: Recorder> Network<R> {
    /// Create an empty network reporting to the given recorder.
    pub fn new(recorder: R) -> Self {
        Network {
            neurons: vec![],
            positions: HashMap::new(),
            synapses: vec![],
            topology: None,
            events: EventQueue::new(),
            recorder,
            background_current: DEFAULT_BACKGROUND_CURRENT,
        }
    }

    /// Add a new neuron to the network and return its ID.
    pub fn create_neuron(&mut self, params: NeuronParams) -> NeuronId {
        let neuron = params.build();
        let id = neuron.id();
        self.positions.insert(id, self.neurons.len());
        self.neurons.push(neuron);
        id
    }

    /// Add `num_neurons` neurons sharing the same parameters and return their IDs.
    pub fn create_neurons(&mut self, num_neurons: usize, params: &NeuronParams) -> Vec<NeuronId> {
        (0..num_neurons)
            .map(|_| self.create_neuron(params.clone()))
            .collect()
    }

    /// Returns a reference to the neuron with the given ID, if it belongs to the network.
    pub fn neuron(&self, id: NeuronId) -> Option<&NeuronModel> {
        self.positions.get(&id).map(|&position| &self.neurons[position])
    }

    /// Returns a mutable reference to the neuron with the given ID, if it belongs to the network.
    pub fn neuron_mut(&mut self, id: NeuronId) -> Option<&mut NeuronModel> {
        self.positions
            .get(&id)
            .map(|&position| &mut self.neurons[position])
    }

    /// An iterator over the neurons, in creation order.
    pub fn neurons_iter(&self) -> impl Iterator<Item = &NeuronModel> + '_ {
        self.neurons.iter()
    }

    /// The IDs of all neurons, in creation order.
    pub fn neuron_ids(&self) -> Vec<NeuronId> {
        self.neurons.iter().map(|neuron| neuron.id()).collect()
    }

    pub fn num_neurons(&self) -> usize {
        self.neurons.len()
    }

    pub fn synapse(&self, id: SynapseId) -> Option<&Synapse> {
        self.synapses.get(id)
    }

    /// An iterator over the synapses, in creation order.
    pub fn synapses_iter(&self) -> impl Iterator<Item = &Synapse> + '_ {
        self.synapses.iter()
    }

    pub fn num_synapses(&self) -> usize {
        self.synapses.len()
    }

    /// Create a synapse between two neurons of the network and return its ID.
    /// Parallel synapses between the same pair of neurons are allowed.
    pub fn connect(
        &mut self,
        pre_id: NeuronId,
        post_id: NeuronId,
        polarity: Polarity,
        weight: f64,
        delay: f64,
        stdp: StdpParams,
    ) -> Result<SynapseId, SNNError> {
        let pre_position = *self
            .positions
            .get(&pre_id)
            .ok_or(SNNError::NeuronNotFound(pre_id))?;
        let post_position = *self
            .positions
            .get(&post_id)
            .ok_or(SNNError::NeuronNotFound(post_id))?;

        let synapse = Synapse::build(pre_id, post_id, polarity, weight, delay, stdp)?;
        let synapse_id = self.synapses.len();
        self.synapses.push(synapse);
        self.neurons[pre_position].add_outgoing(synapse_id);
        self.neurons[post_position].add_incoming(synapse_id);
        Ok(synapse_id)
    }

    /// Create an excitatory synapse with the default plasticity rule.
    pub fn connect_excitatory(
        &mut self,
        pre_id: NeuronId,
        post_id: NeuronId,
        weight: f64,
        delay: f64,
    ) -> Result<SynapseId, SNNError> {
        self.connect(
            pre_id,
            post_id,
            Polarity::Excitatory,
            weight,
            delay,
            StdpParams::default(),
        )
    }

    /// Create an inhibitory synapse with the default plasticity rule.
    pub fn connect_inhibitory(
        &mut self,
        pre_id: NeuronId,
        post_id: NeuronId,
        weight: f64,
        delay: f64,
    ) -> Result<SynapseId, SNNError> {
        self.connect(
            pre_id,
            post_id,
            Polarity::Inhibitory,
            weight,
            delay,
            StdpParams::default(),
        )
    }

    /// Set the connectivity strategy, replacing the previous one.
    pub fn set_topology(&mut self, topology: Box<dyn Topology>) {
        self.topology = Some(topology);
    }

    pub fn has_topology(&self) -> bool {
        self.topology.is_some()
    }

    /// Apply the connectivity strategy to all neurons of the network, in creation order.
    /// The strategy is kept and may be applied again, e.g., after adding neurons.
    pub fn apply_topology(&mut self) -> Result<(), SNNError> {
        let mut topology = self.topology.take().ok_or(SNNError::MissingTopology)?;
        let neuron_ids = self.neuron_ids();
        let num_synapses = self.num_synapses();

        info!(
            "Applying {} connectivity to {} neurons...",
            topology.name(),
            neuron_ids.len()
        );
        let result = topology.connect(&neuron_ids, self);
        info!(
            "{} connectivity created {} synapses",
            topology.name(),
            self.num_synapses() - num_synapses
        );

        self.topology = Some(topology);
        result
    }

    pub fn background_current(&self) -> f64 {
        self.background_current
    }

    /// Set the current injected into every neuron at the beginning of each step.
    pub fn set_background_current(&mut self, current: f64) {
        self.background_current = current;
    }

    /// Inject current into a neuron, to be integrated at the next step.
    pub fn inject_current(&mut self, id: NeuronId, current: f64) -> Result<(), SNNError> {
        self.neuron_mut(id)
            .ok_or(SNNError::NeuronNotFound(id))?
            .inject_current(current);
        Ok(())
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn recorder_mut(&mut self) -> &mut R {
        &mut self.recorder
    }

    /// Consume the network and return its recorder.
    pub fn into_recorder(self) -> R {
        self.recorder
    }

    /// Number of spike deliveries scheduled but not yet performed.
    pub fn num_pending_events(&self) -> usize {
        self.events.len()
    }

    /// Forget the past activity: drop the pending deliveries and mark every neuron as never fired.
    /// Potentials, synapses, weights and records are kept.
    pub fn reset(&mut self) {
        self.events.clear();
        for neuron in self.neurons.iter_mut() {
            neuron.set_last_spike_time(NEVER_FIRED);
        }
    }

    /// Run the simulation for `floor(t_max / dt)` steps of length `dt`, starting at time zero.
    ///
    /// Deliveries still pending at the end are kept, and so are the last spike times of the
    /// neurons. Since every run restarts the clock at zero, call [`Network::reset`] between runs
    /// unless the next run is meant to see them: stale deliveries would be performed at their old
    /// arrival times and plasticity would pair new spikes with old ones.
    pub fn run(&mut self, t_max: f64, dt: f64) -> Result<(), SNNError> {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(SNNError::InvalidParameter(
                "The time step must be positive and finite".to_string(),
            ));
        }
        if !(t_max >= 0.0 && t_max.is_finite()) {
            return Err(SNNError::InvalidParameter(
                "The simulation duration must be non-negative and finite".to_string(),
            ));
        }

        let num_steps = (t_max / dt).floor() as usize;
        let progress_interval = (num_steps / 100).max(1);

        info!(
            "Starting simulation of {} neurons and {} synapses for {} steps...",
            self.num_neurons(),
            self.num_synapses(),
            num_steps
        );

        for step in 0..num_steps {
            let time = step as f64 * dt;
            self.step(time, dt);

            if (step + 1) % progress_interval == 0 {
                debug!(
                    "Simulation progress: {:.0}% (time: {:.2}/{:.2} ms)",
                    100.0 * (step + 1) as f64 / num_steps as f64,
                    time + dt,
                    t_max
                );
            }
        }

        info!(
            "Simulation completed! {} deliveries still pending",
            self.events.len()
        );
        Ok(())
    }

    fn step(&mut self, time: f64, dt: f64) {
        if self.background_current != 0.0 {
            for neuron in self.neurons.iter_mut() {
                neuron.inject_current(self.background_current);
            }
        }

        for position in 0..self.neurons.len() {
            if self.neurons[position].step(dt, time) {
                self.handle_spike(position, time);
            }
        }

        while self.events.peek_time() <= time {
            match self.events.pop() {
                Ok(event) => self.deliver(event),
                Err(_) => break,
            }
        }
    }

    /// Record the spike of the neuron at the given position, schedule its deliveries and notify
    /// its incoming synapses. The record keeps the crossing time reported by the neuron while
    /// plasticity and delivery use the step time.
    fn handle_spike(&mut self, position: usize, time: f64) {
        let spike_time = self.neurons[position].last_spike_time();
        self.neurons[position].set_last_spike_time(time);

        let neuron = &self.neurons[position];
        self.recorder.record_spike(neuron.id(), spike_time);

        for &synapse_id in neuron.outgoing() {
            let delay = self.synapses[synapse_id].delay();
            self.events
                .push(SpikeEvent::new(time + delay, neuron.id(), synapse_id));
        }

        for &synapse_id in neuron.incoming() {
            let synapse = &mut self.synapses[synapse_id];
            match self.positions.get(&synapse.pre_id()) {
                Some(&pre_position) => synapse.deliver_spike_from_post(
                    &self.neurons[pre_position],
                    neuron,
                    time,
                    &mut self.recorder,
                ),
                None => trace!(
                    "Skipping notification of synapse {}: unknown presynaptic neuron",
                    synapse.label()
                ),
            }
        }
    }

    fn deliver(&mut self, event: SpikeEvent) {
        let Some(synapse) = self.synapses.get_mut(event.synapse_id) else {
            trace!("Skipping delivery to unknown synapse {}", event.synapse_id);
            return;
        };
        let (Some(&pre_position), Some(&post_position)) = (
            self.positions.get(&event.pre_id),
            self.positions.get(&synapse.post_id()),
        ) else {
            trace!("Skipping delivery along synapse {}", synapse.label());
            return;
        };

        let current = synapse.deliver_spike_from_pre(
            &self.neurons[pre_position],
            &self.neurons[post_position],
            event.time,
            &mut self.recorder,
        );
        if let Some(current) = current {
            self.neurons[post_position].inject_current(current);
        }
    }
}

impl<R: Recorder> Connector for Network<R> {
    fn connect_excitatory(
        &mut self,
        pre_id: NeuronId,
        post_id: NeuronId,
        weight: f64,
        delay: f64,
    ) -> Result<SynapseId, SNNError> {
        self.connect(pre_id, post_id, Polarity::Excitatory, weight, delay, StdpParams::default())
    }

    fn connect_inhibitory(
        &mut self,
        pre_id: NeuronId,
        post_id: NeuronId,
        weight: f64,
        delay: f64,
    ) -> Result<SynapseId, SNNError> {
        self.connect(pre_id, post_id, Polarity::Inhibitory, weight, delay, StdpParams::default())
    }
}
