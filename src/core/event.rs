//! Spike events and the time-ordered queue holding them until delivery.
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::core::neuron::NeuronId;
use crate::core::synapse::SynapseId;
use crate::error::SNNError;

/// A spike travelling along a synapse, delivered once the clock reaches its arrival time.
/// The event only carries ids; they are resolved against the network at delivery time.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct SpikeEvent {
    /// The time at which the spike reaches the postsynaptic neuron.
    pub time: f64,
    /// The ID of the neuron which emitted the spike.
    pub pre_id: NeuronId,
    /// The ID of the synapse carrying the spike.
    pub synapse_id: SynapseId,
}

impl SpikeEvent {
    pub fn new(time: f64, pre_id: NeuronId, synapse_id: SynapseId) -> Self {
        SpikeEvent {
            time,
            pre_id,
            synapse_id,
        }
    }
}

// Heap entry: earliest time first, then insertion order.
#[derive(Debug)]
struct QueuedEvent {
    event: SpikeEvent,
    seq: u64,
}

impl PartialEq for QueuedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedEvent {}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, hence the reversed comparisons.
        other
            .event
            .time
            .total_cmp(&self.event.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A priority queue of spike events ordered by arrival time.
///
/// Events sharing the exact same arrival time are popped in insertion order.
/// This makes runs reproducible but is not part of the ordering contract.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<QueuedEvent>,
    next_seq: u64,
}

impl EventQueue {
    /// Create a new empty event queue.
    pub fn new() -> Self {
        EventQueue::default()
    }

    /// Insert an event in the queue.
    pub fn push(&mut self, event: SpikeEvent) {
        self.heap.push(QueuedEvent {
            event,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    /// Remove and return the earliest event.
    /// Returns an error if the queue is empty.
    pub fn pop(&mut self) -> Result<SpikeEvent, SNNError> {
        self.heap
            .pop()
            .map(|queued| queued.event)
            .ok_or(SNNError::EmptyEventQueue)
    }

    /// Returns the arrival time of the earliest event, or infinity if the queue is empty.
    pub fn peek_time(&self) -> f64 {
        self.heap
            .peek()
            .map_or(f64::INFINITY, |queued| queued.event.time)
    }

    /// Returns the number of pending events.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if no event is pending.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drop all pending events.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_pop_empty() {
        let mut queue = EventQueue::new();
        assert_eq!(queue.pop(), Err(SNNError::EmptyEventQueue));
        assert_eq!(queue.peek_time(), f64::INFINITY);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_pop_order() {
        let mut queue = EventQueue::new();
        queue.push(SpikeEvent::new(3.0, 1, 0));
        queue.push(SpikeEvent::new(1.0, 2, 1));
        queue.push(SpikeEvent::new(2.5, 3, 2));
        queue.push(SpikeEvent::new(0.5, 4, 3));

        assert_eq!(queue.len(), 4);
        assert_eq!(queue.peek_time(), 0.5);
        assert_eq!(queue.pop(), Ok(SpikeEvent::new(0.5, 4, 3)));
        assert_eq!(queue.pop(), Ok(SpikeEvent::new(1.0, 2, 1)));
        assert_eq!(queue.pop(), Ok(SpikeEvent::new(2.5, 3, 2)));
        assert_eq!(queue.pop(), Ok(SpikeEvent::new(3.0, 1, 0)));
        assert_eq!(queue.pop(), Err(SNNError::EmptyEventQueue));
    }

    #[test]
    fn test_pop_non_decreasing() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut queue = EventQueue::new();
        for i in 0..500 {
            queue.push(SpikeEvent::new(rng.gen_range(0.0..100.0), i, i));
        }

        let mut last = f64::NEG_INFINITY;
        while !queue.is_empty() {
            let event = queue.pop().unwrap();
            assert!(event.time >= last);
            last = event.time;
        }
    }

    #[test]
    fn test_ties_pop_in_insertion_order() {
        let mut queue = EventQueue::new();
        queue.push(SpikeEvent::new(2.0, 0, 10));
        queue.push(SpikeEvent::new(1.0, 0, 11));
        queue.push(SpikeEvent::new(2.0, 0, 12));
        queue.push(SpikeEvent::new(2.0, 0, 13));

        let order: Vec<usize> = std::iter::from_fn(|| queue.pop().ok())
            .map(|event| event.synapse_id)
            .collect();
        assert_eq!(order, [11, 10, 12, 13]);
    }

    #[test]
    fn test_clear() {
        let mut queue = EventQueue::new();
        queue.push(SpikeEvent::new(2.0, 0, 0));
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.peek_time(), f64::INFINITY);
    }
}
