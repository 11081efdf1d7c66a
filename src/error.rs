//! Error module for the plastic SNN library.
use std::error::Error;
use std::fmt;

use crate::core::neuron::NeuronId;

/// Error types for the library.
#[derive(Debug, PartialEq)]
pub enum SNNError {
    /// Error for an unrecognized neuron model selector.
    UnknownNeuronType(String),
    /// Error for an unrecognized connectivity strategy name.
    UnknownTopology(String),
    /// Error for a connection endpoint that does not belong to the network.
    NeuronNotFound(NeuronId),
    /// Error for invalid parameters, e.g., negative delay or inverted weight bounds.
    InvalidParameter(String),
    /// Applying the connectivity strategy while none is set.
    MissingTopology,
    /// Error for a topology incompatible with the number of neurons.
    IncompatibleTopology(String),
    /// Popping from an empty event queue.
    EmptyEventQueue,
    /// Error for I/O operations.
    IOError(String),
}

impl fmt::Display for SNNError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SNNError::UnknownNeuronType(e) => write!(f, "Unknown neuron type: {}", e),
            SNNError::UnknownTopology(e) => write!(f, "Unknown connectivity strategy: {}", e),
            SNNError::NeuronNotFound(id) => write!(f, "Neuron {} not found in the network", id),
            SNNError::InvalidParameter(e) => write!(f, "Invalid parameters: {}", e),
            SNNError::MissingTopology => write!(f, "No connectivity strategy has been set"),
            SNNError::IncompatibleTopology(e) => write!(f, "Incompatible topology: {}", e),
            SNNError::EmptyEventQueue => write!(f, "The event queue is empty"),
            SNNError::IOError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl Error for SNNError {}
