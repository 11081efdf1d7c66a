//! Concrete neuron models.
//!
//! - [`lif`]: leaky integrate-and-fire neuron, integrated with one Euler step per simulation step
//! - [`izhikevich`]: two-variable Izhikevich neuron, integrated with finer internal sub-steps
pub mod izhikevich;
pub mod lif;
