//! CrowNet: a biologically-inspired spiking neural network simulator.
//!
//! Neurons are physical entities positioned in a 16-dimensional Euclidean
//! space. They signal each other through spherically-expanding pulses of
//! finite propagation speed, learn by correlation-based weight updates,
//! reposition themselves ("synaptogenesis") based on neighbor activity, and
//! are globally modulated by two diffusing chemicals, cortisol and
//! dopamine. [`CrowNet::run_cycle`] advances the simulation by exactly one
//! discrete cycle; everything else is readout or configuration between
//! cycles.

pub mod chemistry;
pub mod config;
pub mod error;
pub mod network;
pub mod neuron;
pub mod pulse;
pub mod pulse_engine;
pub mod space;
pub mod spatial_index;
pub mod synaptogenesis;
pub mod weights;

pub use chemistry::ChemicalEnvironment;
pub use config::NetworkConfig;
pub use error::CrowNetError;
pub use network::CrowNet;
pub use neuron::{Neuron, NeuronId, NeuronState, NeuronType};
pub use pulse::Pulse;
pub use space::{Vec16, DIMENSIONS};
pub use weights::WeightMatrix;
