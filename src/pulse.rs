//! The pulse: an expanding spherical shell.

use crate::neuron::NeuronId;
use crate::space::Vec16;

/// A single propagating pulse. The emitter id is kept only for
/// attribution — delivery itself excludes the emitter by id, not by
/// geometry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pulse {
    pub emitter: NeuronId,
    pub origin: Vec16,
    /// Signed magnitude this pulse delivers on hit, before weighting.
    pub magnitude: f64,
    pub created_cycle: u64,
    pub radius: f64,
    pub max_range: f64,
}

impl Pulse {
    pub fn new(emitter: NeuronId, origin: Vec16, magnitude: f64, created_cycle: u64, max_range: f64) -> Self {
        Self {
            emitter,
            origin,
            magnitude,
            created_cycle,
            radius: 0.0,
            max_range,
        }
    }

    /// Advance the shell by `speed`, returning `(prev_radius, new_radius)`.
    pub fn advance(&mut self, speed: f64) -> (f64, f64) {
        let prev = self.radius;
        self.radius += speed;
        (prev, self.radius)
    }

    pub fn is_expired(&self) -> bool {
        self.radius > self.max_range
    }
}
