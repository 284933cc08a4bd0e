//! Physical repositioning driven by neighbor activity.
//!
//! Every neuron feels an attractive pull toward active neighbors and a
//! repulsive push away from resting ones, integrates that into a damped
//! velocity, and moves — all computed from a single snapshot of the
//! previous cycle's positions so the pass has no intra-cycle order bias.

use crate::config::SynaptogenesisConfig;
use crate::neuron::{Neuron, NeuronState};
use crate::space::{clamp_to_hypersphere, Vec16};
use crate::spatial_index::UniformGrid;

/// Net force and resulting (velocity, position) for one neuron, computed
/// from the pre-step snapshot. Buffered so every neuron reads the same
/// snapshot before any write lands.
struct Update {
    velocity: Vec16,
    position: Vec16,
}

fn net_force(n: &Neuron, index: &UniformGrid, neurons: &[Neuron], cfg: &SynaptogenesisConfig, modulation: f64) -> Vec16 {
    let mut force = Vec16::ZERO;
    for partner_id in index.query_ball(&n.position, cfg.influence_radius) {
        if partner_id == n.id {
            continue;
        }
        let partner = &neurons[partner_id.raw() as usize];
        let d = n.position.distance(&partner.position);
        if d > cfg.influence_radius {
            continue;
        }
        let signed_magnitude = match partner.state {
            NeuronState::Firing | NeuronState::AbsoluteRefractory | NeuronState::RelativeRefractory => {
                cfg.attraction_factor * modulation
            }
            NeuronState::Resting => -(cfg.repulsion_factor * modulation),
        };
        let direction = n.position.direction_to(&partner.position);
        force += direction.scale(signed_magnitude);
    }
    force
}

fn compute_update(n: &Neuron, index: &UniformGrid, neurons: &[Neuron], cfg: &SynaptogenesisConfig, space_max_dimension: f64, modulation: f64) -> Update {
    let force = net_force(n, index, neurons, cfg, modulation);
    let mut velocity = n.velocity.scale(cfg.dampening_factor) + force;
    let speed = velocity.norm();
    if speed > cfg.max_movement_per_cycle && speed > 0.0 {
        velocity = velocity.scale(cfg.max_movement_per_cycle / speed);
    }
    let position = clamp_to_hypersphere(n.position + velocity, space_max_dimension);
    Update { velocity, position }
}

/// Run one synaptogenesis step over every neuron. The caller is
/// responsible for gating this on `synaptogenesis_mod > modulation_floor`
/// and rebuilding the spatial index afterward. Force computation reads
/// only the pre-step snapshot, so with the `parallel`
/// feature enabled it runs per-neuron on the rayon global pool; the
/// write-back below stays serial since it's where the buffer is applied.
pub fn run(neurons: &mut [Neuron], index: &UniformGrid, cfg: &SynaptogenesisConfig, space_max_dimension: f64, modulation: f64) {
    #[cfg(feature = "parallel")]
    let updates: Vec<Update> = {
        use rayon::prelude::*;
        neurons.par_iter().map(|n| compute_update(n, index, neurons, cfg, space_max_dimension, modulation)).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let updates: Vec<Update> = neurons.iter().map(|n| compute_update(n, index, neurons, cfg, space_max_dimension, modulation)).collect();

    for (n, update) in neurons.iter_mut().zip(updates) {
        n.velocity = update.velocity;
        n.position = update.position;
    }
}
