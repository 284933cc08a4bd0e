//! Per-cycle pulse propagation and delivery.
//!
//! Advances every active pulse's shell by one step, delivers weighted
//! potential to whatever falls in the freshly-swept annulus, retires pulses
//! past their max range, and promotes any neuron that crosses threshold
//! mid-delivery into a deferred firing buffer. The deferred pulses those
//! firings emit are appended only after every pre-existing pulse has
//! finished propagating this cycle, so nothing delivers in the cycle it was
//! born in.

use crate::config::NetworkConfig;
use crate::neuron::{Neuron, NeuronId};
use crate::pulse::Pulse;
use crate::space::distance;
use crate::spatial_index::UniformGrid;
use crate::weights::WeightMatrix;

/// Outcome of one propagation pass, handed back to the orchestrator.
pub struct PulseDeliveryResult {
    /// Count of excitatory pulses whose shell swept the cortisol gland
    /// point this cycle.
    pub gland_hits: u32,
    /// Neurons that crossed threshold as a direct result of delivery this
    /// cycle, in id order.
    pub newly_fired: Vec<NeuronId>,
}

/// Whether `d` falls in the half-open shell swept this step. The emitter
/// itself is excluded by id at the call site, not by this check, since at
/// `prev_radius == 0` the emitter's own distance of zero would otherwise
/// count as a hit.
fn in_shell(d: f64, prev_radius: f64, new_radius: f64) -> bool {
    d >= prev_radius && d < new_radius
}

/// Per-pulse contribution: the gland hit flag plus a sparse list of
/// `(neuron_index, delta)` pairs for whatever this pulse's shell struck.
/// Computed independently per pulse so the `parallel` feature can fan this
/// step out across `rayon` without any shared mutable state; the actual
/// potential writes happen afterward, reduced by addition.
struct PulseContribution {
    gland_hit: bool,
    deltas: Vec<(usize, f64)>,
}

fn deliver_one(pulse: &Pulse, prev_radius: f64, new_radius: f64, neurons: &[Neuron], weights: &WeightMatrix, index: &UniformGrid, gland_point: &crate::space::Vec16) -> PulseContribution {
    let gland_hit = pulse.magnitude > 0.0 && in_shell(distance(&pulse.origin, gland_point), prev_radius, new_radius);

    let mut deltas = Vec::new();
    for hit in index.query_shell(&pulse.origin, prev_radius, new_radius) {
        if hit == pulse.emitter {
            continue;
        }
        let idx = hit.raw() as usize;
        let d = distance(&neurons[idx].position, &pulse.origin);
        if !in_shell(d, prev_radius, new_radius) {
            continue;
        }
        let w = weights.get(pulse.emitter, hit);
        deltas.push((idx, pulse.magnitude * w));
    }

    PulseContribution { gland_hit, deltas }
}

/// Run one propagation step over every active pulse: advance, deliver,
/// retire. `pulses` is left containing only the still-active pulses plus
/// any newly emitted ones from this cycle's threshold crossings.
pub fn run(
    pulses: &mut Vec<Pulse>,
    neurons: &mut [Neuron],
    weights: &WeightMatrix,
    index: &UniformGrid,
    network: &NetworkConfig,
    current_cycle: u64,
) -> PulseDeliveryResult {
    let gland_point = crate::space::Vec16(network.gland_point);

    let shells: Vec<(f64, f64)> = pulses.iter_mut().map(|p| p.advance(network.pulse_propagation_speed)).collect();
    let neurons_ref: &[Neuron] = neurons;

    #[cfg(feature = "parallel")]
    let contributions: Vec<PulseContribution> = {
        use rayon::prelude::*;
        pulses
            .par_iter()
            .zip(shells.par_iter())
            .map(|(pulse, &(prev, new))| deliver_one(pulse, prev, new, neurons_ref, weights, index, &gland_point))
            .collect()
    };
    #[cfg(not(feature = "parallel"))]
    let contributions: Vec<PulseContribution> = pulses
        .iter()
        .zip(shells.iter())
        .map(|(pulse, &(prev, new))| deliver_one(pulse, prev, new, neurons_ref, weights, index, &gland_point))
        .collect();

    let mut gland_hits = 0u32;
    for contribution in &contributions {
        if contribution.gland_hit {
            gland_hits += 1;
        }
        for &(idx, delta) in &contribution.deltas {
            neurons[idx].integrate(delta);
        }
    }

    pulses.retain(|p| !p.is_expired());

    let mut newly_fired = Vec::new();
    for n in neurons.iter_mut() {
        if n.can_fire_by_threshold() && n.potential >= n.current_threshold && n.force_fire(current_cycle) {
            newly_fired.push(n.id);
        }
    }

    for &id in &newly_fired {
        let n = &neurons[id.raw() as usize];
        let sign = n.emitted_sign();
        if sign == 0 {
            // Dopaminergic firings modulate chemistry only, never potential.
            continue;
        }
        let magnitude = network.pulse_strength * sign as f64;
        pulses.push(Pulse::new(id, n.position, magnitude, current_cycle, network.pulse_max_range()));
    }

    PulseDeliveryResult { gland_hits, newly_fired }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neuron::NeuronType;
    use crate::space::Vec16;

    fn network() -> NetworkConfig {
        let mut cfg = NetworkConfig::default_for(10);
        cfg.pulse_propagation_speed = 0.6;
        cfg.pulse_strength = 1.0;
        cfg
    }

    #[test]
    fn pulse_reaches_receiver_after_two_propagation_steps_and_triggers_firing() {
        let network = network();
        let mut neurons = vec![
            Neuron::new(NeuronId(0), NeuronType::Excitatory, Vec16::ZERO, 0.5),
            {
                let mut coords = [0.0; crate::space::DIMENSIONS];
                coords[0] = 1.0;
                Neuron::new(NeuronId(1), NeuronType::Excitatory, Vec16(coords), 0.2)
            },
        ];
        neurons[0].potential = 1.0;
        neurons[0].force_fire(0);

        let mut weights = WeightMatrix::new(2.0);
        weights.set(NeuronId(0), NeuronId(1), 1.0);

        let mut index = UniformGrid::new(network.default_cell_size());
        index.build(&neurons);

        let mut pulses = vec![Pulse::new(NeuronId(0), neurons[0].position, 1.0, 0, network.pulse_max_range())];

        // cycle 1: advance_state would move neuron 0 Firing -> AbsoluteRefractory
        // outside this module; here we only exercise propagation.
        let result = run(&mut pulses, &mut neurons, &weights, &index, &network, 1);
        assert_eq!(neurons[1].potential, 0.0, "receiver not yet in shell after first hop");
        assert!(result.newly_fired.is_empty());
        assert_eq!(pulses.len(), 1);
        assert!((pulses[0].radius - 0.6).abs() < 1e-9);

        // cycle 2: shell advances to (0.6, 1.2), receiver at distance 1.0 is hit
        let result = run(&mut pulses, &mut neurons, &weights, &index, &network, 2);
        assert_eq!(neurons[1].potential, 1.0);
        assert_eq!(result.newly_fired, vec![NeuronId(1)]);
        assert_eq!(pulses.len(), 2, "original pulse plus the receiver's new one");
    }

    #[test]
    fn emitter_never_receives_its_own_pulse() {
        let network = network();
        let mut neurons = vec![Neuron::new(NeuronId(0), NeuronType::Excitatory, Vec16::ZERO, 0.1)];
        let weights = WeightMatrix::new(2.0);
        let mut index = UniformGrid::new(network.default_cell_size());
        index.build(&neurons);
        let mut pulses = vec![Pulse::new(NeuronId(0), Vec16::ZERO, 1.0, 0, network.pulse_max_range())];

        run(&mut pulses, &mut neurons, &weights, &index, &network, 1);
        assert_eq!(neurons[0].potential, 0.0);
    }

    #[test]
    fn expired_pulses_are_retired() {
        let mut network = network();
        network.space_max_dimension = 1.0;
        network.pulse_max_range_factor = 1.0;
        let mut neurons = vec![Neuron::new(NeuronId(0), NeuronType::Excitatory, Vec16::ZERO, 0.1)];
        let weights = WeightMatrix::new(2.0);
        let mut index = UniformGrid::new(network.default_cell_size());
        index.build(&neurons);
        let mut pulses = vec![Pulse::new(NeuronId(0), Vec16::ZERO, 1.0, 0, 0.5)];

        run(&mut pulses, &mut neurons, &weights, &index, &network, 1);
        assert!(pulses.is_empty());
    }

    #[test]
    fn dopaminergic_firing_emits_no_pulse() {
        let network = network();
        let mut neurons = vec![Neuron::new(NeuronId(0), NeuronType::Dopaminergic, Vec16::ZERO, 0.1)];
        neurons[0].potential = 1.0;
        let weights = WeightMatrix::new(2.0);
        let mut index = UniformGrid::new(network.default_cell_size());
        index.build(&neurons);
        let mut pulses = Vec::new();

        let result = run(&mut pulses, &mut neurons, &weights, &index, &network, 1);
        assert_eq!(result.newly_fired, vec![NeuronId(0)]);
        assert!(pulses.is_empty());
    }
}
