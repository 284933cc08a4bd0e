//! The cycle orchestrator: owns every sub-system and runs the
//! fixed per-cycle sequence, plus the external input/output surface.

use crate::chemistry::ChemicalEnvironment;
use crate::config::NetworkConfig;
use crate::error::CrowNetError;
use crate::neuron::{Neuron, NeuronId, NeuronState, NeuronType};
use crate::pulse::Pulse;
use crate::pulse_engine;
use crate::space::{random_in_hypersphere, Vec16};
use crate::spatial_index::UniformGrid;
use crate::synaptogenesis;
use crate::weights::WeightMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet, VecDeque};

struct FrequencySchedule {
    hz: f64,
    countdown: u64,
}

/// A fully constructed, runnable network. Owns its neurons, pulses, weight
/// matrix, chemical environment, spatial index, and RNG. `run_cycle` is the
/// only mutator that advances simulated time.
pub struct CrowNet {
    config: NetworkConfig,
    neurons: Vec<Neuron>,
    pulses: Vec<Pulse>,
    weights: WeightMatrix,
    chemistry: ChemicalEnvironment,
    index: UniformGrid,
    rng: StdRng,
    current_cycle: u64,
    input_ids: Vec<NeuronId>,
    output_ids: Vec<NeuronId>,
    frequency_schedules: HashMap<NeuronId, FrequencySchedule>,
    pending_forced_inputs: Vec<NeuronId>,
    output_firing_history: HashMap<NeuronId, VecDeque<u64>>,
    learning_enabled: bool,
    synaptogenesis_enabled: bool,
    chemical_enabled: bool,
}

impl CrowNet {
    /// Construct a network from `config`, validating it first.
    /// Population is type-stratified in construction order so the sorted
    /// input/output id lists fall out as contiguous, already-sorted ranges.
    pub fn new(config: NetworkConfig) -> Result<Self, CrowNetError> {
        config.validate()?;

        let mut rng = StdRng::seed_from_u64(config.rng_seed);

        let input_count = config.min_input_neurons;
        let output_count = config.min_output_neurons;
        let remaining = config.total_neurons - input_count - output_count;
        let dopaminergic_count = (remaining as f64 * config.dopaminergic_fraction).round() as usize;
        let inhibitory_count = (remaining as f64 * config.inhibitory_fraction).round() as usize;
        let excitatory_count = remaining.saturating_sub(dopaminergic_count + inhibitory_count);

        let mut kinds = Vec::with_capacity(config.total_neurons);
        kinds.extend(std::iter::repeat(NeuronType::Input).take(input_count));
        kinds.extend(std::iter::repeat(NeuronType::Output).take(output_count));
        kinds.extend(std::iter::repeat(NeuronType::Dopaminergic).take(dopaminergic_count));
        kinds.extend(std::iter::repeat(NeuronType::Inhibitory).take(inhibitory_count));
        kinds.extend(std::iter::repeat(NeuronType::Excitatory).take(excitatory_count));
        while kinds.len() < config.total_neurons {
            kinds.push(NeuronType::Excitatory);
        }

        let mut neurons = Vec::with_capacity(config.total_neurons);
        for (i, kind) in kinds.into_iter().enumerate() {
            let radius = config.radius_factors.for_type(kind) * config.space_max_dimension;
            let position = random_in_hypersphere(radius, &mut rng);
            neurons.push(Neuron::new(NeuronId(i as u32), kind, position, config.base_threshold));
        }

        let mut weights = WeightMatrix::new(config.hebbian.max_weight);
        for pre in 0..neurons.len() as u32 {
            for post in 0..neurons.len() as u32 {
                if pre == post {
                    continue;
                }
                let w = rng.gen_range(config.initial_weight_min..=config.initial_weight_max);
                weights.set(NeuronId(pre), NeuronId(post), w);
            }
        }

        let mut index = UniformGrid::new(config.default_cell_size());
        index.build(&neurons);

        let input_ids = (0..input_count as u32).map(NeuronId).collect();
        let output_ids = (input_count as u32..(input_count + output_count) as u32).map(NeuronId).collect();

        Ok(Self {
            config,
            neurons,
            pulses: Vec::new(),
            weights,
            chemistry: ChemicalEnvironment::default(),
            index,
            rng,
            current_cycle: 0,
            input_ids,
            output_ids,
            frequency_schedules: HashMap::new(),
            pending_forced_inputs: Vec::new(),
            output_firing_history: HashMap::new(),
            learning_enabled: true,
            synaptogenesis_enabled: true,
            chemical_enabled: true,
        })
    }

    /// The cycle number about to run (or just completed, depending on when
    /// a caller inspects it between calls to `run_cycle`).
    pub fn cycle(&self) -> u64 {
        self.current_cycle
    }

    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    pub fn input_ids(&self) -> &[NeuronId] {
        &self.input_ids
    }

    pub fn output_ids(&self) -> &[NeuronId] {
        &self.output_ids
    }

    /// Largest position norm across every neuron; a cheap way for callers
    /// (tests, diagnostics) to check the clamping-hypersphere invariant
    /// without exposing the neuron arena directly.
    pub fn max_position_norm(&self) -> f64 {
        self.neurons.iter().map(|n| n.position.norm()).fold(0.0, f64::max)
    }

    /// The stored weight for `pre -> post`, or zero if unset.
    pub fn weight(&self, pre: NeuronId, post: NeuronId) -> f64 {
        self.weights.get(pre, post)
    }

    /// A neuron's current (chemically-modulated) firing threshold.
    pub fn current_threshold(&self, id: NeuronId) -> f64 {
        self.neurons[id.raw() as usize].current_threshold
    }

    pub fn cortisol(&self) -> f64 {
        self.chemistry.cortisol
    }

    pub fn dopamine(&self) -> f64 {
        self.chemistry.dopamine
    }

    fn emit_pulse_for(&mut self, id: NeuronId) {
        let n = &self.neurons[id.raw() as usize];
        let sign = n.emitted_sign();
        if sign == 0 {
            return;
        }
        let magnitude = self.config.pulse_strength * sign as f64;
        self.pulses.push(Pulse::new(id, n.position, magnitude, self.current_cycle, self.config.pulse_max_range()));
    }

    /// Present an input pattern; one value per input neuron in sorted-id
    /// order. Values above 0.5 are queued to force their neuron into
    /// `Firing` at the start of the next `run_cycle` call.
    pub fn present_pattern(&mut self, values: &[f64]) -> Result<(), CrowNetError> {
        if values.len() != self.input_ids.len() {
            return Err(CrowNetError::PatternSizeMismatch {
                expected: self.input_ids.len(),
                got: values.len(),
            });
        }
        for (id, &v) in self.input_ids.clone().iter().zip(values) {
            if v > 0.5 {
                self.pending_forced_inputs.push(*id);
            }
        }
        Ok(())
    }

    /// Install or remove a periodic firing schedule on an input neuron.
    /// `hz <= 0` removes any existing schedule.
    pub fn configure_frequency_input(&mut self, id: NeuronId, hz: f64) -> Result<(), CrowNetError> {
        if !self.input_ids.contains(&id) {
            return Err(CrowNetError::InvalidId(id.raw()));
        }
        if hz <= 0.0 {
            self.frequency_schedules.remove(&id);
            return Ok(());
        }
        let base = (self.config.cycles_per_second / hz).round().max(1.0) as u64;
        let jitter_max = (base / 20).max(0);
        let jitter = if jitter_max > 0 { self.rng.gen_range(0..=jitter_max) } else { 0 };
        self.frequency_schedules.insert(id, FrequencySchedule { hz, countdown: base + jitter });
        Ok(())
    }

    pub fn get_output_activation(&self) -> Vec<f64> {
        self.output_ids.iter().map(|id| self.neurons[id.raw() as usize].potential).collect()
    }

    /// Firing rate of output neuron `id` over the configured window.
    pub fn get_output_frequency(&self, id: NeuronId) -> Result<f64, CrowNetError> {
        if !self.output_ids.contains(&id) {
            return Err(CrowNetError::InvalidId(id.raw()));
        }
        if self.config.cycles_per_second <= 0.0 {
            return Err(CrowNetError::MissingParameter("cycles_per_second"));
        }
        if self.config.output_frequency_window_cycles == 0 {
            return Err(CrowNetError::MissingParameter("output_frequency_window_cycles"));
        }
        let count = self.output_firing_history.get(&id).map(|h| h.len()).unwrap_or(0);
        let window_seconds = self.config.output_frequency_window_cycles as f64 / self.config.cycles_per_second;
        Ok(count as f64 / window_seconds)
    }

    /// Zero potentials and clear active pulses; weights, positions, firing
    /// histories and chemical levels are untouched.
    pub fn reset_transient_state(&mut self) {
        for n in &mut self.neurons {
            n.potential = 0.0;
        }
        self.pulses.clear();
    }

    pub fn set_dynamics(&mut self, learning: bool, synaptogenesis: bool, chemical: bool) {
        self.learning_enabled = learning;
        self.synaptogenesis_enabled = synaptogenesis;
        self.chemical_enabled = chemical;
    }

    fn record_output_firing(&mut self, id: NeuronId) {
        if !self.output_ids.contains(&id) {
            return;
        }
        self.output_firing_history.entry(id).or_default().push_back(self.current_cycle);
    }

    /// Age every output neuron's firing history out of the configured
    /// window. Run unconditionally once per cycle so a stretch with no new
    /// firings still ages old entries out instead of leaving a stale,
    /// inflated frequency readout frozen during any quiet period. An entry
    /// exactly `window` cycles old is still counted, so the cutoff is a
    /// strict `>`.
    fn prune_output_firing_histories(&mut self) {
        let window = self.config.output_frequency_window_cycles;
        let current_cycle = self.current_cycle;
        for history in self.output_firing_history.values_mut() {
            while let Some(&front) = history.front() {
                if current_cycle.saturating_sub(front) > window {
                    history.pop_front();
                } else {
                    break;
                }
            }
        }
    }

    fn run_hebbian_pass(&mut self) {
        let cfg = &self.config.hebbian;
        let effective_rate = cfg.base_rate * self.chemistry.learning_rate_modulation(&self.config);
        if effective_rate < cfg.rate_floor {
            return;
        }
        let window = cfg.coincidence_window;
        let cycle = self.current_cycle;
        let recently_active: Vec<NeuronId> = self
            .neurons
            .iter()
            .filter(|n| matches!(n.last_fired_cycle, Some(c) if cycle.saturating_sub(c) <= window))
            .map(|n| n.id)
            .collect();
        let recently_active_set: HashSet<NeuronId> = recently_active.iter().copied().collect();

        for &pre in &recently_active {
            for post in 0..self.neurons.len() as u32 {
                let post = NeuronId(post);
                if post == pre {
                    continue;
                }
                let post_act = if recently_active_set.contains(&post) { 1.0 } else { 0.0 };
                self.weights.apply_hebbian_update(
                    pre,
                    post,
                    1.0,
                    post_act,
                    effective_rate,
                    cfg.positive_reinforcement_factor,
                    cfg.weight_decay,
                );
            }
        }
    }

    /// Run exactly one simulation cycle through the fixed per-cycle
    /// sequence: forced/scheduled inputs, decay and state advancement,
    /// pulse propagation, output history bookkeeping, chemical update,
    /// Hebbian learning, then synaptogenesis.
    pub fn run_cycle(&mut self) {
        log::trace!("cycle {} starting", self.current_cycle);

        // Step 1: periodic/frequency inputs, merged with any queued
        // `present_pattern` forcing. Both bypass this cycle's threshold
        // check entirely rather than being force-fired and
        // then immediately re-processed by this same cycle's
        // `advance_state` pass, which would cut their Firing state short
        // by one cycle.
        let mut due: Vec<NeuronId> = self.pending_forced_inputs.drain(..).collect();
        for (&id, sched) in self.frequency_schedules.iter_mut() {
            if sched.countdown == 0 {
                due.push(id);
            } else {
                sched.countdown -= 1;
            }
        }
        let forced_ids: HashSet<NeuronId> = due.iter().copied().collect();
        for id in &forced_ids {
            if let Some(sched) = self.frequency_schedules.get_mut(id) {
                let countdown = (self.config.cycles_per_second / sched.hz).round().max(1.0) as u64;
                sched.countdown = countdown;
            }
        }

        // Step 2: decay + state advancement, skipping neurons forced above.
        let mut natural_newly_fired = Vec::new();
        for n in &mut self.neurons {
            if forced_ids.contains(&n.id) {
                continue;
            }
            n.decay_potential(self.config.potential_decay_rate);
            if n.advance_state(self.current_cycle, self.config.abs_refractory_cycles, self.config.rel_refractory_cycles) {
                natural_newly_fired.push(n.id);
            }
        }

        for &id in &forced_ids {
            self.neurons[id.raw() as usize].force_fire(self.current_cycle);
            self.emit_pulse_for(id);
        }
        for &id in &natural_newly_fired {
            self.emit_pulse_for(id);
        }

        log::debug!("cycle {}: {} forced, {} naturally fired", self.current_cycle, forced_ids.len(), natural_newly_fired.len());

        // Step 3: pulse propagation and delivery.
        let result = pulse_engine::run(&mut self.pulses, &mut self.neurons, &self.weights, &self.index, &self.config, self.current_cycle);
        log::trace!("cycle {}: {} gland hits, {} fired on delivery, {} pulses active", self.current_cycle, result.gland_hits, result.newly_fired.len(), self.pulses.len());

        // Step 4: output firing history, across every promotion this cycle,
        // then age every history out of the window regardless of whether
        // this cycle produced a new firing.
        for &id in forced_ids.iter().chain(natural_newly_fired.iter()).chain(result.newly_fired.iter()) {
            self.record_output_firing(id);
        }
        self.prune_output_firing_histories();

        // Step 5: chemical update. Disabling this gate skips production/decay
        // entirely for the cycle; chemical levels still persist across
        // cycles (they are not reset), and thresholds below fall back to
        // their base values instead of being derived from whatever level
        // happens to be sitting in the environment.
        if self.chemical_enabled {
            let firing_dopaminergic = self
                .neurons
                .iter()
                .filter(|n| n.kind == NeuronType::Dopaminergic && n.state == NeuronState::Firing)
                .count() as u32;
            self.chemistry.update_cortisol(result.gland_hits, &self.config.cortisol);
            self.chemistry.update_dopamine(firing_dopaminergic, &self.config.dopamine);
        }
        for n in &mut self.neurons {
            n.current_threshold = if self.chemical_enabled {
                self.chemistry.apply_threshold(n.base_threshold, &self.config)
            } else {
                n.base_threshold.max(self.config.threshold_floor)
            };
        }

        // Step 6: Hebbian pass.
        if self.learning_enabled {
            self.run_hebbian_pass();
        }

        // Step 7: synaptogenesis + index rebuild.
        let modulation = if self.chemical_enabled {
            self.chemistry.synaptogenesis_modulation(&self.config)
        } else {
            1.0
        };
        if self.synaptogenesis_enabled && modulation > self.config.synaptogenesis.modulation_floor {
            synaptogenesis::run(&mut self.neurons, &self.index, &self.config.synaptogenesis, self.config.space_max_dimension, modulation);
            self.index.build(&self.neurons);
        }

        // Step 8: advance the cycle counter.
        self.current_cycle += 1;
        log::trace!("cycle {} complete: cortisol={:.3} dopamine={:.3}", self.current_cycle - 1, self.chemistry.cortisol, self.chemistry.dopamine);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_respects_population_and_id_lists() {
        let cfg = NetworkConfig::default_for(30);
        let net = CrowNet::new(cfg).expect("valid config");
        assert_eq!(net.neuron_count(), 30);
        assert_eq!(net.input_ids().len(), 1);
        assert_eq!(net.output_ids().len(), 1);
        assert!(net.input_ids()[0].raw() < net.output_ids()[0].raw());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut cfg = NetworkConfig::default_for(1);
        cfg.min_input_neurons = 5;
        assert!(CrowNet::new(cfg).is_err());
    }

    #[test]
    fn present_pattern_rejects_wrong_length() {
        let cfg = NetworkConfig::default_for(10);
        let mut net = CrowNet::new(cfg).unwrap();
        let err = net.present_pattern(&[1.0, 0.0]).unwrap_err();
        assert!(matches!(err, CrowNetError::PatternSizeMismatch { .. }));
    }

    #[test]
    fn invariants_hold_after_many_cycles() {
        let cfg = NetworkConfig::default_for(40);
        let mut net = CrowNet::new(cfg.clone()).unwrap();
        for _ in 0..25 {
            net.run_cycle();
        }
        assert_eq!(net.neuron_count(), 40);
        for n in &net.neurons {
            assert!(n.position.norm() <= cfg.space_max_dimension + 1e-6);
            assert!(n.current_threshold >= cfg.threshold_floor - 1e-12);
        }
        assert!(net.chemistry.cortisol >= 0.0 && net.chemistry.cortisol <= cfg.cortisol.max);
        assert!(net.chemistry.dopamine >= 0.0 && net.chemistry.dopamine <= cfg.dopamine.max);
        for p in &net.pulses {
            assert!(p.radius <= p.max_range);
        }
    }

    #[test]
    fn disabled_dynamics_freeze_weights_and_positions() {
        let cfg = NetworkConfig::default_for(20);
        let mut net = CrowNet::new(cfg).unwrap();
        net.set_dynamics(false, false, false);
        let positions_before: Vec<_> = net.neurons.iter().map(|n| n.position).collect();
        let id0 = net.neurons[0].id;
        let id1 = net.neurons[1].id;
        let weight_before = net.weights.get(id0, id1);

        for _ in 0..10 {
            net.run_cycle();
        }

        let positions_after: Vec<_> = net.neurons.iter().map(|n| n.position).collect();
        assert_eq!(positions_before, positions_after);
        assert_eq!(weight_before, net.weights.get(id0, id1));
    }

    #[test]
    fn reset_transient_state_clears_potential_and_pulses_only() {
        let cfg = NetworkConfig::default_for(10);
        let mut net = CrowNet::new(cfg).unwrap();
        net.neurons[0].potential = 5.0;
        net.pulses.push(Pulse::new(NeuronId(0), Vec16::ZERO, 1.0, 0, 10.0));
        let weight_before = net.weights.get(NeuronId(0), NeuronId(1));

        net.reset_transient_state();

        assert_eq!(net.neurons[0].potential, 0.0);
        assert!(net.pulses.is_empty());
        assert_eq!(net.weights.get(NeuronId(0), NeuronId(1)), weight_before);
    }

    /// Windowing boundary: a firing exactly `window` cycles old is still
    /// counted, one cycle older is evicted, and aging happens even across a
    /// stretch with no new firings.
    #[test]
    fn output_frequency_window_ages_out_stale_firings() {
        let mut cfg = NetworkConfig::default_for(10);
        cfg.cycles_per_second = 10.0;
        cfg.output_frequency_window_cycles = 20;
        let mut net = CrowNet::new(cfg).unwrap();
        let id = net.output_ids()[0];

        for &cycle in &[60u64, 70, 80, 90, 100] {
            net.output_firing_history.entry(id).or_default().push_back(cycle);
        }

        net.current_cycle = 110;
        net.prune_output_firing_histories();
        let remaining: Vec<u64> = net.output_firing_history.get(&id).unwrap().iter().copied().collect();
        assert_eq!(remaining, vec![90, 100]);
        assert!((net.get_output_frequency(id).unwrap() - 1.0).abs() < 1e-9);
    }
}
