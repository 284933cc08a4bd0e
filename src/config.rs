//! Network configuration — the scalar surface external
//! collaborators (CLI, persistence, test harnesses) use to construct a
//! [`crate::network::CrowNet`].

use crate::error::CrowNetError;
use crate::neuron::NeuronType;

/// Radius factor applied per neuron type when scattering initial positions.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeRadiusFactors {
    pub excitatory: f64,
    pub inhibitory: f64,
    pub dopaminergic: f64,
    pub input: f64,
    pub output: f64,
}

impl Default for TypeRadiusFactors {
    fn default() -> Self {
        Self {
            excitatory: 1.0,
            inhibitory: 0.8,
            dopaminergic: 0.5,
            input: 1.0,
            output: 1.0,
        }
    }
}

impl TypeRadiusFactors {
    pub(crate) fn for_type(&self, kind: NeuronType) -> f64 {
        match kind {
            NeuronType::Excitatory => self.excitatory,
            NeuronType::Inhibitory => self.inhibitory,
            NeuronType::Dopaminergic => self.dopaminergic,
            NeuronType::Input => self.input,
            NeuronType::Output => self.output,
        }
    }
}

/// Cortisol gland constants.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CortisolConfig {
    pub production_per_hit: f64,
    pub decay_rate: f64,
    pub max: f64,
    /// Below this level, the threshold factor is 1.0.
    pub min_effect: f64,
    /// Start of the plateau at `max_reduction`.
    pub optimal_low: f64,
    /// End of the plateau at `max_reduction`.
    pub optimal_high: f64,
    /// Above this level, the threshold factor ramps toward
    /// `threshold_increase_factor_high`.
    pub high_effect: f64,
    /// Threshold multiplier held on the `[optimal_low, optimal_high]` plateau.
    pub max_reduction: f64,
    /// Threshold multiplier reached at `cortisol_max`.
    pub threshold_increase_factor_high: f64,
    /// Level above which learning-rate suppression begins to apply.
    pub high_threshold: f64,
    /// Minimum value the learning-rate suppression factor can reach at
    /// `cortisol_max`.
    pub min_suppression: f64,
    /// Multiplier applied to synaptogenesis movement as cortisol rises.
    pub synaptogenesis_reduction_at_max: f64,
}

impl Default for CortisolConfig {
    fn default() -> Self {
        Self {
            production_per_hit: 0.05,
            decay_rate: 0.02,
            max: 10.0,
            min_effect: 1.0,
            optimal_low: 3.0,
            optimal_high: 5.0,
            high_effect: 8.0,
            max_reduction: 0.6,
            threshold_increase_factor_high: 2.0,
            high_threshold: 6.0,
            min_suppression: 0.2,
            synaptogenesis_reduction_at_max: 0.3,
        }
    }
}

/// Dopamine constants.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DopamineConfig {
    pub production_per_event: f64,
    pub decay_rate: f64,
    pub max: f64,
    /// Learning-rate multiplier ceiling at full dopamine.
    pub max_dopamine_multiplier: f64,
    /// Threshold multiplier at full dopamine (single monotone ramp from 1.0).
    pub threshold_increase_factor: f64,
    /// Synaptogenesis movement multiplier ceiling at full dopamine.
    pub synaptogenesis_increase_factor: f64,
}

impl Default for DopamineConfig {
    fn default() -> Self {
        Self {
            production_per_event: 0.1,
            decay_rate: 0.08,
            max: 5.0,
            max_dopamine_multiplier: 3.0,
            threshold_increase_factor: 1.5,
            synaptogenesis_increase_factor: 2.0,
        }
    }
}

/// Hebbian-update constants.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HebbianConfig {
    pub base_rate: f64,
    pub coincidence_window: u64,
    pub positive_reinforcement_factor: f64,
    pub weight_decay: f64,
    pub max_weight: f64,
    /// Effective learning rates below this are treated as zero and the
    /// whole pass is skipped.
    pub rate_floor: f64,
}

impl Default for HebbianConfig {
    fn default() -> Self {
        Self {
            base_rate: 0.01,
            coincidence_window: 2,
            positive_reinforcement_factor: 1.0,
            weight_decay: 0.001,
            max_weight: 5.0,
            rate_floor: 1e-9,
        }
    }
}

/// Synaptogenesis constants.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SynaptogenesisConfig {
    pub attraction_factor: f64,
    pub repulsion_factor: f64,
    pub influence_radius: f64,
    pub dampening_factor: f64,
    pub max_movement_per_cycle: f64,
    /// Below this, the synaptogenesis pass is skipped entirely for the cycle.
    pub modulation_floor: f64,
}

impl Default for SynaptogenesisConfig {
    fn default() -> Self {
        Self {
            attraction_factor: 0.02,
            repulsion_factor: 0.01,
            influence_radius: 3.0,
            dampening_factor: 0.9,
            max_movement_per_cycle: 0.5,
            modulation_floor: 1e-6,
        }
    }
}

/// Top-level network configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkConfig {
    pub total_neurons: usize,
    pub min_input_neurons: usize,
    pub min_output_neurons: usize,
    /// Fraction (0.0-1.0) of the population that is dopaminergic.
    pub dopaminergic_fraction: f64,
    /// Fraction (0.0-1.0) of the population that is inhibitory.
    pub inhibitory_fraction: f64,
    pub radius_factors: TypeRadiusFactors,
    pub space_max_dimension: f64,
    pub pulse_propagation_speed: f64,
    pub pulse_max_range_factor: f64,
    pub abs_refractory_cycles: u64,
    pub rel_refractory_cycles: u64,
    pub threshold_floor: f64,
    pub base_threshold: f64,
    pub potential_decay_rate: f64,
    pub pulse_strength: f64,
    pub initial_weight_min: f64,
    pub initial_weight_max: f64,
    pub cortisol: CortisolConfig,
    pub dopamine: DopamineConfig,
    pub hebbian: HebbianConfig,
    pub synaptogenesis: SynaptogenesisConfig,
    pub cycles_per_second: f64,
    pub output_frequency_window_cycles: u64,
    pub gland_point: [f64; crate::space::DIMENSIONS],
    pub rng_seed: u64,
}

impl NetworkConfig {
    /// A filled-in, internally-consistent configuration for `total_neurons`
    /// neurons, reasonable for tests and examples — a convenience so callers
    /// don't have to hand-fill two dozen fields.
    pub fn default_for(total_neurons: usize) -> Self {
        Self {
            total_neurons,
            min_input_neurons: 1,
            min_output_neurons: 1,
            dopaminergic_fraction: 0.05,
            inhibitory_fraction: 0.2,
            radius_factors: TypeRadiusFactors::default(),
            space_max_dimension: 10.0,
            pulse_propagation_speed: 0.5,
            pulse_max_range_factor: 2.0,
            abs_refractory_cycles: 1,
            rel_refractory_cycles: 2,
            threshold_floor: 0.01,
            base_threshold: 0.5,
            potential_decay_rate: 0.1,
            pulse_strength: 1.0,
            initial_weight_min: 0.01,
            initial_weight_max: 0.2,
            cortisol: CortisolConfig::default(),
            dopamine: DopamineConfig::default(),
            hebbian: HebbianConfig::default(),
            synaptogenesis: SynaptogenesisConfig::default(),
            cycles_per_second: 100.0,
            output_frequency_window_cycles: 200,
            gland_point: [0.0; crate::space::DIMENSIONS],
            rng_seed: 0,
        }
    }

    /// The cell size the spatial index defaults to: twice the propagation
    /// speed, with a fallback for degenerate (non-positive) speeds.
    pub(crate) fn default_cell_size(&self) -> f64 {
        let size = 2.0 * self.pulse_propagation_speed;
        if size > 0.0 {
            size
        } else {
            1.0
        }
    }

    pub(crate) fn pulse_max_range(&self) -> f64 {
        self.space_max_dimension * self.pulse_max_range_factor
    }

    /// Reject configurations that are internally inconsistent: insufficient
    /// population for the configured minimums, any negative rate, a
    /// non-positive `cycles_per_second`, or type fractions that leave no
    /// room for the excitatory remainder.
    pub fn validate(&self) -> Result<(), CrowNetError> {
        if self.total_neurons < self.min_input_neurons + self.min_output_neurons {
            return Err(CrowNetError::ConfigInvalid(format!(
                "total_neurons ({}) must be >= min_input_neurons + min_output_neurons ({} + {})",
                self.total_neurons, self.min_input_neurons, self.min_output_neurons
            )));
        }
        if self.cycles_per_second <= 0.0 {
            return Err(CrowNetError::ConfigInvalid(
                "cycles_per_second must be positive".into(),
            ));
        }
        if self.dopaminergic_fraction < 0.0 || self.inhibitory_fraction < 0.0 {
            return Err(CrowNetError::ConfigInvalid(
                "type fractions must not be negative".into(),
            ));
        }
        if self.dopaminergic_fraction + self.inhibitory_fraction > 1.0 {
            return Err(CrowNetError::ConfigInvalid(
                "dopaminergic_fraction + inhibitory_fraction must not exceed 1.0".into(),
            ));
        }
        for (name, rate) in [
            ("potential_decay_rate", self.potential_decay_rate),
            ("cortisol.decay_rate", self.cortisol.decay_rate),
            ("dopamine.decay_rate", self.dopamine.decay_rate),
            ("hebbian.weight_decay", self.hebbian.weight_decay),
            ("synaptogenesis.dampening_factor", self.synaptogenesis.dampening_factor),
        ] {
            if rate < 0.0 {
                return Err(CrowNetError::ConfigInvalid(format!(
                    "{name} must not be negative"
                )));
            }
        }
        if self.space_max_dimension <= 0.0 {
            return Err(CrowNetError::ConfigInvalid(
                "space_max_dimension must be positive".into(),
            ));
        }
        Ok(())
    }
}
