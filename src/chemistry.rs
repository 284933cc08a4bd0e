//! Cortisol/dopamine chemical environment: two independent
//! first-order scalar systems and the modulation factors derived from them.

use crate::config::{CortisolConfig, DopamineConfig, NetworkConfig};

/// Floor under which a multiplicative modulation factor is never allowed to
/// fall, so a misconfigured or saturated chemical environment can't zero out
/// learning or movement outright.
const MIN_MULTIPLIER: f64 = 0.01;

/// Linear interpolation of `x` from the range `[x0, x1]` to `[y0, y1]`,
/// clamped at both ends — the building block every piecewise-linear ramp in
/// this module is made of.
fn linear_ramp(x: f64, x0: f64, x1: f64, y0: f64, y1: f64) -> f64 {
    if x1 <= x0 {
        return y1;
    }
    let t = ((x - x0) / (x1 - x0)).clamp(0.0, 1.0);
    y0 + t * (y1 - y0)
}

/// Cortisol/dopamine levels, persisted across cycles.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChemicalEnvironment {
    pub cortisol: f64,
    pub dopamine: f64,
}

impl Default for ChemicalEnvironment {
    fn default() -> Self {
        Self {
            cortisol: 0.0,
            dopamine: 0.0,
        }
    }
}

impl ChemicalEnvironment {
    /// Cortisol update: produce per excitatory-pulse gland hit, decay
    /// exponentially, clamp to `[0, cortisol_max]`.
    pub fn update_cortisol(&mut self, gland_hits: u32, cfg: &CortisolConfig) {
        self.cortisol += cfg.production_per_hit * gland_hits as f64;
        self.cortisol *= 1.0 - cfg.decay_rate;
        self.cortisol = self.cortisol.clamp(0.0, cfg.max);
    }

    /// Dopamine update: produce per firing dopaminergic neuron, decay
    /// exponentially (faster than cortisol by configuration), clamp to
    /// `[0, dopamine_max]`.
    pub fn update_dopamine(&mut self, firing_dopaminergic: u32, cfg: &DopamineConfig) {
        self.dopamine += cfg.production_per_event * firing_dopaminergic as f64;
        self.dopamine *= 1.0 - cfg.decay_rate;
        self.dopamine = self.dopamine.clamp(0.0, cfg.max);
    }

    fn normalized_dopamine(&self, cfg: &DopamineConfig) -> f64 {
        if cfg.max > 0.0 {
            (self.dopamine / cfg.max).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// 1.0 below `cortisol.high_threshold`, ramping linearly down to
    /// `cortisol.min_suppression` at `cortisol.max`.
    fn cortisol_suppression(&self, cfg: &CortisolConfig) -> f64 {
        linear_ramp(self.cortisol, cfg.high_threshold, cfg.max, 1.0, cfg.min_suppression)
    }

    /// Effective learning-rate multiplier for this cycle.
    pub fn learning_rate_modulation(&self, network: &NetworkConfig) -> f64 {
        let dopamine_boost =
            1.0 + (network.dopamine.max_dopamine_multiplier - 1.0) * self.normalized_dopamine(&network.dopamine);
        let suppression = self.cortisol_suppression(&network.cortisol);
        (dopamine_boost * suppression).max(MIN_MULTIPLIER)
    }

    /// `dopamine_increase_factor(d)`: 1.0 at zero dopamine, ramping to
    /// `dopamine.synaptogenesis_increase_factor` at `dopamine.max`.
    fn dopamine_increase_factor(&self, cfg: &DopamineConfig) -> f64 {
        linear_ramp(self.dopamine, 0.0, cfg.max, 1.0, cfg.synaptogenesis_increase_factor)
    }

    /// `cortisol_reduction_factor(c)`: 1.0 at zero cortisol, ramping down to
    /// `cortisol.synaptogenesis_reduction_at_max` at `cortisol.max`.
    fn cortisol_reduction_factor(&self, cfg: &CortisolConfig) -> f64 {
        linear_ramp(self.cortisol, 0.0, cfg.max, 1.0, cfg.synaptogenesis_reduction_at_max)
    }

    /// Effective synaptogenesis movement multiplier for this cycle.
    pub fn synaptogenesis_modulation(&self, network: &NetworkConfig) -> f64 {
        (self.dopamine_increase_factor(&network.dopamine) * self.cortisol_reduction_factor(&network.cortisol))
            .max(MIN_MULTIPLIER)
    }

    /// The piecewise-linear cortisol curve driving threshold modulation:
    /// 1.0 below `min_effect`, ramps down to `max_reduction` by
    /// `optimal_low`, holds through `optimal_high`, ramps back to 1.0 by
    /// `high_effect`, then ramps up to `threshold_increase_factor_high` at
    /// `cortisol.max`.
    fn cortisol_threshold_factor(&self, cfg: &CortisolConfig) -> f64 {
        let c = self.cortisol;
        if c <= cfg.min_effect {
            1.0
        } else if c <= cfg.optimal_low {
            linear_ramp(c, cfg.min_effect, cfg.optimal_low, 1.0, cfg.max_reduction)
        } else if c <= cfg.optimal_high {
            cfg.max_reduction
        } else if c <= cfg.high_effect {
            linear_ramp(c, cfg.optimal_high, cfg.high_effect, cfg.max_reduction, 1.0)
        } else {
            linear_ramp(c, cfg.high_effect, cfg.max, 1.0, cfg.threshold_increase_factor_high)
        }
    }

    /// Single monotone ramp from 1.0 at zero dopamine to
    /// `dopamine.threshold_increase_factor` at `dopamine.max`.
    fn dopamine_threshold_factor(&self, cfg: &DopamineConfig) -> f64 {
        linear_ramp(self.dopamine, 0.0, cfg.max, 1.0, cfg.threshold_increase_factor)
    }

    /// Per-neuron current threshold, floored at `threshold_floor`.
    pub fn apply_threshold(&self, base_threshold: f64, network: &NetworkConfig) -> f64 {
        let factor = self.cortisol_threshold_factor(&network.cortisol) * self.dopamine_threshold_factor(&network.dopamine);
        (base_threshold * factor).max(network.threshold_floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cortisol_decays_exponentially() {
        let mut env = ChemicalEnvironment {
            cortisol: 1.0,
            dopamine: 0.0,
        };
        let cfg = CortisolConfig {
            production_per_hit: 0.0,
            decay_rate: 0.1,
            ..CortisolConfig::default()
        };
        env.update_cortisol(0, &cfg);
        assert!((env.cortisol - 0.9).abs() < 1e-12);
        for _ in 0..9 {
            env.update_cortisol(0, &cfg);
        }
        let expected = 1.0 * 0.9f64.powi(10);
        assert!((env.cortisol - expected).abs() < 1e-9);
    }

    #[test]
    fn clamps_to_configured_max() {
        let mut env = ChemicalEnvironment::default();
        let cfg = CortisolConfig {
            production_per_hit: 1000.0,
            max: 10.0,
            ..CortisolConfig::default()
        };
        env.update_cortisol(5, &cfg);
        assert_eq!(env.cortisol, 10.0);
    }

    #[test]
    fn disabled_dynamics_reset_to_neutral_factors() {
        let network = NetworkConfig::default_for(10);
        let env = ChemicalEnvironment::default();
        // zero chemical levels should already be close to neutral
        assert!((env.learning_rate_modulation(&network) - 1.0).abs() < 1e-6);
        assert!((env.synaptogenesis_modulation(&network) - 1.0).abs() < 1e-6);
        assert!((env.apply_threshold(network.base_threshold, &network) - network.base_threshold).abs() < 1e-9);
    }

    #[test]
    fn threshold_floor_is_respected() {
        let mut network = NetworkConfig::default_for(10);
        network.threshold_floor = 0.05;
        network.base_threshold = 0.0;
        let env = ChemicalEnvironment::default();
        assert_eq!(env.apply_threshold(network.base_threshold, &network), 0.05);
    }
}
