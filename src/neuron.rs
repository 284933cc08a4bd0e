//! Neuron state machine: per-neuron potential, threshold,
//! and the four-state Resting/Firing/AbsoluteRefractory/RelativeRefractory
//! cycle.

use crate::space::Vec16;

/// Stable numeric handle assigned at construction; ids are dense and never
/// reused, since no neuron is ever destroyed mid-simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NeuronId(pub u32);

impl NeuronId {
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl From<u32> for NeuronId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Neuron variant tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NeuronType {
    Excitatory,
    Inhibitory,
    Dopaminergic,
    Input,
    Output,
}

impl NeuronType {
    /// The sign (and, implicitly, relative magnitude scale) of the pulse a
    /// firing neuron of this type emits. Dopaminergic neurons modulate
    /// chemistry, not potential.
    pub fn emitted_sign(&self) -> i8 {
        match self {
            NeuronType::Excitatory | NeuronType::Input | NeuronType::Output => 1,
            NeuronType::Inhibitory => -1,
            NeuronType::Dopaminergic => 0,
        }
    }
}

/// Neuron state-machine variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NeuronState {
    Resting,
    Firing,
    AbsoluteRefractory,
    RelativeRefractory,
}

/// A single simulated neuron: identity, physical state, and the fields
/// driving its state machine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Neuron {
    pub id: NeuronId,
    pub kind: NeuronType,
    pub position: Vec16,
    pub velocity: Vec16,
    pub potential: f64,
    pub base_threshold: f64,
    pub current_threshold: f64,
    pub state: NeuronState,
    pub cycles_in_state: u64,
    /// `None` is the "never fired" sentinel.
    pub last_fired_cycle: Option<u64>,
}

impl Neuron {
    pub fn new(id: NeuronId, kind: NeuronType, position: Vec16, base_threshold: f64) -> Self {
        Self {
            id,
            kind,
            position,
            velocity: Vec16::ZERO,
            potential: 0.0,
            base_threshold,
            current_threshold: base_threshold,
            state: NeuronState::Resting,
            cycles_in_state: 0,
            last_fired_cycle: None,
        }
    }

    pub fn emitted_sign(&self) -> i8 {
        self.kind.emitted_sign()
    }

    /// Multiplicative potential decay; never flips sign and never drives a
    /// non-zero potential across zero, since `1 - decay_rate` only shrinks
    /// magnitude toward zero.
    pub fn decay_potential(&mut self, decay_rate: f64) {
        self.potential *= 1.0 - decay_rate;
    }

    /// Add `delta` to the accumulated potential, unless the neuron is in
    /// `AbsoluteRefractory`, in which case the call is a no-op.
    /// Potential may go negative under inhibition.
    pub fn integrate(&mut self, delta: f64) {
        if self.state != NeuronState::AbsoluteRefractory {
            self.potential += delta;
        }
    }

    /// Force this neuron into `Firing` regardless of threshold — used by
    /// the orchestrator for externally-driven input neurons. Returns `true` if the neuron wasn't already firing
    /// this cycle (callers use this to decide whether to emit a pulse).
    pub fn force_fire(&mut self, current_cycle: u64) -> bool {
        self.enter_firing(current_cycle)
    }

    fn enter_firing(&mut self, _current_cycle: u64) -> bool {
        if self.state == NeuronState::Firing {
            return false;
        }
        self.state = NeuronState::Firing;
        self.cycles_in_state = 0;
        true
    }

    /// Advance the state machine by exactly one tick. Only `Resting`
    /// neurons are threshold-checked here; a neuron crossing threshold
    /// mid-cycle from pulse delivery is instead promoted directly by the
    /// pulse engine. Returns `true` if the neuron just entered `Firing` as a
    /// result of this call.
    pub fn advance_state(
        &mut self,
        current_cycle: u64,
        abs_refractory_cycles: u64,
        rel_refractory_cycles: u64,
    ) -> bool {
        match self.state {
            NeuronState::Resting => {
                if self.potential >= self.current_threshold {
                    return self.enter_firing(current_cycle);
                }
                false
            }
            NeuronState::Firing => {
                self.state = NeuronState::AbsoluteRefractory;
                self.cycles_in_state = 0;
                self.last_fired_cycle = Some(current_cycle);
                self.potential = 0.0;
                false
            }
            NeuronState::AbsoluteRefractory => {
                self.cycles_in_state += 1;
                if self.cycles_in_state >= abs_refractory_cycles {
                    self.state = NeuronState::RelativeRefractory;
                    self.cycles_in_state = 0;
                }
                false
            }
            NeuronState::RelativeRefractory => {
                self.cycles_in_state += 1;
                if self.cycles_in_state >= rel_refractory_cycles {
                    self.state = NeuronState::Resting;
                    self.cycles_in_state = 0;
                }
                false
            }
        }
    }

    /// Whether the firing-by-threshold path is open for this neuron right
    /// now; used by the pulse engine's post-delivery threshold check.
    /// RelativeRefractory neurons cannot fire.
    pub fn can_fire_by_threshold(&self) -> bool {
        self.state == NeuronState::Resting
    }
}
