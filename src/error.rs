//! Error types surfaced by the CrowNet core.
//!
//! Everything else that can go wrong inside a running cycle (a missing
//! weight, a pulse whose emitter no longer matters) is absorbed locally by
//! the data structures themselves and never reaches this type.

use thiserror::Error;

/// Errors the core can return from its public entry points.
#[derive(Debug, Error, PartialEq)]
pub enum CrowNetError {
    /// Rejected at construction; the configuration can never produce a
    /// valid network.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    /// `present_pattern` was called with a vector whose length does not
    /// match the configured pattern size, or there are not enough input
    /// neurons to address it.
    #[error("pattern size mismatch: expected {expected} values, got {got}")]
    PatternSizeMismatch { expected: usize, got: usize },

    /// `configure_frequency_input` or `get_output_frequency` referenced an
    /// id outside the relevant sorted input/output id list.
    #[error("neuron id {0} is not a valid input/output id for this network")]
    InvalidId(u32),

    /// `get_output_frequency` was called without the parameters it needs to
    /// convert a firing count into a rate.
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),
}
