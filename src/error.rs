use thiserror::Error;

/// Errors surfaced by a simulation run.
///
/// A run either completes and returns its output, or fails with one of these
/// and its partial state is dropped.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    /// Malformed inputs detected before any step is taken.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// No free site has positive weight for a searcher that must jump.
    #[error("degenerate transition from site {site} at step {step}: no free site has positive weight")]
    DegenerateTransition { site: usize, step: usize },
}

pub type SimResult<T> = Result<T, SimError>;
