//! Kernel error taxonomy.
//!
//! None of these occur in a correct run over valid input. Each one marks
//! caller misuse or a broken invariant and is surfaced immediately.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TermError {
    /// A group size or the source count was negative.
    #[error("Invalid configuration: {name} = {value} must be non-negative")]
    InvalidConfiguration { name: &'static str, value: i64 },

    /// A non-terminal term has no enabled move.
    #[error(
        "Dead-end term: legs={legs:?}, sources_remaining={sources_remaining}, markers={markers:?}"
    )]
    DeadEndState {
        legs: Vec<u64>,
        sources_remaining: u64,
        markers: Vec<u64>,
    },

    /// Aggregation was asked for a frontier that still holds live terms.
    #[error("Incomplete frontier: {non_terminal} of {total} terms are not terminal")]
    IncompleteFrontier { non_terminal: usize, total: usize },

    /// Run-to-fixpoint exceeded its safety cap.
    #[error("Round limit exceeded: {limit} rounds without reaching a fixpoint")]
    RoundLimitExceeded { limit: u64 },

    /// A frontier failed structural validation.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}
