#![forbid(unsafe_code)]

//! Term counting kernel.
//!
//! Enumerates every way a configuration of legs and shared sources can be
//! contracted down to a fully reduced state, carrying the exact
//! combinatorial weight of each path.

/// Frontier format version. Bumped whenever the serialized term layout changes.
pub const FORMAT_VERSION: u32 = 1;

pub mod arithmetic;
pub mod error;
pub mod domain;
pub mod events;
pub mod state;
pub mod transitions;
pub mod invariants;
pub mod hashing;
pub mod engine;

pub use domain::{DeadEndPolicy, ExpansionConfig, InitialConfig, RoundStats, Term, TermStatus};
pub use engine::{aggregate, count_terms, expand_rounds, expand_to_fixpoint, Expander};
pub use error::TermError;
pub use events::Move;
