//! Drift detection: determinism verification and frontier comparison.
//!
//! All weights are exact BigUint values. No float arithmetic anywhere.

use num_bigint::BigUint;

use term_engine::domain::{ExpansionConfig, InitialConfig, Term};
use term_engine::engine::terminal_weight;
use term_engine::TermError;

use crate::replay;

/// Rebuild `rounds` rounds twice, once sequentially and once on the rayon
/// pool, and panic if the canonical hashes differ.
pub fn verify_determinism(
    initial: &InitialConfig,
    rounds: u64,
    config: &ExpansionConfig,
) -> Result<(), TermError> {
    let sequential = ExpansionConfig {
        parallel: false,
        ..config.clone()
    };
    let parallel = ExpansionConfig {
        parallel: true,
        ..config.clone()
    };
    let hash1 = replay::rebuild_hash(initial, rounds, &sequential)?;
    let hash2 = replay::rebuild_hash(initial, rounds, &parallel)?;

    if hash1 != hash2 {
        panic!(
            "DETERMINISM FAILURE: sequential and parallel expansion diverged.\n\
             Sequential: {}\n\
             Parallel:   {}",
            hash1, hash2
        );
    }
    Ok(())
}

/// Structured comparison of two frontiers.
pub fn compare_frontiers(a: &[Term], b: &[Term]) -> DriftReport {
    let terminal_a = a.iter().filter(|t| t.is_terminal()).count();
    let terminal_b = b.iter().filter(|t| t.is_terminal()).count();

    DriftReport {
        len_a: a.len(),
        len_b: b.len(),
        terminal_a,
        terminal_b,
        weight_a: terminal_weight(a),
        weight_b: terminal_weight(b),
        // Order-sensitive: the first index where the frontiers disagree.
        first_divergence: a
            .iter()
            .zip(b.iter())
            .position(|(x, y)| x != y)
            .or_else(|| (a.len() != b.len()).then(|| a.len().min(b.len()))),
    }
}

/// Structured drift report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftReport {
    pub len_a: usize,
    pub len_b: usize,
    pub terminal_a: usize,
    pub terminal_b: usize,
    /// Terminal weight of each side.
    pub weight_a: BigUint,
    pub weight_b: BigUint,
    pub first_divergence: Option<usize>,
}

impl DriftReport {
    /// True when the frontiers are identical term for term.
    pub fn is_identical(&self) -> bool {
        self.first_divergence.is_none()
    }

    /// True when both sides carry the same terminal weight, regardless of order.
    pub fn same_weight(&self) -> bool {
        self.weight_a == self.weight_b
    }
}
