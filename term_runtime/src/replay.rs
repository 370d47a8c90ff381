//! Replay orchestrator: rebuild a frontier from the root.
//!
//! Delegates all move logic to the kernel. No shortcuts, no cached
//! frontiers.

use term_engine::domain::{ExpansionConfig, InitialConfig, Term};
use term_engine::engine::Expander;
use term_engine::hashing::canonical_hash;
use term_engine::TermError;

/// Rebuild the frontier `rounds` rounds after the root of `initial`.
///
/// Returns `(frontier, canonical_hash)`. Deterministic for a given
/// input; sequential and parallel configs yield the same frontier.
pub fn rebuild_frontier(
    initial: &InitialConfig,
    rounds: u64,
    config: &ExpansionConfig,
) -> Result<(Vec<Term>, String), TermError> {
    let mut expander = Expander::new(initial, config.clone());
    expander.run(rounds)?;
    let frontier = expander.into_frontier();
    let hash = canonical_hash(&frontier);
    Ok((frontier, hash))
}

/// Rebuild and return only the canonical hash.
pub fn rebuild_hash(
    initial: &InitialConfig,
    rounds: u64,
    config: &ExpansionConfig,
) -> Result<String, TermError> {
    let (_, hash) = rebuild_frontier(initial, rounds, config)?;
    Ok(hash)
}
