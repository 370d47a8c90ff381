/// Term counting: Expansion Driver
///
/// Advances a frontier round by round. Delegates child construction to
/// transitions, checks conservation via invariants.
///
/// Every round maps each term to its children independently, so the
/// parallel path needs no locking. Children are concatenated in frontier
/// order on both paths; the resulting frontiers are identical.

use log::{debug, info};
use num_bigint::BigUint;
use rayon::prelude::*;

use crate::domain::{DeadEndPolicy, ExpansionConfig, InitialConfig, RoundStats, Term, TermStatus};
use crate::error::TermError;
use crate::invariants::{try_validate_frontier, validate_child};
use crate::state::create_initial_term;
use crate::transitions::{branch, dead_end};

// ---------------------------------------------------------------------------
// Rounds
// ---------------------------------------------------------------------------

/// Run one round over `frontier`. `round` is the 1-based index of the
/// round being run, used for the returned stats.
///
/// Terminal terms pass through unchanged. Stranded children are dropped.
/// Dead-end children raise or are dropped according to `config.dead_end`.
pub fn expand_round(
    frontier: Vec<Term>,
    round: u64,
    config: &ExpansionConfig,
) -> Result<(Vec<Term>, RoundStats), TermError> {
    let expanded: Vec<(Vec<Term>, usize)> = if config.parallel {
        frontier
            .into_par_iter()
            .map(|term| expand_term(term, config))
            .collect::<Result<_, _>>()?
    } else {
        frontier
            .into_iter()
            .map(|term| expand_term(term, config))
            .collect::<Result<_, _>>()?
    };

    let mut pruned = 0;
    let mut next = Vec::with_capacity(expanded.iter().map(|(c, _)| c.len()).sum());
    for (children, dropped) in expanded {
        pruned += dropped;
        next.extend(children);
    }

    let stats = RoundStats {
        round,
        frontier_len: next.len(),
        terminal: next.iter().filter(|t| t.is_terminal()).count(),
        pruned,
    };
    debug!(
        "round {}: frontier={} terminal={} pruned={}",
        stats.round, stats.frontier_len, stats.terminal, stats.pruned
    );
    Ok((next, stats))
}

/// Children of one term after admission, plus how many were dropped.
fn expand_term(term: Term, config: &ExpansionConfig) -> Result<(Vec<Term>, usize), TermError> {
    if term.is_terminal() {
        return Ok((vec![term], 0));
    }

    let children = branch(&term)?;
    let mut kept = Vec::with_capacity(children.len());
    let mut pruned = 0;
    for child in children {
        if config.check_invariants {
            validate_child(&term, &child);
        }
        match child.status() {
            TermStatus::Terminal | TermStatus::Open => kept.push(child),
            TermStatus::Stranded => {
                debug!(
                    "pruning stranded child with {} source(s) left",
                    child.sources_remaining()
                );
                pruned += 1;
            }
            TermStatus::DeadEnd => match config.dead_end {
                DeadEndPolicy::Fail => return Err(dead_end(&child)),
                DeadEndPolicy::Prune => {
                    debug!("pruning dead-end child with legs {:?}", child.legs());
                    pruned += 1;
                }
            },
        }
    }
    Ok((kept, pruned))
}

/// Bounded mode: run exactly `rounds` rounds.
pub fn expand_rounds(
    frontier: Vec<Term>,
    rounds: u64,
    config: &ExpansionConfig,
) -> Result<Vec<Term>, TermError> {
    let mut expander = Expander::from_frontier(frontier, 0, config.clone())?;
    expander.run(rounds)?;
    Ok(expander.into_frontier())
}

/// Run-to-fixpoint mode: expand until every term is terminal.
/// Returns the final frontier and the number of rounds run.
pub fn expand_to_fixpoint(
    frontier: Vec<Term>,
    config: &ExpansionConfig,
) -> Result<(Vec<Term>, u64), TermError> {
    let mut expander = Expander::from_frontier(frontier, 0, config.clone())?;
    let rounds = expander.run_to_fixpoint()?;
    Ok((expander.into_frontier(), rounds))
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Sum of `factor` over a fully terminal frontier.
pub fn aggregate(frontier: &[Term]) -> Result<BigUint, TermError> {
    let non_terminal = frontier.iter().filter(|t| !t.is_terminal()).count();
    if non_terminal > 0 {
        return Err(TermError::IncompleteFrontier {
            non_terminal,
            total: frontier.len(),
        });
    }
    Ok(terminal_weight(frontier))
}

/// Sum of `factor` over the terminal members only; live terms are ignored.
pub fn terminal_weight(frontier: &[Term]) -> BigUint {
    frontier
        .iter()
        .filter(|t| t.is_terminal())
        .map(|t| t.factor())
        .sum()
}

/// Count every contraction path of `(a, b, c, sources)`.
pub fn count_terms(
    a: i64,
    b: i64,
    c: i64,
    sources: i64,
    config: &ExpansionConfig,
) -> Result<BigUint, TermError> {
    let initial = InitialConfig::new(a, b, c, sources)?;
    let mut expander = Expander::new(&initial, config.clone());
    expander.run_to_fixpoint()?;
    expander.aggregate()
}

// ---------------------------------------------------------------------------
// Stateful driver
// ---------------------------------------------------------------------------

/// Frontier plus round counter. The unit the runtime snapshots and resumes.
#[derive(Debug)]
pub struct Expander {
    frontier: Vec<Term>,
    round: u64,
    config: ExpansionConfig,
}

impl Expander {
    /// Start from the root term of `initial`.
    pub fn new(initial: &InitialConfig, config: ExpansionConfig) -> Self {
        Self {
            frontier: vec![create_initial_term(initial)],
            round: 0,
            config,
        }
    }

    /// Resume from an existing frontier that has already run `round` rounds.
    pub fn from_frontier(
        frontier: Vec<Term>,
        round: u64,
        config: ExpansionConfig,
    ) -> Result<Self, TermError> {
        try_validate_frontier(&frontier).map_err(TermError::InvariantViolation)?;
        Ok(Self {
            frontier,
            round,
            config,
        })
    }

    pub fn frontier(&self) -> &[Term] {
        &self.frontier
    }

    pub fn into_frontier(self) -> Vec<Term> {
        self.frontier
    }

    /// Rounds run so far.
    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn config(&self) -> &ExpansionConfig {
        &self.config
    }

    /// True when every term is terminal (vacuously for an empty frontier).
    pub fn is_complete(&self) -> bool {
        self.frontier.iter().all(|t| t.is_terminal())
    }

    /// Run one round. On error the frontier is left empty.
    pub fn step(&mut self) -> Result<RoundStats, TermError> {
        let frontier = std::mem::take(&mut self.frontier);
        let (next, stats) = expand_round(frontier, self.round + 1, &self.config)?;
        self.frontier = next;
        self.round += 1;
        Ok(stats)
    }

    /// Run exactly `rounds` rounds. Once the frontier is complete the
    /// remaining rounds are self-loops and are only counted.
    pub fn run(&mut self, rounds: u64) -> Result<(), TermError> {
        for done in 0..rounds {
            if self.is_complete() {
                self.round += rounds - done;
                break;
            }
            self.step()?;
        }
        Ok(())
    }

    /// Expand until complete. Returns the number of rounds this call ran.
    ///
    /// The cap is `config.max_rounds`, or else the largest `outstanding()`
    /// in the frontier. Every move lowers it by at least one.
    pub fn run_to_fixpoint(&mut self) -> Result<u64, TermError> {
        let limit = self.config.max_rounds.unwrap_or_else(|| {
            self.frontier
                .iter()
                .map(|t| t.outstanding())
                .max()
                .unwrap_or(0)
        });
        info!(
            "expanding {} term(s) to fixpoint (cap {} rounds, parallel={})",
            self.frontier.len(),
            limit,
            self.config.parallel
        );

        let mut ran = 0;
        while !self.is_complete() {
            if ran == limit {
                return Err(TermError::RoundLimitExceeded { limit });
            }
            self.step()?;
            ran += 1;
        }

        info!(
            "fixpoint after {} round(s): {} terminal term(s)",
            ran,
            self.frontier.len()
        );
        Ok(ran)
    }

    /// Strict aggregate of the current frontier.
    pub fn aggregate(&self) -> Result<BigUint, TermError> {
        aggregate(&self.frontier)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
