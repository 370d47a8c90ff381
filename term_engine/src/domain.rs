/// Term counting: Core Domain Types
///
/// Pure data plus read-only accessors. Move logic lives in transitions.
/// Counters are u64, weights are arbitrary-precision. No float anywhere.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::arithmetic::{checked_add, checked_sum, round_bound, to_count};
use crate::error::TermError;
use crate::invariants::try_validate_term;

// ── Term ───────────────────────────────────────────────────────────

/// One partially contracted configuration and the weight of the path
/// that produced it.
///
/// Every term owns its arrays; branching builds children by copy and
/// never touches the parent. Terminality is derived, not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Term {
    #[serde(with = "decimal")]
    pub(crate) factor: BigUint,
    pub(crate) legs: Vec<u64>,
    pub(crate) sources_remaining: u64,
    pub(crate) markers: Vec<u64>,
    /// Row-major L×L: `pairings[from * L + to]`.
    pub(crate) pairings: Vec<u64>,
}

/// Classification of a term with respect to the move rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermStatus {
    /// No reductions owed and no sources left. Absorbing.
    Terminal,
    /// At least one move is enabled.
    Open,
    /// Every leg is resolved but sources remain. Can never finish.
    Stranded,
    /// Reductions are owed but there is neither a source nor a marker.
    DeadEnd,
}

impl Term {
    /// Build a term from raw parts, checking array shapes and factor.
    pub fn from_parts(
        factor: BigUint,
        legs: Vec<u64>,
        sources_remaining: u64,
        markers: Vec<u64>,
        pairings: Vec<u64>,
    ) -> Result<Self, TermError> {
        let term = Self {
            factor,
            legs,
            sources_remaining,
            markers,
            pairings,
        };
        try_validate_term(&term).map_err(TermError::InvariantViolation)?;
        Ok(term)
    }

    pub fn factor(&self) -> &BigUint {
        &self.factor
    }

    pub fn legs(&self) -> &[u64] {
        &self.legs
    }

    pub fn sources_remaining(&self) -> u64 {
        self.sources_remaining
    }

    pub fn markers(&self) -> &[u64] {
        &self.markers
    }

    /// Flat row-major pairing matrix.
    pub fn pairings(&self) -> &[u64] {
        &self.pairings
    }

    /// Completed pairings between a marker opened at `from` and a
    /// reduction consumed at `to`.
    pub fn pairing(&self, from: usize, to: usize) -> u64 {
        self.pairings[from * self.leg_count() + to]
    }

    /// Pairing matrix rows, one per originating leg.
    pub fn pairing_rows(&self) -> impl Iterator<Item = &[u64]> + '_ {
        // chunks() rejects a zero size; an empty matrix has no rows anyway.
        self.pairings.chunks(self.leg_count().max(1))
    }

    /// Number of legs (L).
    pub fn leg_count(&self) -> usize {
        self.legs.len()
    }

    /// `sum(legs) + sources_remaining`. An open move lowers it by two and a
    /// pair move by one, so it bounds the rounds left below this term.
    pub fn outstanding(&self) -> u64 {
        checked_add(checked_sum(&self.legs), self.sources_remaining)
    }

    pub fn is_terminal(&self) -> bool {
        self.sources_remaining == 0 && self.legs.iter().all(|&d| d == 0)
    }

    pub fn status(&self) -> TermStatus {
        if self.legs.iter().all(|&d| d == 0) {
            if self.sources_remaining == 0 {
                TermStatus::Terminal
            } else {
                TermStatus::Stranded
            }
        } else if self.sources_remaining == 0 && self.markers.iter().all(|&m| m == 0) {
            TermStatus::DeadEnd
        } else {
            TermStatus::Open
        }
    }
}

/// `factor` travels as a decimal string so JSON never rounds it.
mod decimal {
    use num_bigint::BigUint;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_str_radix(10))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let s = String::deserialize(deserializer)?;
        BigUint::parse_bytes(s.as_bytes(), 10)
            .ok_or_else(|| de::Error::custom(format!("invalid decimal factor {:?}", s)))
    }
}

// ── Initial configuration ─────────────────────────────────────────

/// Group sizes and source pool for the root term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitialConfig {
    /// Legs starting at degree 2.
    pub twos: u64,
    /// Legs starting at degree 4.
    pub fours: u64,
    /// Legs starting at degree 6.
    pub sixes: u64,
    pub sources: u64,
}

impl InitialConfig {
    /// Validate signed inputs. Any negative value is `InvalidConfiguration`.
    pub fn new(twos: i64, fours: i64, sixes: i64, sources: i64) -> Result<Self, TermError> {
        Ok(Self {
            twos: to_count("a", twos)?,
            fours: to_count("b", fours)?,
            sixes: to_count("c", sixes)?,
            sources: to_count("sources", sources)?,
        })
    }

    /// L = a + b + c.
    pub fn leg_count(&self) -> usize {
        checked_add(checked_add(self.twos, self.fours), self.sixes) as usize
    }

    /// Upper bound on the rounds any run from this configuration needs.
    pub fn round_bound(&self) -> u64 {
        round_bound(self.twos, self.fours, self.sixes, self.sources)
    }
}

// ── Expansion configuration ───────────────────────────────────────

/// What the driver does with a freshly produced dead-end child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadEndPolicy {
    /// Raise `DeadEndState`.
    #[default]
    Fail,
    /// Drop the child; the frontier shrinks.
    Prune,
}

/// Driver knobs. Loadable from JSON; every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExpansionConfig {
    /// Expand each round across the rayon pool.
    pub parallel: bool,
    pub dead_end: DeadEndPolicy,
    /// Safety cap for run-to-fixpoint. `None` derives it from the frontier.
    pub max_rounds: Option<u64>,
    /// Check conservation on every produced child.
    pub check_invariants: bool,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            dead_end: DeadEndPolicy::Fail,
            max_rounds: None,
            check_invariants: true,
        }
    }
}

/// Outcome of one expansion round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStats {
    /// 1-based index of the round just completed.
    pub round: u64,
    pub frontier_len: usize,
    pub terminal: usize,
    /// Children dropped as stranded or pruned dead ends.
    pub pruned: usize,
}
