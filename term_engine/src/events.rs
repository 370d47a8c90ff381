/// Term counting: Move Definitions
///
/// Moves are pure data. They name which rule fires at which legs.
/// They contain ZERO transition logic beyond reading their multiplicity.

use serde::{Deserialize, Serialize};

use crate::domain::Term;

/// One enabled branching step out of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Move {
    /// Consume a shared source and open a marker at `leg`.
    Open { leg: usize },
    /// Pair a marker opened at `from` with a reduction at `to`.
    Pair { from: usize, to: usize },
}

impl Move {
    /// Leg whose outstanding reduction this move consumes.
    pub fn leg(&self) -> usize {
        match *self {
            Move::Open { leg } => leg,
            Move::Pair { to, .. } => to,
        }
    }

    /// Number of equivalent choices the move stands for, read off the
    /// parent before anything is consumed.
    pub fn multiplicity(&self, term: &Term) -> u64 {
        match *self {
            Move::Open { .. } => term.sources_remaining(),
            Move::Pair { from, .. } => term.markers()[from],
        }
    }
}

impl Term {
    /// Enabled moves in canonical order: ascending reduction leg, the open
    /// move first, then pair moves by ascending marker leg.
    ///
    /// Empty for terminal, stranded and dead-end terms.
    pub fn moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        for (leg, &owed) in self.legs().iter().enumerate() {
            if owed == 0 {
                continue;
            }
            if self.sources_remaining() > 0 {
                moves.push(Move::Open { leg });
            }
            for (from, &open) in self.markers().iter().enumerate() {
                if open > 0 {
                    moves.push(Move::Pair { from, to: leg });
                }
            }
        }
        moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    fn term(legs: Vec<u64>, sources: u64, markers: Vec<u64>) -> Term {
        let l = legs.len();
        Term::from_parts(BigUint::from(1u32), legs, sources, markers, vec![0; l * l]).unwrap()
    }

    #[test]
    fn moves_follow_canonical_order() {
        let t = term(vec![1, 0, 2], 3, vec![2, 0, 1]);
        assert_eq!(
            t.moves(),
            vec![
                Move::Open { leg: 0 },
                Move::Pair { from: 0, to: 0 },
                Move::Pair { from: 2, to: 0 },
                Move::Open { leg: 2 },
                Move::Pair { from: 0, to: 2 },
                Move::Pair { from: 2, to: 2 },
            ]
        );
    }

    #[test]
    fn open_suppressed_without_sources() {
        let t = term(vec![2, 2], 0, vec![1, 0]);
        assert!(t.moves().iter().all(|m| matches!(m, Move::Pair { .. })));
        assert_eq!(t.moves().len(), 2);
    }

    #[test]
    fn pair_suppressed_without_markers() {
        let t = term(vec![2, 2], 1, vec![0, 0]);
        assert_eq!(t.moves(), vec![Move::Open { leg: 0 }, Move::Open { leg: 1 }]);
    }

    #[test]
    fn multiplicity_reads_parent_counts() {
        let t = term(vec![4], 5, vec![3]);
        assert_eq!(Move::Open { leg: 0 }.multiplicity(&t), 5);
        assert_eq!(Move::Pair { from: 0, to: 0 }.multiplicity(&t), 3);
    }

    #[test]
    fn no_moves_for_stuck_terms() {
        assert!(term(vec![0], 0, vec![2]).moves().is_empty());
        assert!(term(vec![0], 3, vec![0]).moves().is_empty());
        assert!(term(vec![6], 0, vec![0]).moves().is_empty());
    }
}
