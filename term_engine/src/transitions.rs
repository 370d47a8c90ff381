/// Term counting: Centralized Transition Logic
///
/// ALL child construction lives here.
/// Counters are exact integers; the factor is a BigUint.

use num_bigint::BigUint;

use crate::domain::Term;
use crate::error::TermError;
use crate::events::Move;

// ---------------------------------------------------------------------------
// Public dispatcher
// ---------------------------------------------------------------------------

/// Apply *mv* to *term* and return the child.
/// The parent is never mutated; the child owns fresh copies of every array.
///
/// Panics if the move is not enabled on `term`.
pub fn apply_move(term: &Term, mv: Move) -> Term {
    match mv {
        Move::Open { leg } => apply_open(term, leg),
        Move::Pair { from, to } => apply_pair(term, from, to),
    }
}

/// All one-step children of `term`, in the order of `Term::moves`.
///
/// A terminal term yields itself. A non-terminal term with no enabled
/// move is `DeadEndState`.
pub fn branch(term: &Term) -> Result<Vec<Term>, TermError> {
    if term.is_terminal() {
        return Ok(vec![term.clone()]);
    }
    let moves = term.moves();
    if moves.is_empty() {
        return Err(dead_end(term));
    }
    Ok(moves.into_iter().map(|mv| apply_move(term, mv)).collect())
}

impl Term {
    /// Consuming form of `branch`: a terminal term is moved through
    /// untouched instead of cloned.
    pub fn expand(self) -> Result<Vec<Term>, TermError> {
        if self.is_terminal() {
            Ok(vec![self])
        } else {
            branch(&self)
        }
    }
}

/// Build the dead-end error describing `term`.
pub fn dead_end(term: &Term) -> TermError {
    TermError::DeadEndState {
        legs: term.legs.clone(),
        sources_remaining: term.sources_remaining,
        markers: term.markers.clone(),
    }
}

// ---------------------------------------------------------------------------
// Individual move handlers (private)
// ---------------------------------------------------------------------------

fn apply_open(term: &Term, leg: usize) -> Term {
    if term.legs[leg] == 0 || term.sources_remaining == 0 {
        panic!(
            "Open move not enabled at leg {}: legs={:?}, sources_remaining={}",
            leg, term.legs, term.sources_remaining
        );
    }

    let mut legs = term.legs.clone();
    legs[leg] -= 1;
    let mut markers = term.markers.clone();
    markers[leg] += 1;

    Term {
        factor: &term.factor * BigUint::from(term.sources_remaining),
        legs,
        sources_remaining: term.sources_remaining - 1,
        markers,
        pairings: term.pairings.clone(),
    }
}

fn apply_pair(term: &Term, from: usize, to: usize) -> Term {
    if term.legs[to] == 0 || term.markers[from] == 0 {
        panic!(
            "Pair move not enabled from leg {} to leg {}: legs={:?}, markers={:?}",
            from, to, term.legs, term.markers
        );
    }

    let l = term.leg_count();
    let mut legs = term.legs.clone();
    legs[to] -= 1;
    let mut markers = term.markers.clone();
    markers[from] -= 1;
    let mut pairings = term.pairings.clone();
    pairings[from * l + to] += 1;

    Term {
        factor: &term.factor * BigUint::from(term.markers[from]),
        legs,
        sources_remaining: term.sources_remaining,
        markers,
        pairings,
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InitialConfig;
    use crate::state::create_initial_term;

    fn root(a: i64, b: i64, c: i64, n: i64) -> Term {
        create_initial_term(&InitialConfig::new(a, b, c, n).unwrap())
    }

    #[test]
    fn open_move_consumes_source() {
        let parent = root(0, 1, 0, 3);
        let child = apply_move(&parent, Move::Open { leg: 0 });
        assert_eq!(child.legs(), &[3]);
        assert_eq!(child.markers(), &[1]);
        assert_eq!(child.sources_remaining(), 2);
        assert_eq!(child.factor(), &BigUint::from(3u32));
        assert_eq!(child.pairings(), parent.pairings());
        // parent untouched
        assert_eq!(parent.legs(), &[4]);
        assert_eq!(parent.sources_remaining(), 3);
    }

    #[test]
    fn pair_move_records_pairing() {
        let parent = root(1, 1, 0, 2);
        let opened = apply_move(&parent, Move::Open { leg: 1 });
        let opened = apply_move(&opened, Move::Open { leg: 1 });
        assert_eq!(opened.markers(), &[0, 2]);
        assert_eq!(opened.factor(), &BigUint::from(2u32));

        let child = apply_move(&opened, Move::Pair { from: 1, to: 0 });
        assert_eq!(child.legs(), &[1, 2]);
        assert_eq!(child.markers(), &[0, 1]);
        assert_eq!(child.pairing(1, 0), 1);
        assert_eq!(child.pairing(0, 1), 0);
        assert_eq!(child.sources_remaining(), 0);
        assert_eq!(child.factor(), &BigUint::from(4u32));
    }

    #[test]
    #[should_panic(expected = "Open move not enabled")]
    fn open_without_sources_panics() {
        apply_move(&root(1, 0, 0, 0), Move::Open { leg: 0 });
    }

    #[test]
    #[should_panic(expected = "Pair move not enabled")]
    fn pair_without_marker_panics() {
        apply_move(&root(1, 0, 0, 1), Move::Pair { from: 0, to: 0 });
    }

    #[test]
    fn every_child_resolves_one_reduction() {
        let parent = apply_move(&root(1, 1, 1, 4), Move::Open { leg: 2 });
        let legs_left = |t: &Term| t.legs().iter().sum::<u64>();
        for (mv, child) in parent.moves().into_iter().zip(branch(&parent).unwrap()) {
            assert_eq!(legs_left(&child) + 1, legs_left(&parent));
            assert_eq!(child.leg_count(), parent.leg_count());
            let sources_used = parent.sources_remaining() - child.sources_remaining();
            match mv {
                Move::Open { .. } => {
                    assert_eq!(sources_used, 1);
                    assert_eq!(child.outstanding() + 2, parent.outstanding());
                }
                Move::Pair { .. } => {
                    assert_eq!(sources_used, 0);
                    assert_eq!(child.outstanding() + 1, parent.outstanding());
                }
            }
        }
    }

    #[test]
    fn terminal_branches_to_itself() {
        let t = root(0, 0, 0, 0);
        assert_eq!(branch(&t).unwrap(), vec![t.clone()]);
        assert_eq!(t.clone().expand().unwrap(), vec![t]);
    }

    #[test]
    fn dead_end_root_is_an_error() {
        let t = root(0, 0, 1, 0);
        assert_eq!(
            branch(&t),
            Err(TermError::DeadEndState {
                legs: vec![6],
                sources_remaining: 0,
                markers: vec![0],
            })
        );
    }

    #[test]
    fn stranded_term_cannot_branch() {
        let t = root(0, 0, 0, 2);
        assert!(matches!(branch(&t), Err(TermError::DeadEndState { .. })));
    }
}
