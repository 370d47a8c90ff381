/// Term counting: Invariant Checks
///
/// `validate_*` panic on failure; the driver uses them on every child.
/// `try_validate_*` return `Err(message)` and back snapshot restore.

use num_traits::Zero;

use crate::arithmetic::checked_sum;
use crate::domain::Term;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Shape and weight checks for a single term.
pub fn try_validate_term(term: &Term) -> Result<(), String> {
    let l = term.legs.len();
    if term.markers.len() != l {
        return Err(format!(
            "[INVARIANT:shape] markers has {} entries, expected {}",
            term.markers.len(),
            l
        ));
    }
    let cells = l.checked_mul(l).ok_or_else(|| {
        format!("[INVARIANT:shape] pairing matrix {}x{} overflows usize", l, l)
    })?;
    if term.pairings.len() != cells {
        return Err(format!(
            "[INVARIANT:shape] pairings has {} entries, expected {}",
            term.pairings.len(),
            cells
        ));
    }
    if term.factor.is_zero() {
        return Err("[INVARIANT:factor] factor must be at least 1".to_string());
    }
    Ok(())
}

/// Every member valid, and all members share one leg count.
pub fn try_validate_frontier(frontier: &[Term]) -> Result<(), String> {
    let Some(first) = frontier.first() else {
        return Ok(());
    };
    for (idx, term) in frontier.iter().enumerate() {
        try_validate_term(term).map_err(|e| format!("term {}: {}", idx, e))?;
        if term.leg_count() != first.leg_count() {
            return Err(format!(
                "[INVARIANT:leg_count] term {} has {} legs, term 0 has {}",
                idx,
                term.leg_count(),
                first.leg_count()
            ));
        }
    }
    Ok(())
}

/// A child keeps its parent's leg count and resolves exactly one
/// reduction. An open move also consumes a source and adds a marker; a
/// pair move keeps the sources, consumes a marker and records a pairing.
pub fn try_validate_child(parent: &Term, child: &Term) -> Result<(), String> {
    if child.leg_count() != parent.leg_count() {
        return Err(format!(
            "[INVARIANT:leg_count] child has {} legs, parent has {}",
            child.leg_count(),
            parent.leg_count()
        ));
    }
    let parent_legs = checked_sum(&parent.legs);
    let child_legs = checked_sum(&child.legs);
    if child_legs + 1 != parent_legs {
        return Err(format!(
            "[INVARIANT:conservation] child has {} reductions left, parent has {}",
            child_legs, parent_legs
        ));
    }

    let parent_markers = checked_sum(&parent.markers);
    let child_markers = checked_sum(&child.markers);
    let parent_pairings = checked_sum(&parent.pairings);
    let child_pairings = checked_sum(&child.pairings);
    let consistent = if child.sources_remaining + 1 == parent.sources_remaining {
        child_markers == parent_markers + 1 && child_pairings == parent_pairings
    } else if child.sources_remaining == parent.sources_remaining {
        child_markers + 1 == parent_markers && child_pairings == parent_pairings + 1
    } else {
        false
    };
    if !consistent {
        return Err(format!(
            "[INVARIANT:conservation] sources {} -> {}, markers {} -> {}, pairings {} -> {} match no move",
            parent.sources_remaining,
            child.sources_remaining,
            parent_markers,
            child_markers,
            parent_pairings,
            child_pairings
        ));
    }
    Ok(())
}

/// Panicking variant of `try_validate_child`.
pub fn validate_child(parent: &Term, child: &Term) {
    if let Err(msg) = try_validate_child(parent, child) {
        panic!("Invariant violation: {}", msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;
    use crate::domain::InitialConfig;
    use crate::events::Move;
    use crate::state::create_initial_term;
    use crate::transitions::apply_move;

    #[test]
    fn root_and_children_are_valid() {
        let root = create_initial_term(&InitialConfig::new(1, 0, 1, 2).unwrap());
        assert!(try_validate_term(&root).is_ok());
        let child = apply_move(&root, Move::Open { leg: 1 });
        assert!(try_validate_child(&root, &child).is_ok());
        assert!(try_validate_frontier(&[root, child]).is_ok());
    }

    #[test]
    fn mixed_leg_counts_rejected() {
        let a = create_initial_term(&InitialConfig::new(1, 0, 0, 1).unwrap());
        let b = create_initial_term(&InitialConfig::new(2, 0, 0, 1).unwrap());
        let err = try_validate_frontier(&[a, b]).unwrap_err();
        assert!(err.contains("leg_count"), "got: {}", err);
    }

    #[test]
    fn non_descendant_fails_conservation() {
        let root = create_initial_term(&InitialConfig::new(1, 0, 0, 2).unwrap());
        let err = try_validate_child(&root, &root).unwrap_err();
        assert!(err.contains("conservation"), "got: {}", err);
    }

    #[test]
    fn open_and_pair_children_are_conserved() {
        let root = create_initial_term(&InitialConfig::new(1, 1, 0, 4).unwrap());
        let opened = apply_move(&root, Move::Open { leg: 1 });
        assert!(try_validate_child(&root, &opened).is_ok());
        let paired = apply_move(&opened, Move::Pair { from: 1, to: 0 });
        assert!(try_validate_child(&opened, &paired).is_ok());
        // Skipping a generation resolves two reductions.
        assert!(try_validate_child(&root, &paired).is_err());
    }

    #[test]
    fn source_without_marker_fails_conservation() {
        let parent = Term::from_parts(BigUint::from(1u32), vec![2], 2, vec![0], vec![0]).unwrap();
        let child = Term::from_parts(BigUint::from(2u32), vec![1], 1, vec![0], vec![0]).unwrap();
        let err = try_validate_child(&parent, &child).unwrap_err();
        assert!(err.contains("match no move"), "got: {}", err);
    }

    #[test]
    #[should_panic(expected = "Invariant violation")]
    fn validate_child_panics() {
        let root = create_initial_term(&InitialConfig::new(1, 0, 0, 2).unwrap());
        validate_child(&root, &root);
    }
}
