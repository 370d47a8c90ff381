/// Term counting: Root Construction

use num_bigint::BigUint;

use crate::arithmetic::GROUP_DEGREES;
use crate::domain::{InitialConfig, Term};

/// Build the root term: `a` legs of degree 2, `b` of degree 4, `c` of
/// degree 6, in that order. Factor 1, no markers, no pairings.
pub fn create_initial_term(config: &InitialConfig) -> Term {
    let l = config.leg_count();
    let mut legs = Vec::with_capacity(l);
    for (&count, &degree) in [config.twos, config.fours, config.sixes]
        .iter()
        .zip(GROUP_DEGREES.iter())
    {
        legs.extend(std::iter::repeat(degree).take(count as usize));
    }

    Term {
        factor: BigUint::from(1u32),
        legs,
        sources_remaining: config.sources,
        markers: vec![0; l],
        pairings: vec![0; l * l],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TermStatus;

    #[test]
    fn root_layout() {
        let cfg = InitialConfig::new(1, 2, 1, 5).unwrap();
        let root = create_initial_term(&cfg);
        assert_eq!(root.legs(), &[2, 4, 4, 6]);
        assert_eq!(root.sources_remaining(), 5);
        assert_eq!(root.markers(), &[0; 4]);
        assert_eq!(root.pairings().len(), 16);
        assert_eq!(root.factor(), &BigUint::from(1u32));
        assert_eq!(root.outstanding(), cfg.round_bound());
    }

    #[test]
    fn empty_root_is_terminal() {
        let root = create_initial_term(&InitialConfig::new(0, 0, 0, 0).unwrap());
        assert_eq!(root.leg_count(), 0);
        assert_eq!(root.status(), TermStatus::Terminal);
    }
}
