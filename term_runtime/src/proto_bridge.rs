//! Proto ↔ Kernel conversion bridge.
//!
//! Converts between protobuf wire types (proto_types.rs) and kernel
//! terms. Decoding goes through `Term::from_parts`, so a malformed
//! message never becomes a term.

use num_bigint::BigUint;

use term_engine::domain::Term;
use term_engine::invariants::try_validate_frontier;
use term_engine::{TermError, FORMAT_VERSION};

use crate::proto_types::{ProtoCheckpoint, ProtoTerm};

/// Convert a kernel term to its wire form.
pub fn term_to_proto(term: &Term) -> ProtoTerm {
    ProtoTerm {
        factor: term.factor().to_bytes_le(),
        legs: term.legs().to_vec(),
        sources_remaining: term.sources_remaining(),
        markers: term.markers().to_vec(),
        pairings: term.pairings().to_vec(),
    }
}

/// Convert a wire term back into a validated kernel term.
pub fn proto_to_term(proto: &ProtoTerm) -> Result<Term, TermError> {
    Term::from_parts(
        BigUint::from_bytes_le(&proto.factor),
        proto.legs.clone(),
        proto.sources_remaining,
        proto.markers.clone(),
        proto.pairings.clone(),
    )
}

/// Package a frontier as a checkpoint message.
pub fn checkpoint_to_proto(round: u64, frontier: &[Term]) -> ProtoCheckpoint {
    ProtoCheckpoint {
        round,
        format_version: FORMAT_VERSION,
        terms: frontier.iter().map(term_to_proto).collect(),
    }
}

/// Unpack a checkpoint into `(round, frontier)`, validating every term
/// and the shared leg count.
pub fn proto_to_checkpoint(proto: &ProtoCheckpoint) -> Result<(u64, Vec<Term>), TermError> {
    if proto.format_version != FORMAT_VERSION {
        return Err(TermError::InvariantViolation(format!(
            "checkpoint format_version {} (expected {})",
            proto.format_version, FORMAT_VERSION
        )));
    }
    let frontier = proto
        .terms
        .iter()
        .map(proto_to_term)
        .collect::<Result<Vec<_>, _>>()?;
    try_validate_frontier(&frontier).map_err(TermError::InvariantViolation)?;
    Ok((proto.round, frontier))
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;
    use term_engine::domain::{ExpansionConfig, InitialConfig};
    use term_engine::engine::Expander;

    fn frontier_after(rounds: u64) -> Vec<Term> {
        let mut expander = Expander::new(
            &InitialConfig::new(1, 1, 0, 4).unwrap(),
            ExpansionConfig::default(),
        );
        expander.run(rounds).unwrap();
        expander.into_frontier()
    }

    #[test]
    fn checkpoint_survives_the_wire() {
        let frontier = frontier_after(3);
        let bytes = checkpoint_to_proto(3, &frontier).encode_to_vec();
        let decoded = ProtoCheckpoint::decode(bytes.as_slice()).unwrap();
        let (round, back) = proto_to_checkpoint(&decoded).unwrap();
        assert_eq!(round, 3);
        assert_eq!(back, frontier);
    }

    #[test]
    fn zero_factor_rejected() {
        let mut proto = term_to_proto(&frontier_after(1)[0]);
        proto.factor = Vec::new();
        assert!(matches!(
            proto_to_term(&proto),
            Err(TermError::InvariantViolation(_))
        ));
    }

    #[test]
    fn wrong_format_version_rejected() {
        let mut proto = checkpoint_to_proto(0, &frontier_after(0));
        proto.format_version = 99;
        assert!(proto_to_checkpoint(&proto).is_err());
    }
}
