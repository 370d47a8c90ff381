/// Term counting: Canonical Hashing
///
/// Deterministic canonical serialization + SHA-256 hashing of a frontier.
/// Produces byte-identical output across platforms and across sequential
/// and parallel runs.
///
/// Rules:
///   - Terms in frontier order (order is part of the identity)
///   - Fixed field order: factor, legs, sources_remaining, markers, pairings
///   - factor as a decimal string, everything else as integers
///   - UTF-8 JSON, no whitespace, no float

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::Term;
use crate::FORMAT_VERSION;

/// Canonical serialization of a frontier to UTF-8 JSON bytes.
/// Includes format_version as the first field.
pub fn canonical_serialize(frontier: &[Term]) -> Vec<u8> {
    let obj = build_canonical_value(frontier);
    serde_json::to_string(&obj)
        .expect("canonical_serialize: JSON serialization failed")
        .into_bytes()
}

/// SHA-256 of canonical serialization. Lowercase hex string.
pub fn canonical_hash(frontier: &[Term]) -> String {
    let bytes = canonical_serialize(frontier);
    let digest = Sha256::digest(&bytes);
    digest
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<String>()
}

fn build_canonical_value(frontier: &[Term]) -> Value {
    let terms: Vec<Value> = frontier.iter().map(term_value).collect();

    let mut root = Map::new();
    root.insert(
        "format_version".to_string(),
        Value::Number(FORMAT_VERSION.into()),
    );
    root.insert("terms".to_string(), Value::Array(terms));
    Value::Object(root)
}

fn term_value(term: &Term) -> Value {
    let mut map = Map::new();
    map.insert(
        "factor".to_string(),
        Value::String(term.factor().to_str_radix(10)),
    );
    map.insert("legs".to_string(), counts(term.legs()));
    map.insert(
        "sources_remaining".to_string(),
        Value::Number(term.sources_remaining().into()),
    );
    map.insert("markers".to_string(), counts(term.markers()));
    map.insert("pairings".to_string(), counts(term.pairings()));
    Value::Object(map)
}

fn counts(values: &[u64]) -> Value {
    Value::Array(values.iter().map(|&v| Value::Number(v.into())).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InitialConfig;
    use crate::state::create_initial_term;
    use crate::transitions::branch;

    #[test]
    fn serialization_has_fixed_layout() {
        let root = create_initial_term(&InitialConfig::new(1, 0, 0, 2).unwrap());
        let json = String::from_utf8(canonical_serialize(&[root])).unwrap();
        assert_eq!(
            json,
            r#"{"format_version":1,"terms":[{"factor":"1","legs":[2],"sources_remaining":2,"markers":[0],"pairings":[0]}]}"#
        );
    }

    #[test]
    fn hash_depends_on_order() {
        let root = create_initial_term(&InitialConfig::new(2, 0, 0, 2).unwrap());
        let children = branch(&root).unwrap();
        let mut reversed = children.clone();
        reversed.reverse();
        let h = canonical_hash(&children);
        assert_eq!(h.len(), 64);
        assert_eq!(h, canonical_hash(&children));
        assert_ne!(h, canonical_hash(&reversed));
    }
}
