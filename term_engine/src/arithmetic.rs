/// Term counting: Arithmetic Primitives
///
/// Counters are u64. Weights are BigUint and never pass through here.
/// Fixed-width sums are checked: a wrapped counter is a kernel bug.

use crate::error::TermError;

/// Initial reduction count for each leg group, in group order.
pub const GROUP_DEGREES: [u64; 3] = [2, 4, 6];

/// Checked addition. Panics on u64 overflow.
pub fn checked_add(a: u64, b: u64) -> u64 {
    match a.checked_add(b) {
        Some(result) => result,
        None => panic!("Overflow: {} + {} overflows u64", a, b),
    }
}

/// Checked multiplication. Panics on u64 overflow.
pub fn checked_mul(a: u64, b: u64) -> u64 {
    match a.checked_mul(b) {
        Some(result) => result,
        None => panic!("Overflow: {} * {} overflows u64", a, b),
    }
}

/// Checked sum over a slice of counters.
pub fn checked_sum(values: &[u64]) -> u64 {
    values.iter().fold(0, |acc, &v| checked_add(acc, v))
}

/// Convert a signed input to a count, rejecting negatives.
pub fn to_count(name: &'static str, value: i64) -> Result<u64, TermError> {
    u64::try_from(value).map_err(|_| TermError::InvalidConfiguration { name, value })
}

/// `2a + 4b + 6c + sources`: the number of moves on any complete path.
pub fn round_bound(twos: u64, fours: u64, sixes: u64, sources: u64) -> u64 {
    let legs = [twos, fours, sixes]
        .iter()
        .zip(GROUP_DEGREES.iter())
        .fold(0, |acc, (&n, &deg)| checked_add(acc, checked_mul(n, deg)));
    checked_add(legs, sources)
}
