//! Snapshot Codec: deterministic frontier encoder/decoder.
//!
//! Pure codec layer. No side-effects, no timestamps, no envelope.
//!
//! - `encode_frontier`:  &[Term] → JSON array string
//! - `decode_frontier`:  JSON string → Vec<Term> (strict, no defaults)
//! - `restore_frontier`: decode + invariant validation
//! - `export_frontier_to_file` / `import_frontier_from_file`: file I/O
//! - `frontier_hash`:    SHA-256 of the encoded JSON (lowercase hex)

use std::fs;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};
use thiserror::Error;

use term_engine::domain::Term;
use term_engine::invariants::try_validate_frontier;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// All possible snapshot codec failures.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// JSON serialization failed.
    #[error("SerializationError: {0}")]
    SerializationError(String),
    /// JSON deserialization failed (malformed, missing fields, unknown fields).
    #[error("DeserializationError: {0}")]
    DeserializationError(String),
    /// Loaded frontier violates kernel invariants.
    #[error("InvariantViolation: {0}")]
    InvariantViolation(String),
    /// File I/O error.
    #[error("IoError: {0}")]
    IoError(String),
}

impl From<io::Error> for SnapshotError {
    fn from(err: io::Error) -> Self {
        SnapshotError::IoError(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Encoder / decoder
// ---------------------------------------------------------------------------

/// Encode a frontier as a compact JSON array, in frontier order.
pub fn encode_frontier(frontier: &[Term]) -> Result<String, SnapshotError> {
    serde_json::to_string(frontier).map_err(|e| SnapshotError::SerializationError(e.to_string()))
}

/// Decode a JSON array into terms.
///
/// `deny_unknown_fields` rejects unexpected fields; missing fields fail.
/// No invariant validation. Use `restore_frontier` for validated loading.
pub fn decode_frontier(json: &str) -> Result<Vec<Term>, SnapshotError> {
    serde_json::from_str::<Vec<Term>>(json)
        .map_err(|e| SnapshotError::DeserializationError(e.to_string()))
}

/// Decode and validate shapes, factors and the shared leg count.
pub fn restore_frontier(json: &str) -> Result<Vec<Term>, SnapshotError> {
    let frontier = decode_frontier(json)?;
    try_validate_frontier(&frontier).map_err(SnapshotError::InvariantViolation)?;
    Ok(frontier)
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

/// Write a frontier to `path`, creating parent directories.
pub fn export_frontier_to_file(frontier: &[Term], path: &Path) -> Result<(), SnapshotError> {
    let json = encode_frontier(frontier)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json.as_bytes())?;
    Ok(())
}

/// Read and validate a frontier from `path`.
pub fn import_frontier_from_file(path: &Path) -> Result<Vec<Term>, SnapshotError> {
    let content = fs::read_to_string(path)?;
    restore_frontier(&content)
}

// ---------------------------------------------------------------------------
// Hash
// ---------------------------------------------------------------------------

/// SHA-256 of `encode_frontier`. Lowercase hex string.
///
/// Integrity hash for files on disk; the kernel's `canonical_hash` is the
/// identity hash and uses its own layout.
pub fn frontier_hash(frontier: &[Term]) -> Result<String, SnapshotError> {
    let json = encode_frontier(frontier)?;
    let digest = Sha256::digest(json.as_bytes());
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
