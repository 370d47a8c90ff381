//! Snapshot layer: frontier snapshots for resumption.
//!
//! A snapshot holds the frontier after a given round plus the kernel's
//! canonical hash of it. No timestamps in snapshot content (determinism).
//!
//! If a snapshot's hash doesn't verify, callers fall back to replay.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use term_engine::domain::Term;
use term_engine::hashing::canonical_hash;
use term_engine::FORMAT_VERSION;

use crate::snapshot_codec::{encode_frontier, restore_frontier, SnapshotError};

/// Snapshot on-disk format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    /// Rounds run when this snapshot was taken.
    pub round: u64,
    /// Frontier as encoded by `snapshot_codec::encode_frontier`.
    pub frontier_json: String,
    /// Kernel canonical hash of the frontier.
    pub hash: String,
    pub format_version: u32,
}

impl Snapshot {
    /// Decode and validate the stored frontier.
    pub fn frontier(&self) -> Result<Vec<Term>, SnapshotError> {
        restore_frontier(&self.frontier_json)
    }
}

fn snapshot_path(dir: &Path, round: u64) -> PathBuf {
    dir.join(format!("snapshot_{:06}.json", round))
}

/// Save a snapshot of `frontier` after `round` rounds.
pub fn save_snapshot(dir: &Path, round: u64, frontier: &[Term]) -> Result<PathBuf, SnapshotError> {
    fs::create_dir_all(dir)?;

    let snap = Snapshot {
        round,
        frontier_json: encode_frontier(frontier)?,
        hash: canonical_hash(frontier),
        format_version: FORMAT_VERSION,
    };

    let path = snapshot_path(dir, round);
    let content =
        serde_json::to_string(&snap).map_err(|e| SnapshotError::SerializationError(e.to_string()))?;

    let mut file = File::create(&path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;

    Ok(path)
}

/// Load the snapshot taken at `round`.
/// Returns None if no snapshot exists for that round.
pub fn load_snapshot(dir: &Path, round: u64) -> Result<Option<Snapshot>, SnapshotError> {
    let path = snapshot_path(dir, round);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)?;
    let snap: Snapshot = serde_json::from_str(&content)
        .map_err(|e| SnapshotError::DeserializationError(format!("Bad snapshot: {}", e)))?;

    Ok(Some(snap))
}

/// Load the snapshot with the highest round in a directory.
pub fn load_latest_snapshot(dir: &Path) -> Result<Option<Snapshot>, SnapshotError> {
    match snapshot_rounds(dir)?.last() {
        Some(&round) => load_snapshot(dir, round),
        None => Ok(None),
    }
}

/// Rounds of every `snapshot_NNNNNN.json` in `dir`, ascending.
pub fn snapshot_rounds(dir: &Path) -> io::Result<Vec<u64>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut rounds = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name_str = name.to_string_lossy();
        if let Some(round) = name_str
            .strip_prefix("snapshot_")
            .and_then(|s| s.strip_suffix(".json"))
            .and_then(|s| s.parse::<u64>().ok())
        {
            rounds.push(round);
        }
    }
    rounds.sort_unstable();
    Ok(rounds)
}

/// True if the stored frontier decodes, validates, and hashes to `hash`.
pub fn verify_snapshot_hash(snap: &Snapshot) -> bool {
    snap.format_version == FORMAT_VERSION
        && snap
            .frontier()
            .map(|frontier| canonical_hash(&frontier) == snap.hash)
            .unwrap_or(false)
}
