//! Session manager: resumable expansion runs.
//!
//! Each session gets its own directory:
//!   <base_dir>/<session_id>/session.json       initial + expansion config
//!   <base_dir>/<session_id>/checkpoints.log    binary checkpoint frames
//!   <base_dir>/<session_id>/snapshots/         JSON frontier snapshots
//!
//! Expand-before-persist order:
//!   1. expander.step()                  may fail on a dead end
//!   2. checkpoint + snapshot            only if step 1 succeeded and
//!                                         the round hits the interval

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use term_engine::domain::{ExpansionConfig, InitialConfig, RoundStats, Term};
use term_engine::engine::Expander;
use term_engine::hashing::canonical_hash;
use term_engine::TermError;

use crate::frontier_store::FrontierStore;
use crate::proto_bridge::{checkpoint_to_proto, proto_to_checkpoint};
use crate::snapshot::{self, verify_snapshot_hash};
use crate::snapshot_codec::SnapshotError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Term(#[from] TermError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("IoError: {0}")]
    Io(#[from] io::Error),
    /// The directory belongs to a session with different parameters.
    #[error("Session {session_id} was created with a different configuration")]
    ManifestMismatch { session_id: String },
}

/// Parameters a session directory is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    session_id: String,
    initial: InitialConfig,
    config: ExpansionConfig,
}

/// An isolated expansion run with its own checkpoints and snapshots.
pub struct Session {
    session_id: String,
    session_dir: PathBuf,
    initial: InitialConfig,
    expander: Expander,
    store: FrontierStore,
    snapshot_interval: u64,
}

impl Session {
    /// Open `<base_dir>/<session_id>`, resuming from the furthest valid
    /// persisted frontier, or start at the root.
    ///
    /// `snapshot_interval == 0` disables persistence of rounds.
    pub fn new(
        base_dir: &Path,
        session_id: &str,
        initial: InitialConfig,
        config: ExpansionConfig,
        snapshot_interval: u64,
    ) -> Result<Self, SessionError> {
        let session_dir = base_dir.join(session_id);
        fs::create_dir_all(&session_dir)?;

        let manifest = Manifest {
            session_id: session_id.to_string(),
            initial,
            config: config.clone(),
        };
        bind_manifest(&session_dir.join("session.json"), &manifest)?;

        let store = FrontierStore::open(&session_dir.join("checkpoints.log"))?;
        let expander = match resume_point(&session_dir, &store)? {
            Some((round, frontier)) => {
                info!("session {}: resuming at round {}", session_id, round);
                Expander::from_frontier(frontier, round, config)?
            }
            None => Expander::new(&initial, config),
        };

        Ok(Self {
            session_id: session_id.to_string(),
            session_dir,
            initial,
            expander,
            store,
            snapshot_interval,
        })
    }

    /// Run one round, then persist if the round hits the interval.
    pub fn step(&mut self) -> Result<RoundStats, SessionError> {
        let stats = self.expander.step()?;
        if self.snapshot_interval > 0 && stats.round % self.snapshot_interval == 0 {
            self.persist()?;
        }
        Ok(stats)
    }

    /// Expand to fixpoint, persisting along the way and once at the end.
    /// Returns the number of rounds this call ran.
    pub fn run_to_fixpoint(&mut self) -> Result<u64, SessionError> {
        let cap = self
            .expander
            .config()
            .max_rounds
            .unwrap_or_else(|| self.initial.round_bound());

        let mut ran = 0;
        while !self.expander.is_complete() {
            if self.expander.round() >= cap {
                return Err(TermError::RoundLimitExceeded { limit: cap }.into());
            }
            self.step()?;
            ran += 1;
        }

        if self.snapshot_interval > 0 && self.store.last_round() != Some(self.expander.round()) {
            self.persist()?;
        }
        Ok(ran)
    }

    /// Strict aggregate of the current frontier.
    pub fn aggregate(&self) -> Result<BigUint, SessionError> {
        Ok(self.expander.aggregate()?)
    }

    fn persist(&mut self) -> Result<(), SessionError> {
        let round = self.expander.round();
        let frontier = self.expander.frontier();
        self.store
            .append_checkpoint(&checkpoint_to_proto(round, frontier))?;
        snapshot::save_snapshot(&self.snapshots_dir(), round, frontier)?;
        Ok(())
    }

    fn snapshots_dir(&self) -> PathBuf {
        self.session_dir.join("snapshots")
    }

    pub fn frontier(&self) -> &[Term] {
        self.expander.frontier()
    }

    pub fn is_complete(&self) -> bool {
        self.expander.is_complete()
    }

    /// Kernel canonical hash of the current frontier.
    pub fn current_hash(&self) -> String {
        canonical_hash(self.expander.frontier())
    }

    /// Rounds run so far, including rounds before a resume.
    pub fn current_round(&self) -> u64 {
        self.expander.round()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn initial(&self) -> &InitialConfig {
        &self.initial
    }
}

/// Write the manifest on first use; afterwards the initial configuration
/// must match. Expansion settings may change between runs.
fn bind_manifest(path: &Path, manifest: &Manifest) -> Result<(), SessionError> {
    if path.exists() {
        let content = fs::read_to_string(path)?;
        let existing: Manifest = serde_json::from_str(&content)
            .map_err(|e| SnapshotError::DeserializationError(format!("Bad manifest: {}", e)))?;
        if existing.initial != manifest.initial {
            return Err(SessionError::ManifestMismatch {
                session_id: manifest.session_id.clone(),
            });
        }
        return Ok(());
    }
    let content = serde_json::to_string(manifest)
        .map_err(|e| SnapshotError::SerializationError(e.to_string()))?;
    fs::write(path, content)?;
    Ok(())
}

/// Furthest persisted frontier: the later of the newest verified snapshot
/// and the newest checkpoint frame.
fn resume_point(
    session_dir: &Path,
    store: &FrontierStore,
) -> Result<Option<(u64, Vec<Term>)>, SessionError> {
    let from_snapshot = match snapshot::load_latest_snapshot(&session_dir.join("snapshots"))? {
        Some(snap) if verify_snapshot_hash(&snap) => Some((snap.round, snap.frontier()?)),
        Some(snap) => {
            warn!(
                "snapshot at round {} failed hash verification; ignoring it",
                snap.round
            );
            None
        }
        None => None,
    };

    let from_log = match store.load_latest()? {
        Some(checkpoint) => Some(proto_to_checkpoint(&checkpoint)?),
        None => None,
    };

    Ok(match (from_snapshot, from_log) {
        (Some(s), Some(l)) => Some(if l.0 > s.0 { l } else { s }),
        (s, l) => s.or(l),
    })
}
